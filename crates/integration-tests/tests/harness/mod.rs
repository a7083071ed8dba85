#![allow(dead_code)]

pub mod loopback;
pub mod mock_gemini;
pub mod mock_ollama;
