use std::sync::LazyLock;

use regex::Regex;

/// `{{ env.NAME }}` with an optional `| default("value")`
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\)\s*)?\}\}"#).expect("must be valid regex")
});

/// Substitute environment placeholders in raw TOML text
///
/// Runs before deserialization so config structs hold plain strings and
/// secrets. A placeholder whose variable is unset falls back to its
/// `default("...")` when one is given and is an error otherwise. Comment
/// lines are copied verbatim.
pub fn expand_env(input: &str) -> anyhow::Result<String> {
    let mut output = String::with_capacity(input.len());

    for (index, line) in input.split_inclusive('\n').enumerate() {
        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut cursor = 0;

        for captures in PLACEHOLDER.captures_iter(line) {
            let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
                continue;
            };

            let value = resolve(key.as_str(), captures.get(2).map(|m| m.as_str()))
                .map_err(|e| anyhow::anyhow!("line {}: {e}", index + 1))?;

            output.push_str(&line[cursor..whole.start()]);
            output.push_str(&value);
            cursor = whole.end();
        }

        output.push_str(&line[cursor..]);
    }

    Ok(output)
}

fn resolve(key: &str, default: Option<&str>) -> Result<String, String> {
    let name = key
        .strip_prefix("env.")
        .filter(|name| !name.is_empty() && !name.contains('.'))
        .ok_or_else(|| format!("only variables scoped with 'env.' are supported: `{key}`"))?;

    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{name}`")),
    }
}
