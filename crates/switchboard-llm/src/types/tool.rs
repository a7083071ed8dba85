use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::null_as_default;

/// Definition of a tool the model can call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Tool {
    /// Tool type (currently always "function")
    #[serde(rename = "type", default = "function_type")]
    pub tool_type: String,
    /// Function definition
    pub function: ToolFunction,
}

fn function_type() -> String {
    "function".to_owned()
}

impl Tool {
    /// Declare a function tool
    pub fn function(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            tool_type: function_type(),
            function: ToolFunction {
                name: name.into(),
                description: description.into(),
                parameters: ToolFunctionParameters::default(),
            },
        }
    }

    /// Add a parameter, keeping declaration order
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, property: ToolProperty, required: bool) -> Self {
        let name = name.into();
        if required {
            self.function.parameters.required.push(name.clone());
        }
        self.function.parameters.properties.insert(name, property);
        self
    }
}

/// Definition of a callable function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolFunction {
    /// Function name
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Parameter object schema
    #[serde(default)]
    pub parameters: ToolFunctionParameters,
}

/// Object schema describing a function's parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolFunctionParameters {
    /// Schema type of the parameter object (normally "object")
    #[serde(rename = "type", default = "object_type")]
    pub kind: String,
    /// Names of required parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub required: Vec<String>,
    /// Parameters by name, in declaration order
    #[serde(default, deserialize_with = "null_as_default")]
    #[schemars(with = "std::collections::BTreeMap<String, ToolProperty>")]
    pub properties: IndexMap<String, ToolProperty>,
}

fn object_type() -> String {
    "object".to_owned()
}

impl Default for ToolFunctionParameters {
    fn default() -> Self {
        Self {
            kind: object_type(),
            required: Vec::new(),
            properties: IndexMap::new(),
        }
    }
}

/// A single function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolProperty {
    /// Type tag
    #[serde(rename = "type", default)]
    #[schemars(with = "Value")]
    pub kind: PropertyType,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Allowed values
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub values: Vec<Value>,
    /// Element schema when the type is an array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ToolProperty>>,
    /// Nested properties when the type is an object
    #[serde(default, skip_serializing_if = "IndexMap::is_empty", deserialize_with = "null_as_default")]
    #[schemars(with = "std::collections::BTreeMap<String, ToolProperty>")]
    pub properties: IndexMap<String, ToolProperty>,
    /// Required nested property names
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub required: Vec<String>,
}

impl ToolProperty {
    /// Property with a single type tag
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: PropertyType::from(kind.into()),
            description: description.into(),
            values: Vec::new(),
            items: None,
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }

    /// Array property whose elements follow `items`
    pub fn array(items: ToolProperty, description: impl Into<String>) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new("array", description)
        }
    }
}

/// Parameter type tag
///
/// Peers send either a single string or a list of strings; the first entry
/// is authoritative. A single-entry tag is written back as a plain string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyType(pub Vec<String>);

impl PropertyType {
    /// Authoritative type tag, if any
    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

impl From<String> for PropertyType {
    fn from(tag: String) -> Self {
        Self(vec![tag])
    }
}

impl From<&str> for PropertyType {
    fn from(tag: &str) -> Self {
        Self(vec![tag.to_owned()])
    }
}

impl Serialize for PropertyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => serializer.serialize_str(single),
            many => many.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PropertyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Option::<Wire>::deserialize(deserializer)? {
            Some(Wire::One(tag)) => Self(vec![tag]),
            Some(Wire::Many(tags)) => Self(tags),
            None => Self::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn type_tag_accepts_string_or_list() {
        let one: ToolProperty = serde_json::from_value(json!({"type": "string"})).unwrap();
        assert_eq!(one.kind.primary(), Some("string"));

        let many: ToolProperty = serde_json::from_value(json!({"type": ["integer", "null"]})).unwrap();
        assert_eq!(many.kind.primary(), Some("integer"));

        let missing: ToolProperty = serde_json::from_value(json!({"description": "x"})).unwrap();
        assert_eq!(missing.kind.primary(), None);
    }

    #[test]
    fn single_tag_serializes_as_string() {
        let value = serde_json::to_value(ToolProperty::new("boolean", "flag")).unwrap();
        assert_eq!(value, json!({"type": "boolean", "description": "flag"}));
    }

    #[test]
    fn properties_keep_declaration_order() {
        let tool = Tool::function("book", "Book a table")
            .with_parameter("zone", ToolProperty::new("string", ""), true)
            .with_parameter("at", ToolProperty::new("string", ""), false);

        let names: Vec<_> = tool.function.parameters.properties.keys().collect();
        assert_eq!(names, ["zone", "at"]);
        assert_eq!(tool.function.parameters.required, ["zone"]);
    }

    #[test]
    fn decodes_ollama_tool_shape() {
        let tool: Tool = serde_json::from_value(json!({
            "type": "function",
            "function": {
                "name": "get_weather",
                "description": "Weather for a city",
                "parameters": {
                    "type": "object",
                    "required": ["city"],
                    "properties": {
                        "city": {"type": "string", "description": "City name"},
                        "unit": {"type": "string", "enum": ["c", "f"]}
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(tool.function.parameters.properties["unit"].values, [json!("c"), json!("f")]);
    }

    #[test]
    fn nested_schemas_survive_decoding() {
        let tool: Tool = serde_json::from_value(json!({
            "type": "function",
            "function": {
                "name": "tag",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "labels": {"type": "array", "items": {"type": "string"}},
                        "owner": {
                            "type": "object",
                            "required": ["id"],
                            "properties": {"id": {"type": "integer"}}
                        }
                    }
                }
            }
        }))
        .unwrap();

        let params = &tool.function.parameters.properties;
        let items = params["labels"].items.as_deref().unwrap();
        assert_eq!(items.kind.primary(), Some("string"));

        let owner = &params["owner"];
        assert_eq!(owner.properties["id"].kind.primary(), Some("integer"));
        assert_eq!(owner.required, ["id"]);
    }

    #[test]
    fn nested_schemas_are_written_back() {
        let labels = ToolProperty::array(ToolProperty::new("string", ""), "Labels");
        let value = serde_json::to_value(labels).unwrap();
        assert_eq!(
            value,
            json!({"type": "array", "description": "Labels", "items": {"type": "string"}})
        );
    }
}
