//! Input schema description for tools.

use serde::{Deserialize, Serialize};

/// JSON Schema describing a tool's input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolSchema(serde_json::Value);

impl ToolSchema {
    /// Wrap a raw JSON Schema value.
    pub fn from_value(schema: serde_json::Value) -> Self {
        Self(schema)
    }

    /// An object schema with no properties.
    pub fn empty() -> Self {
        Self::object().build()
    }

    /// Start an object schema.
    pub fn object() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Names listed under `required`.
    pub fn required(&self) -> Vec<&str> {
        self.0
            .get("required")
            .and_then(|v| v.as_array())
            .map(|fields| fields.iter().filter_map(|f| f.as_str()).collect())
            .unwrap_or_default()
    }
}

impl Default for ToolSchema {
    fn default() -> Self {
        Self::empty()
    }
}

/// Builder for flat object schemas.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
}

impl SchemaBuilder {
    /// Add a property of an arbitrary JSON type.
    pub fn property(
        mut self,
        name: impl Into<String>,
        json_type: &str,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let name = name.into();
        self.properties.insert(
            name.clone(),
            serde_json::json!({ "type": json_type, "description": description.into() }),
        );
        if required {
            self.required.push(name);
        }
        self
    }

    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name, "string", description, required)
    }

    pub fn integer(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name, "integer", description, required)
    }

    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name, "boolean", description, required)
    }

    pub fn build(self) -> ToolSchema {
        ToolSchema(serde_json::json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        }))
    }
}
