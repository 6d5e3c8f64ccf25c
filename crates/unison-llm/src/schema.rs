//! Declared tool and response-model schemas
//!
//! A schema is an explicit list of [`Field`]s. It renders to the JSON-schema
//! object every provider expects under `parameters` / `input_schema`, validates
//! argument objects the model sends back, and lowers into each wire format's
//! tool declaration and forcing directive.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::convert::{anthropic, bedrock, cohere, google, mistral, openai};
use crate::error::SchemaViolation;
use crate::types::{FunctionDefinition, ToolChoice, WireFormat};

/// Type of a declared field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// Whole number
    Integer,
    /// Any JSON number
    Number,
    /// `true` / `false`
    Boolean,
    /// Homogeneous list
    List {
        /// Element type
        items: Box<FieldType>,
    },
    /// Nested object
    Object {
        /// Nested fields
        fields: Vec<Field>,
    },
    /// One of a fixed set of strings
    Enum {
        /// Allowed values
        values: Vec<String>,
    },
}

impl FieldType {
    /// List of `items`
    pub fn list(items: Self) -> Self {
        Self::List { items: Box::new(items) }
    }

    /// Nested object with `fields`
    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        Self::Object {
            fields: fields.into_iter().collect(),
        }
    }

    /// String restricted to `values`
    pub fn enumeration<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// JSON Schema for a value of this type
    pub fn json_schema(&self) -> Value {
        match self {
            Self::String => json!({"type": "string"}),
            Self::Integer => json!({"type": "integer"}),
            Self::Number => json!({"type": "number"}),
            Self::Boolean => json!({"type": "boolean"}),
            Self::List { items } => json!({"type": "array", "items": items.json_schema()}),
            Self::Object { fields } => object_schema(fields.iter()),
            Self::Enum { values } => json!({"type": "string", "enum": values}),
        }
    }

    const fn describe(&self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::List { .. } => "an array",
            Self::Object { .. } => "an object",
            Self::Enum { .. } => "one of the enumerated strings",
        }
    }

    fn check(&self, value: &Value, path: &str) -> Result<(), SchemaViolation> {
        let mismatch = || SchemaViolation::new(path, format!("expected {}, found {}", self.describe(), kind(value)));

        match self {
            Self::String => value.is_string().then_some(()).ok_or_else(mismatch),
            Self::Integer => is_integral(value).then_some(()).ok_or_else(mismatch),
            Self::Number => value.is_number().then_some(()).ok_or_else(mismatch),
            Self::Boolean => value.is_boolean().then_some(()).ok_or_else(mismatch),
            Self::List { items } => {
                let array = value.as_array().ok_or_else(mismatch)?;
                for (i, item) in array.iter().enumerate() {
                    items.check(item, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            Self::Object { fields } => {
                let object = value.as_object().ok_or_else(mismatch)?;
                validate_fields(fields, object, path)
            }
            Self::Enum { values } => {
                let text = value.as_str().ok_or_else(mismatch)?;
                if values.iter().any(|v| v == text) {
                    Ok(())
                } else {
                    Err(SchemaViolation::new(
                        path,
                        format!("`{text}` is not one of {}", values.join(", ")),
                    ))
                }
            }
        }
    }
}

/// A single declared field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name as it appears in the argument object
    pub name: String,
    /// Field type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the model must supply this field
    #[serde(default = "default_required")]
    pub required: bool,
    /// Value comes from the decorated function's arguments, not the model
    #[serde(default)]
    pub from_call_args: bool,
}

const fn default_required() -> bool {
    true
}

impl Field {
    /// Required field with no description
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: None,
            required: true,
            from_call_args: false,
        }
    }

    /// Attach a description
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Make the field optional
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Mark the field as supplied from the call's arguments
    #[must_use]
    pub const fn from_call_args(mut self) -> Self {
        self.from_call_args = true;
        self
    }

    fn property_schema(&self) -> Value {
        let mut schema = self.field_type.json_schema();
        if let Value::Object(map) = &mut schema {
            map.insert(
                "description".to_owned(),
                Value::String(self.description.clone().unwrap_or_default()),
            );
        }
        schema
    }
}

/// `{type: object, properties, required}` for a set of fields
pub fn object_schema<'a>(fields: impl IntoIterator<Item = &'a Field>) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields {
        properties.insert(field.name.clone(), field.property_schema());
        if field.required {
            required.push(Value::String(field.name.clone()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Check an argument object against declared fields
///
/// Unknown keys are accepted. `null` satisfies an optional field.
pub fn validate_fields(fields: &[Field], object: &Map<String, Value>, prefix: &str) -> Result<(), SchemaViolation> {
    for field in fields {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{prefix}.{}", field.name)
        };

        match object.get(&field.name) {
            None | Some(Value::Null) if !field.required => {}
            None => return Err(SchemaViolation::new(path, "missing required field")),
            Some(value) => field.field_type.check(value, &path)?,
        }
    }
    Ok(())
}

fn is_integral(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
        _ => false,
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A declared tool the model may call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Name the model uses to invoke the tool
    pub name: String,
    /// What the tool does
    #[serde(default)]
    pub description: String,
    /// Parameters
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl ToolSchema {
    /// Tool with no parameters yet
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    /// Add a parameter
    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// JSON Schema for the parameters object
    pub fn parameters(&self) -> Value {
        object_schema(&self.fields)
    }

    /// Provider-agnostic function definition
    pub fn definition(&self) -> FunctionDefinition {
        FunctionDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters(),
        }
    }

    /// Check an argument object against the parameters
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<(), SchemaViolation> {
        validate_fields(&self.fields, arguments, "")
    }
}

/// Tool declarations and choice in one wire format's request shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderTools {
    /// Entries for the request's tool list
    pub tools: Vec<Value>,
    /// Tool selection directive, where the format has one for this choice
    pub tool_choice: Option<Value>,
}

/// Lower declared tools and an optional choice into `format`
pub fn lower_tools(format: WireFormat, tools: &[ToolSchema], choice: Option<&ToolChoice>) -> ProviderTools {
    let definitions: Vec<FunctionDefinition> = tools.iter().map(ToolSchema::definition).collect();

    let (tools, tool_choice) = match format {
        WireFormat::OpenAi => (
            definitions.iter().map(openai::lower_tool).collect(),
            choice.map(openai::lower_tool_choice),
        ),
        WireFormat::Anthropic => (
            definitions.iter().map(anthropic::lower_tool).collect(),
            choice.map(anthropic::lower_tool_choice),
        ),
        WireFormat::Google => (
            vec![google::lower_tools(&definitions)],
            choice.map(google::lower_tool_choice),
        ),
        WireFormat::Mistral => (
            definitions.iter().map(mistral::lower_tool).collect(),
            choice.map(mistral::lower_tool_choice),
        ),
        WireFormat::Cohere => (
            definitions.iter().map(cohere::lower_tool).collect(),
            choice.and_then(cohere::lower_tool_choice),
        ),
        WireFormat::Bedrock => (
            definitions.iter().map(bedrock::lower_tool).collect(),
            choice.and_then(bedrock::lower_tool_choice),
        ),
    };

    ProviderTools { tools, tool_choice }
}
