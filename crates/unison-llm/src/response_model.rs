//! Structured output extraction
//!
//! A [`ResponseModel`] declares the shape of the value a call should produce.
//! It is bound once to the parameter list of the function it decorates, which
//! checks that every field supplied from the call's arguments has a matching
//! parameter. The resulting [`BoundResponseModel`] configures the outgoing call
//! and extracts a validated value from the response, either from a forced tool
//! call or from a JSON object embedded in the text content.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LlmError;
use crate::history::MessageHistory;
use crate::response::CallResponse;
use crate::schema::{Field, ToolSchema, object_schema, validate_fields};
use crate::tools::parse_arguments;
use crate::types::ToolChoice;

/// Declared structured-output schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseModel {
    /// Model name, used as the forced tool's name
    pub name: String,
    /// Description given to the provider
    #[serde(default)]
    pub description: String,
    /// Declared fields
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Ask for a JSON reply instead of forcing a tool call
    #[serde(default)]
    pub json_mode: bool,
}

impl ResponseModel {
    /// Tool-mode model with no fields
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fields: Vec::new(),
            json_mode: false,
        }
    }

    /// Add a field
    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Extract from JSON content rather than a forced tool call
    #[must_use]
    pub const fn in_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    /// Bind to the parameter names of the function being decorated
    ///
    /// Every field marked as coming from the call's arguments must name one of
    /// `parameters`.
    pub fn bind(&self, parameters: &[&str]) -> Result<BoundResponseModel, LlmError> {
        if self.name.trim().is_empty() {
            return Err(LlmError::Configuration("response model name is empty".to_owned()));
        }

        let missing: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| field.from_call_args && !parameters.contains(&field.name.as_str()))
            .map(|field| field.name.as_str())
            .collect();

        if !missing.is_empty() {
            return Err(LlmError::Configuration(format!(
                "response model `{}` takes {} from call arguments, but the function only has parameters [{}]",
                self.name,
                missing
                    .iter()
                    .map(|name| format!("`{name}`"))
                    .collect::<Vec<_>>()
                    .join(", "),
                parameters.join(", "),
            )));
        }

        tracing::debug!(model = %self.name, json_mode = self.json_mode, "bound response model");

        Ok(BoundResponseModel { model: self.clone() })
    }
}

/// A response model checked against its function's parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundResponseModel {
    model: ResponseModel,
}

impl BoundResponseModel {
    /// Model name
    pub fn name(&self) -> &str {
        &self.model.name
    }

    /// Whether extraction reads JSON content
    pub const fn json_mode(&self) -> bool {
        self.model.json_mode
    }

    /// The unbound declaration
    pub const fn model(&self) -> &ResponseModel {
        &self.model
    }

    /// Fields the provider is asked to generate
    fn generated_fields(&self) -> impl Iterator<Item = &Field> {
        self.model.fields.iter().filter(|field| !field.from_call_args)
    }

    /// The model as a single tool, without call-argument fields
    pub fn tool_schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.model.name.clone(),
            description: self.model.description.clone(),
            fields: self.generated_fields().cloned().collect(),
        }
    }

    /// Directive forcing the provider to call [`tool_schema`](Self::tool_schema)
    pub fn tool_choice(&self) -> ToolChoice {
        ToolChoice::Tool(self.model.name.clone())
    }

    /// JSON schema of the generated fields, for json-mode prompts
    pub fn schema(&self) -> Value {
        object_schema(self.generated_fields())
    }

    /// Extract and validate the structured value as a JSON object
    ///
    /// `call_args` supplies the fields marked as coming from the call's
    /// arguments; they overwrite anything the provider generated under the
    /// same name.
    pub fn extract_value<R: MessageHistory>(
        &self,
        response: &CallResponse<R>,
        call_args: &Map<String, Value>,
    ) -> Result<Map<String, Value>, LlmError> {
        let mut object = if self.json_mode() {
            json_object(&response.content())?
        } else {
            self.tool_arguments(response)?
        };

        for field in self.model.fields.iter().filter(|field| field.from_call_args) {
            let value = call_args.get(&field.name).ok_or_else(|| {
                LlmError::Extraction(format!("call argument `{}` was not supplied", field.name))
            })?;
            object.insert(field.name.clone(), value.clone());
        }

        validate_fields(&self.model.fields, &object, "")
            .map_err(|violation| LlmError::Extraction(format!("`{}` output is invalid: {violation}", self.name())))?;

        Ok(object)
    }

    /// Extract, validate and deserialize the structured value
    pub fn extract<T: DeserializeOwned, R: MessageHistory>(
        &self,
        response: &CallResponse<R>,
        call_args: &Map<String, Value>,
    ) -> Result<T, LlmError> {
        let object = self.extract_value(response, call_args)?;
        serde_json::from_value(Value::Object(object))
            .map_err(|e| LlmError::Extraction(format!("`{}` output does not deserialize: {e}", self.name())))
    }

    fn tool_arguments<R: MessageHistory>(&self, response: &CallResponse<R>) -> Result<Map<String, Value>, LlmError> {
        let call = response
            .tool_calls()
            .unwrap_or_default()
            .iter()
            .find(|call| call.name() == self.name())
            .ok_or_else(|| LlmError::Extraction(format!("response has no `{}` tool call", self.name())))?;

        parse_arguments(call).map_err(|e| LlmError::Extraction(e.to_string()))
    }
}

/// The outermost `{...}` span of `content`, parsed as an object
fn json_object(content: &str) -> Result<Map<String, Value>, LlmError> {
    let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) else {
        return Err(LlmError::Extraction("content holds no JSON object".to_owned()));
    };
    if end < start {
        return Err(LlmError::Extraction("content holds no JSON object".to_owned()));
    }

    match serde_json::from_str::<Value>(&content[start..=end]) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(LlmError::Extraction("content JSON is not an object".to_owned())),
        Err(e) => Err(LlmError::Extraction(format!("content JSON is malformed: {e}"))),
    }
}
