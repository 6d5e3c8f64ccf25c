//! Matching raw tool calls to declared tools
//!
//! Every raw call is matched by exact name against the declared tools (first
//! declaration wins), its argument text is parsed and validated, and the result
//! is reported per call. A failure on one call never affects its siblings.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
pub use unison_config::ToolMatchPolicy;

use crate::error::ToolError;
use crate::schema::ToolSchema;
use crate::types::ToolCall;

/// A tool call whose arguments satisfied its declared schema
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInstance {
    tool_call: ToolCall,
    arguments: Map<String, Value>,
}

impl ToolInstance {
    /// Identifier of the originating call, echoed back in tool results
    pub fn id(&self) -> &str {
        &self.tool_call.id
    }

    /// Name of the matched tool
    pub fn name(&self) -> &str {
        self.tool_call.name()
    }

    /// The raw call this instance was built from
    pub const fn tool_call(&self) -> &ToolCall {
        &self.tool_call
    }

    /// Validated argument object
    pub const fn arguments(&self) -> &Map<String, Value> {
        &self.arguments
    }

    /// A single argument by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// Deserialize the arguments into a typed value
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.arguments.clone()))
    }

    /// Deserialize the arguments into `T` and run it
    pub fn call<T: Tool>(&self) -> Result<String, serde_json::Error> {
        Ok(self.parse::<T>()?.call())
    }
}

/// Outcome of matching one raw tool call
pub type ToolOutcome = Result<ToolInstance, ToolError>;

/// A typed tool: its arguments deserialize into `Self`, and `call` runs it
///
/// ```
/// use serde::Deserialize;
/// use unison_llm::{Field, FieldType, Tool, ToolSchema};
///
/// #[derive(Deserialize)]
/// struct GetWeather {
///     city: String,
/// }
///
/// impl Tool for GetWeather {
///     fn schema() -> ToolSchema {
///         ToolSchema::new("get_weather", "Current weather for a city")
///             .with_field(Field::new("city", FieldType::String))
///     }
///
///     fn call(&self) -> String {
///         format!("sunny in {}", self.city)
///     }
/// }
/// ```
pub trait Tool: DeserializeOwned {
    /// Declared name, description and parameters
    fn schema() -> ToolSchema;

    /// Execute the tool, returning the text sent back to the model
    fn call(&self) -> String;
}

/// Parse a call's argument text into an object
///
/// Blank text is treated as an empty object, which is what providers send for
/// tools without parameters.
pub fn parse_arguments(tool_call: &ToolCall) -> Result<Map<String, Value>, ToolError> {
    let text = tool_call.arguments().trim();
    if text.is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(arguments)) => Ok(arguments),
        Ok(other) => Err(ToolError::MalformedArguments {
            tool_call: tool_call.clone(),
            reason: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
        Err(e) => Err(ToolError::MalformedArguments {
            tool_call: tool_call.clone(),
            reason: e.to_string(),
        }),
    }
}

/// Match, parse and validate one call against a declared tool
pub fn validate_call(tool_call: &ToolCall, schema: &ToolSchema) -> ToolOutcome {
    let arguments = parse_arguments(tool_call)?;

    schema
        .validate(&arguments)
        .map_err(|violation| ToolError::InvalidArguments {
            tool_call: tool_call.clone(),
            violation,
        })?;

    Ok(ToolInstance {
        tool_call: tool_call.clone(),
        arguments,
    })
}

/// Match every raw call against the declared tools, preserving call order
///
/// Returns an empty list when no tools are declared.
pub fn match_tool_calls(calls: &[ToolCall], declared: &[ToolSchema], policy: ToolMatchPolicy) -> Vec<ToolOutcome> {
    if declared.is_empty() {
        return Vec::new();
    }

    let mut outcomes = Vec::with_capacity(calls.len());

    for call in calls {
        let Some(schema) = declared.iter().find(|tool| tool.name == call.name()) else {
            match policy {
                ToolMatchPolicy::Lenient => {
                    tracing::debug!(tool = %call.name(), id = %call.id, "dropping call to undeclared tool");
                }
                ToolMatchPolicy::Strict => {
                    tracing::warn!(tool = %call.name(), id = %call.id, "call to undeclared tool");
                    outcomes.push(Err(ToolError::UnmatchedTool {
                        tool_call: call.clone(),
                    }));
                }
            }
            continue;
        };

        let outcome = validate_call(call, schema);
        if let Err(e) = &outcome {
            tracing::warn!(tool = %call.name(), id = %call.id, error = %e, "tool call rejected");
        }
        outcomes.push(outcome);
    }

    outcomes
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::schema::{Field, FieldType};

    #[derive(Debug, Deserialize)]
    struct FormatBook {
        title: String,
        author: String,
    }

    impl Tool for FormatBook {
        fn schema() -> ToolSchema {
            ToolSchema::new("format_book", "Returns the title and author nicely formatted")
                .with_field(Field::new("title", FieldType::String))
                .with_field(Field::new("author", FieldType::String))
        }

        fn call(&self) -> String {
            format!("{} by {}", self.title, self.author)
        }
    }

    fn weather() -> ToolSchema {
        ToolSchema::new("get_weather", "").with_field(Field::new("city", FieldType::String))
    }

    fn book_call(id: &str, args: &str) -> ToolCall {
        ToolCall::new(id, "format_book", args)
    }

    #[test]
    fn no_declared_tools_yields_nothing() {
        let calls = [book_call("call_1", r#"{"title":"a","author":"b"}"#)];
        assert!(match_tool_calls(&calls, &[], ToolMatchPolicy::Strict).is_empty());
    }

    #[test]
    fn instance_keeps_raw_call_id() {
        let calls = [book_call("call_abc", r#"{"title":"Dune","author":"Frank Herbert"}"#)];
        let outcomes = match_tool_calls(&calls, &[FormatBook::schema()], ToolMatchPolicy::Lenient);

        let instance = outcomes[0].as_ref().unwrap();
        assert_eq!(instance.id(), "call_abc");
        assert_eq!(instance.name(), "format_book");
        assert_eq!(instance.get("title"), Some(&json!("Dune")));
        assert_eq!(instance.call::<FormatBook>().unwrap(), "Dune by Frank Herbert");
    }

    #[test]
    fn malformed_call_does_not_affect_siblings() {
        let calls = [
            book_call("call_1", r#"{"title":"Dune""#),
            book_call("call_2", r#"{"title":"Emma","author":"Jane Austen"}"#),
        ];
        let outcomes = match_tool_calls(&calls, &[FormatBook::schema()], ToolMatchPolicy::Lenient);

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(&outcomes[0], Err(ToolError::MalformedArguments { tool_call, .. }) if tool_call.id == "call_1"));
        assert_eq!(outcomes[1].as_ref().unwrap().id(), "call_2");
    }

    #[test]
    fn schema_violation_is_reported_with_path() {
        let calls = [book_call("call_1", r#"{"title":"Dune"}"#)];
        let outcomes = match_tool_calls(&calls, &[FormatBook::schema()], ToolMatchPolicy::Lenient);

        let Err(ToolError::InvalidArguments { violation, .. }) = &outcomes[0] else {
            panic!("expected invalid arguments, got {:?}", outcomes[0]);
        };
        assert_eq!(violation.path, "author");
    }

    #[test]
    fn non_object_arguments_are_malformed() {
        let calls = [book_call("call_1", "[1, 2]")];
        let outcomes = match_tool_calls(&calls, &[FormatBook::schema()], ToolMatchPolicy::Lenient);

        let Err(ToolError::MalformedArguments { reason, .. }) = &outcomes[0] else {
            panic!("expected malformed arguments");
        };
        assert!(reason.contains("an array"));
    }

    #[test]
    fn unmatched_calls_follow_policy() {
        let calls = [
            ToolCall::new("call_1", "lookup_isbn", "{}"),
            book_call("call_2", r#"{"title":"Emma","author":"Jane Austen"}"#),
        ];
        let declared = [FormatBook::schema()];

        let lenient = match_tool_calls(&calls, &declared, ToolMatchPolicy::Lenient);
        assert_eq!(lenient.len(), 1);
        assert_eq!(lenient[0].as_ref().unwrap().id(), "call_2");

        let strict = match_tool_calls(&calls, &declared, ToolMatchPolicy::Strict);
        assert_eq!(strict.len(), 2);
        assert!(matches!(&strict[0], Err(ToolError::UnmatchedTool { tool_call }) if tool_call.name() == "lookup_isbn"));
    }

    #[test]
    fn output_order_follows_call_order() {
        let calls = [
            ToolCall::new("call_1", "get_weather", r#"{"city":"Oslo"}"#),
            book_call("call_2", r#"{"title":"Emma","author":"Jane Austen"}"#),
            ToolCall::new("call_3", "get_weather", r#"{"city":"Lima"}"#),
        ];
        let outcomes = match_tool_calls(&calls, &[FormatBook::schema(), weather()], ToolMatchPolicy::Lenient);

        let ids: Vec<&str> = outcomes.iter().map(|o| o.as_ref().unwrap().id()).collect();
        assert_eq!(ids, ["call_1", "call_2", "call_3"]);
    }

    #[test]
    fn first_declaration_wins_on_duplicate_names() {
        let strict_city = weather();
        let loose = ToolSchema::new("get_weather", "");
        let calls = [ToolCall::new("call_1", "get_weather", "{}")];

        let outcomes = match_tool_calls(&calls, &[strict_city, loose], ToolMatchPolicy::Lenient);
        assert!(matches!(outcomes[0], Err(ToolError::InvalidArguments { .. })));
    }

    #[test]
    fn blank_arguments_mean_no_arguments() {
        let tool = ToolSchema::new("list_books", "");
        let calls = [ToolCall::new("call_1", "list_books", "")];

        let outcomes = match_tool_calls(&calls, &[tool], ToolMatchPolicy::Lenient);
        assert!(outcomes[0].as_ref().unwrap().arguments().is_empty());
    }
}
