//! Interactive tools exposed via Model Context Protocol
//!
//! Provides the `add` and `current_time` tool implementations together with
//! the registry that lists them and routes `tools/call` requests.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rust_mcp_sdk::{
    macros,
    schema::{
        CallToolRequestParams, CallToolResult, ContentBlock, TextContent, Tool, ToolOutputSchema,
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::errors::AppError;
use crate::mcp::rpc::{
    app_error_to_json_rpc, json_rpc_error, json_rpc_error_with_data, json_rpc_result,
    INVALID_PARAMS, METHOD_NOT_FOUND,
};

#[macros::mcp_tool(
    name = "add",
    description = "Adds two given numbers together. Use this for all addition and simple calculation requests."
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct AddTool {
    pub a: f64,
    pub b: f64,
}

#[macros::mcp_tool(
    name = "current_time",
    description = "Returns the current date and time. Use this when the user asks what time it is, or for any time/date-related query."
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct CurrentTimeTool {}

/// One registered tool: discovery metadata plus the call behavior. A handler
/// deserializes its arguments against the declared input shape before any
/// work and returns the structured output record; the registry owns the
/// protocol result envelope.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> Tool;
    async fn call(&self, arguments: Value) -> Result<Map<String, Value>, AppError>;
}

pub struct AddHandler;

#[async_trait]
impl ToolHandler for AddHandler {
    fn definition(&self) -> Tool {
        let mut tool = AddTool::tool();
        tool.title = Some("Addition Tool".to_string());
        tool.output_schema = Some(output_schema(json!({
            "type": "object",
            "properties": {
                "result": { "type": "number" },
            },
            "required": ["result"],
        })));
        tool
    }

    async fn call(&self, arguments: Value) -> Result<Map<String, Value>, AppError> {
        let input: AddTool = serde_json::from_value(arguments).map_err(|err| {
            AppError::validation("invalid_tool_input", format!("add arguments are invalid: {err}"))
        })?;

        // Native f64 addition; no overflow or precision handling beyond it.
        let result = input.a + input.b;
        Ok(Map::from_iter([("result".to_string(), json!(result))]))
    }
}

pub struct CurrentTimeHandler;

#[async_trait]
impl ToolHandler for CurrentTimeHandler {
    fn definition(&self) -> Tool {
        let mut tool = CurrentTimeTool::tool();
        tool.title = Some("Current Time Tool".to_string());
        tool.output_schema = Some(output_schema(json!({
            "type": "object",
            "properties": {
                "result": { "type": "string" },
            },
            "required": ["result"],
        })));
        tool
    }

    /// Extra arguments are accepted and ignored; the tool takes no input.
    async fn call(&self, _arguments: Value) -> Result<Map<String, Value>, AppError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        Ok(Map::from_iter([("result".to_string(), json!(now))]))
    }
}

fn output_schema(schema: Value) -> ToolOutputSchema {
    serde_json::from_value(schema).expect("tool output schema construction")
}

struct RegisteredTool {
    name: String,
    handler: Box<dyn ToolHandler>,
}

/// Ordered tool collection, built once at startup and read-only afterwards.
/// Listing preserves registration order.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Panics on a duplicate name; registration is a startup-time operation
    /// and a collision is a programming error.
    pub fn register(&mut self, handler: impl ToolHandler + 'static) {
        let name = handler.definition().name;
        if self.tools.iter().any(|tool| tool.name == name) {
            panic!("duplicate tool registration: {name}");
        }

        debug!(name = %name, "tool registered");
        self.tools.push(RegisteredTool {
            name,
            handler: Box::new(handler),
        });
    }

    pub fn definitions(&self) -> Vec<Tool> {
        self.tools.iter().map(|tool| tool.handler.definition()).collect()
    }

    pub async fn handle_call(&self, id: Option<Value>, params: Option<Value>) -> Value {
        let Some(raw_params) = params else {
            return json_rpc_error(id, INVALID_PARAMS, "Invalid params");
        };

        let tool_call: CallToolRequestParams = match serde_json::from_value(raw_params) {
            Ok(value) => value,
            Err(_) => return json_rpc_error(id, INVALID_PARAMS, "Invalid params"),
        };

        let Some(registered) = self.tools.iter().find(|tool| tool.name == tool_call.name) else {
            return json_rpc_error_with_data(
                id,
                METHOD_NOT_FOUND,
                "Method not found",
                Some(json!({
                    "code": "tool_not_found",
                    "message": "unknown tool name",
                    "details": {
                        "name": tool_call.name,
                    },
                })),
            );
        };

        let arguments = json!(tool_call.arguments.unwrap_or_default());
        match registered.handler.call(arguments).await {
            Ok(output) => {
                let rendered = Value::Object(output.clone()).to_string();
                json_rpc_result(
                    id,
                    serde_json::to_value(CallToolResult {
                        content: vec![ContentBlock::from(TextContent::new(rendered, None, None))],
                        is_error: None,
                        meta: None,
                        structured_content: Some(output),
                    })
                    .expect("tool call result serialization"),
                )
            }
            Err(err) => app_error_to_json_rpc(id, err),
        }
    }
}
