//! The central Model Context Protocol engine
//!
//! Provides MCP JSON-RPC decoding, request shape validation, capabilities
//! negotiation (`initialize`), and method routing into the tool and resource
//! registries.

use rust_mcp_sdk::schema::{
    CallToolRequest, Implementation, InitializeRequest, InitializeResult, JsonrpcMessage,
    JsonrpcRequest, ListResourceTemplatesRequest, ListResourceTemplatesResult,
    ListResourcesRequest, ListResourcesResult, ListToolsRequest, ListToolsResult, PingRequest,
    ReadResourceRequest, ServerCapabilities, ServerCapabilitiesResources, ServerCapabilitiesTools,
};
use serde_json::{json, Value};
use tracing::info;

use crate::domain::{
    resources::{ResourceRegistry, ResourceResolver},
    tools::{ToolHandler, ToolRegistry},
};
use crate::errors::AppError;
use crate::mcp::rpc::{
    app_error_to_json_rpc, is_json_rpc_error, json_rpc_error, json_rpc_result,
    request_id_to_value, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
};

/// Protocol revisions this server can speak, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];
pub const LATEST_PROTOCOL_VERSION: &str = SUPPORTED_PROTOCOL_VERSIONS[0];

/// Process-wide protocol server: the server identity plus the tool and
/// resource registries. Built mutably at startup, then frozen behind an
/// `Arc` and shared read-only by every request transport.
pub struct McpServer {
    info: Implementation,
    tools: ToolRegistry,
    resources: ResourceRegistry,
}

impl McpServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: Implementation {
                name: name.into(),
                version: version.into(),
                title: None,
                description: None,
                icons: vec![],
                website_url: None,
            },
            tools: ToolRegistry::new(),
            resources: ResourceRegistry::new(),
        }
    }

    /// Panics on a duplicate tool name; registration is a startup-time
    /// operation and a collision is a programming error.
    pub fn register_tool(&mut self, handler: impl ToolHandler + 'static) {
        self.tools.register(handler);
    }

    /// Panics on a duplicate resource name or an uncompilable URI template,
    /// under the same startup-time rules as [`McpServer::register_tool`].
    pub fn register_resource(&mut self, resolver: impl ResourceResolver + 'static) {
        self.resources.register(resolver);
    }

    /// Decodes one JSON-RPC envelope and dispatches it. Returns `None` for
    /// notifications, which are processed but produce no response.
    pub async fn handle_json_rpc_value(&self, payload: Value) -> Option<Value> {
        if !payload.is_object() {
            return Some(json_rpc_error(None, INVALID_REQUEST, "Invalid Request"));
        }

        let request_id = payload.get("id").cloned();
        let parsed: JsonrpcMessage = match serde_json::from_value(payload) {
            Ok(message) => message,
            Err(_) => return Some(json_rpc_error(request_id, INVALID_REQUEST, "Invalid Request")),
        };

        match parsed {
            JsonrpcMessage::Request(request) => {
                if let Err(error_response) = validate_request_shape(&request) {
                    return Some(error_response);
                }

                let request_id = request_id_to_value(request.id);
                if request.method.trim().is_empty() {
                    return Some(json_rpc_error(
                        Some(request_id),
                        INVALID_REQUEST,
                        "Invalid Request",
                    ));
                }

                Some(
                    self.handle_json_rpc_request(
                        Some(request_id),
                        request.method,
                        request.params.map(Value::Object),
                    )
                    .await,
                )
            }
            JsonrpcMessage::Notification(notification) => {
                if notification.method.trim().is_empty() {
                    return None;
                }

                let _ = self
                    .handle_json_rpc_request(
                        None,
                        notification.method,
                        notification.params.map(Value::Object),
                    )
                    .await;
                None
            }
            JsonrpcMessage::ResultResponse(_) | JsonrpcMessage::ErrorResponse(_) => {
                Some(json_rpc_error(request_id, INVALID_REQUEST, "Invalid Request"))
            }
        }
    }

    pub async fn handle_json_rpc_request(
        &self,
        id: Option<Value>,
        method: String,
        params: Option<Value>,
    ) -> Value {
        let response = match method.as_str() {
            "initialize" => {
                let protocol_version = match negotiate_protocol_version(params.as_ref()) {
                    Ok(version) => version,
                    Err(err) => return app_error_to_json_rpc(id, err),
                };

                let initialize_result = InitializeResult {
                    server_info: self.info.clone(),
                    capabilities: ServerCapabilities {
                        tools: Some(ServerCapabilitiesTools {
                            list_changed: Some(false),
                        }),
                        resources: Some(ServerCapabilitiesResources {
                            subscribe: Some(false),
                            list_changed: Some(false),
                        }),
                        prompts: None,
                        ..Default::default()
                    },
                    protocol_version,
                    instructions: None,
                    meta: None,
                };

                json_rpc_result(
                    id,
                    serde_json::to_value(initialize_result)
                        .expect("initialize result serialization"),
                )
            }
            "ping" => json_rpc_result(id, json!({})),
            "tools/list" => json_rpc_result(
                id,
                serde_json::to_value(ListToolsResult {
                    meta: None,
                    next_cursor: None,
                    tools: self.tools.definitions(),
                })
                .expect("tools list result serialization"),
            ),
            "tools/call" => self.tools.handle_call(id, params).await,
            // Templated resources are not enumerable as concrete resources;
            // they appear only under resources/templates/list.
            "resources/list" => json_rpc_result(
                id,
                serde_json::to_value(ListResourcesResult {
                    meta: None,
                    next_cursor: None,
                    resources: Vec::new(),
                })
                .expect("resources list result serialization"),
            ),
            "resources/templates/list" => json_rpc_result(
                id,
                serde_json::to_value(ListResourceTemplatesResult {
                    meta: None,
                    next_cursor: None,
                    resource_templates: self.resources.templates(),
                })
                .expect("resource templates list result serialization"),
            ),
            "resources/read" => self.resources.handle_read(id, params).await,
            _ => json_rpc_error(id, METHOD_NOT_FOUND, "Method not found"),
        };

        info!(
            method = %method,
            outcome = if is_json_rpc_error(&response) { "failure" } else { "success" },
            "mcp request dispatched"
        );

        response
    }
}

pub fn validate_request_shape(request: &JsonrpcRequest) -> Result<(), Value> {
    let payload = serde_json::to_value(request).expect("jsonrpc request serialization");
    let request_id = Some(request_id_to_value(request.id.clone()));

    let valid = match request.method.as_str() {
        "tools/call" => serde_json::from_value::<CallToolRequest>(payload).is_ok(),
        "resources/read" => serde_json::from_value::<ReadResourceRequest>(payload).is_ok(),
        "tools/list" => serde_json::from_value::<ListToolsRequest>(payload).is_ok(),
        "resources/list" => serde_json::from_value::<ListResourcesRequest>(payload).is_ok(),
        "resources/templates/list" => {
            serde_json::from_value::<ListResourceTemplatesRequest>(payload).is_ok()
        }
        "ping" => serde_json::from_value::<PingRequest>(payload).is_ok(),
        "initialize" => serde_json::from_value::<InitializeRequest>(payload).is_ok(),
        _ => true,
    };

    if valid {
        Ok(())
    } else {
        Err(json_rpc_error(request_id, INVALID_PARAMS, "Invalid params"))
    }
}

/// Echoes the offered protocol version when it is supported; unknown versions
/// are answered with the latest supported version instead of being rejected.
/// Only a missing or empty `protocolVersion` is an error.
pub fn negotiate_protocol_version(params: Option<&Value>) -> Result<String, AppError> {
    let offered_version = params
        .and_then(Value::as_object)
        .and_then(|object| object.get("protocolVersion"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|version| !version.is_empty())
        .ok_or_else(|| {
            AppError::validation(
                "invalid_protocol_version",
                "initialize params.protocolVersion must be a non-empty string",
            )
        })?;

    if SUPPORTED_PROTOCOL_VERSIONS.contains(&offered_version) {
        Ok(offered_version.to_string())
    } else {
        Ok(LATEST_PROTOCOL_VERSION.to_string())
    }
}
