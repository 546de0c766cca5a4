//! Request-scoped protocol transport
//!
//! One `RequestTransport` exists per inbound HTTP request. It walks
//! Created → Attached → Processing → Responding → Closed, carries exactly one
//! request/response cycle against the shared `McpServer`, and is closed at the
//! latest by `Drop` when the request scope ends. Transports are never reused
//! and never shared across requests.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::mcp::rpc::{json_rpc_error, INVALID_REQUEST};
use crate::mcp::server::McpServer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport is already attached to a server")]
    AlreadyAttached,
    #[error("transport is not attached to a server")]
    NotAttached,
    #[error("transport already handled its request")]
    AlreadyHandled,
    #[error("transport is closed")]
    Closed,
    #[error("streaming responses are not supported; json responses must stay enabled")]
    StreamingUnsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Created,
    Attached,
    Processing,
    Responding,
    Closed,
}

#[derive(Clone)]
pub struct TransportOptions {
    /// `None` disables session identity: no session id is issued or expected
    /// on the wire.
    pub session_id_generator: Option<fn() -> String>,
    /// Respond with a single JSON body instead of a chunked event stream.
    pub enable_json_response: bool,
}

impl Default for TransportOptions {
    /// The per-request configuration: stateless (no session ids) and
    /// JSON-responding.
    fn default() -> Self {
        Self {
            session_id_generator: None,
            enable_json_response: true,
        }
    }
}

pub struct RequestTransport {
    options: TransportOptions,
    session_id: Option<String>,
    server: Option<Arc<McpServer>>,
    state: TransportState,
}

impl RequestTransport {
    pub fn new(options: TransportOptions) -> Self {
        let session_id = options.session_id_generator.map(|generate| generate());
        Self {
            options,
            session_id,
            server: None,
            state: TransportState::Created,
        }
    }

    /// Factory for the per-request transport: session identity disabled,
    /// JSON responses enabled.
    pub fn for_request() -> Self {
        Self::new(TransportOptions::default())
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Connects the shared protocol server to this transport. The server
    /// holds no per-connection state, so attaching is cheap and repeatable
    /// across any number of transports.
    pub fn attach(&mut self, server: Arc<McpServer>) -> Result<(), TransportError> {
        match self.state {
            TransportState::Created => {
                self.server = Some(server);
                self.state = TransportState::Attached;
                Ok(())
            }
            TransportState::Closed => Err(TransportError::Closed),
            _ => Err(TransportError::AlreadyAttached),
        }
    }

    /// Processes the parsed JSON body of the owning HTTP request: decodes the
    /// envelope (single or batch), dispatches through the attached server,
    /// and returns the encoded response. `None` means nothing is owed to the
    /// caller (notification-only input). A transport handles exactly one
    /// request; a second call is a state error.
    pub async fn handle(&mut self, payload: Value) -> Result<Option<Value>, TransportError> {
        match self.state {
            TransportState::Created => return Err(TransportError::NotAttached),
            TransportState::Attached => {}
            TransportState::Processing | TransportState::Responding => {
                return Err(TransportError::AlreadyHandled)
            }
            TransportState::Closed => return Err(TransportError::Closed),
        }
        if !self.options.enable_json_response {
            return Err(TransportError::StreamingUnsupported);
        }
        let Some(server) = self.server.clone() else {
            return Err(TransportError::NotAttached);
        };

        self.state = TransportState::Processing;

        let response = match payload {
            Value::Array(batch) => {
                if batch.is_empty() {
                    Some(Value::Array(vec![json_rpc_error(
                        None,
                        INVALID_REQUEST,
                        "Invalid Request",
                    )]))
                } else {
                    let mut responses = Vec::new();
                    for entry in batch {
                        if let Some(response) = server.handle_json_rpc_value(entry).await {
                            responses.push(response);
                        }
                    }

                    if responses.is_empty() {
                        None
                    } else {
                        Some(Value::Array(responses))
                    }
                }
            }
            payload => server.handle_json_rpc_value(payload).await,
        };

        self.state = TransportState::Responding;
        Ok(response)
    }

    /// Releases the transport. Idempotent: a second close is a no-op, and
    /// `Drop` closes any transport that was not closed explicitly.
    pub fn close(&mut self) {
        if self.state == TransportState::Closed {
            return;
        }
        self.state = TransportState::Closed;
        self.server = None;
        debug!("request transport closed");
    }
}

impl Drop for RequestTransport {
    fn drop(&mut self) {
        self.close();
    }
}
