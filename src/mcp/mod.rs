//! Model Context Protocol (MCP) server handling and JSON-RPC implementations
//!
//! Provides protocol-level specifics surrounding JSON-RPC validation, negotiation,
//! formatting, and the per-request transport lifecycle.

pub mod rpc;
pub mod server;
pub mod transport;
pub mod uri_template;
