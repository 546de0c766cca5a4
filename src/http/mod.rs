//! HTTP front door for the Model Context Protocol
//!
//! Provides the external API routing, the `/mcp` endpoint handlers and the
//! localhost CORS filter.

pub mod cors;
pub mod handlers;
