//! Domain tool and resource implementations
//!
//! Provides the demo capabilities exposed over the MCP protocol: the `add`
//! and `current_time` tools and the templated greeting resource.

pub mod resources;
pub mod tools;
