//! API module for the Streamable HTTP transport
//!
//! This module provides the HTTP endpoints and the resumable SSE stream
//! that carries server-to-client MCP messages.

pub mod http;
pub mod sse;
