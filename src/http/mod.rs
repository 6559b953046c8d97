//! HTTP transport for the Model Context Protocol
//!
//! Provides the streaming `/mcp` endpoint plus health and discovery routes.

pub mod handlers;
