//! Model Context Protocol message handling
//!
//! Envelope types and validation, method dispatch, and the newline-delimited
//! stream framing shared by the HTTP and stdio transports.

pub mod dispatcher;
pub mod framer;
pub mod rpc;
