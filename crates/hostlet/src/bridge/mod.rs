//! Native messaging bridge between the browser extension and this host.
//!
//! This module provides the wire protocol and codec for the framed channel
//! the extension drives over the host's stdin/stdout.
//!
//! # Architecture
//!
//! - **protocol**: Message types (Request/Response)
//! - **codec**: JSON framing codec for AsyncRead/AsyncWrite

pub mod codec;
pub mod protocol;
