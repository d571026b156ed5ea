//! Infrastructure layer providing external service integrations.
//!
//! This module contains the trade backend gateways (in-memory mock and
//! HTTP) and file exports.

pub mod api;
pub mod export;

pub use api::*;
pub use export::*;
