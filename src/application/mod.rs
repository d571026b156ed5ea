//! Application layer managing state and workflows.
//!
//! This module coordinates between the domain layer and presentation
//! layer: dashboard state, mode switching, and wizard hosting.

pub mod state;

pub use state::*;
