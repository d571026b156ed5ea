//! freightdesk - Terminal Trade Desk Library
//!
//! A terminal dashboard for logistics and trade management: shipment and
//! partner tables backed by a pluggable gateway, with guided multi-step
//! creation wizards built on a reusable wizard engine.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::*;
pub use domain::*;
