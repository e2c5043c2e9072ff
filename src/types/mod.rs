//! Core types for Agentry.

pub mod message;

pub use message::*;
