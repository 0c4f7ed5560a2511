//! Shared domain types for Parley.
//!
//! This crate contains the core domain types used across the Parley chat log:
//! Message, bot reply tickets, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod message;
pub mod reply;
