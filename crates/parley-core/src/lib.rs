//! Business logic and port definitions for Parley.
//!
//! This crate defines the `MessageLog` port that the infrastructure layer
//! implements, plus the message store, the rule-based responder, and the
//! deferred reply scheduler. It depends only on `parley-types` -- never on
//! `parley-infra` or any filesystem crate.

pub mod bot;
pub mod chat;
pub mod store;
