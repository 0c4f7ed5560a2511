//! REST API request handlers.

pub mod bot;
pub mod message;
