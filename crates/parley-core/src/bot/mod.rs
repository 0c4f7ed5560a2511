//! The rule-based bot: reply rules, fallback randomness, and the deferred
//! reply scheduler.

pub mod picker;
pub mod rules;
pub mod scheduler;
