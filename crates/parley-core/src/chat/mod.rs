//! Chat operations over the message store and the bot.

pub mod service;
