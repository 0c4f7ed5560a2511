//! Infrastructure layer for Parley.
//!
//! Contains the implementation of the `MessageLog` port defined in
//! `parley-core` (a JSON document on the local filesystem), data directory
//! resolution, and the `config.toml` loader.

pub mod config;
pub mod filesystem;
