//! Quire: a flat-file content engine.
//!
//! Content files carry a `key: value` metadata header, an optional `# Heading`
//! and a body. They are scanned into immutable generations of articles,
//! categories and comments, addressed by permalink, and rendered output is
//! cached until the newest modification time across content and templates
//! moves on.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
