//! # Storage Layer
//!
//! Persistence for the bottle collection and user configuration.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Bottles | JSONL (one JSON per line) | `<data_dir>/bottles.jsonl` |
//! | Write lock | empty file | `<data_dir>/bottles.jsonl.lock` |
//! | Config | TOML | `<config_dir>/config.toml` |
//!
//! The collection is small, so it is always loaded whole and rewritten whole.
//! Writes go through a temp file and a rename. Commands that change the
//! collection hold an `fs2` lock on `<data_dir>/bottles.jsonl.lock` from
//! load to save, so concurrent changes are serialized. Plain reads take no
//! lock.

mod config;
mod jsonl;

pub use config::{Config, ConfigError};
pub use jsonl::{BottleStore, StoreLock, STORE_FILE};
