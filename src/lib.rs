//! bottle - time-locked messages to your future self
//!
//! A bottle holds a message that cannot be read before its unlock date.
//! Bottles are created, listed, counted, opened and smashed from the
//! command line; the whole collection lives in one JSONL file with each
//! message obfuscated (not encrypted) at rest.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Bottle, BottleDate, BottleState, Codec, Collection, FilterKind};
