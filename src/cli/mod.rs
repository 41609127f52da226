//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `create` | Seal a new bottle |
//! | `list [TYPE]` | Show bottles, `ready` ones by default |
//! | `count TYPE` | Count bottles of a type |
//! | `open N` | Read bottle N once its day has come |
//! | `smash N` | Destroy bottle N after confirmation |
//!
//! Bottle types: `all`, `opened`, `unopened`, `ready`, `unready`, `new`
//! (ready and not yet opened).
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod bottle;
mod output;
mod prompt;

pub use app::{run, Cli, Commands};
pub use bottle::{compose_bottle, smash_bottle, CreateArgs, Session, SmashOutcome};
pub use output::{Output, OutputFormat, Style};
pub use prompt::{is_yes, PromptError, Prompter, TerminalPrompter};

/// True when the error is the user backing out of a prompt
pub fn is_interrupted(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<PromptError>(), Some(PromptError::Interrupted))
}
