//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::PossibleValue;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

use super::bottle::{self, CreateArgs, Session};
use super::output::{Output, OutputFormat};
use super::prompt::TerminalPrompter;
use crate::domain::{FilterKind, SystemClock};
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "bottle")]
#[command(author, version, about = "Write messages to your future self and open them when the day comes")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory holding the bottle collection
    #[arg(long, global = true, env = "BOTTLE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seal a new bottle (prompts for anything not given)
    Create {
        /// Bottle name, 1-30 characters
        #[arg(long)]
        name: Option<String>,

        /// Unlock date (dd.mm.yyyy)
        #[arg(long)]
        unlock: Option<String>,

        /// Message text (opens your editor when omitted)
        #[arg(long)]
        message: Option<String>,
    },

    /// List bottles of a type
    List {
        /// Which bottles to show
        #[arg(value_name = "TYPE", value_enum, ignore_case = true, default_value_t)]
        kind: FilterKind,
    },

    /// Count bottles of a type
    Count {
        /// Which bottles to count
        #[arg(value_name = "TYPE", value_enum, ignore_case = true)]
        kind: FilterKind,
    },

    /// Open a ready bottle and read its message
    Open {
        /// Bottle number as shown by `list`
        index: usize,
    },

    /// Destroy a bottle for good
    Smash {
        /// Bottle number as shown by `list`
        index: usize,
    },
}

impl ValueEnum for FilterKind {
    fn value_variants<'a>() -> &'a [Self] {
        &FilterKind::ALL
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let help = match self {
            FilterKind::All => "every bottle",
            FilterKind::Opened => "already opened",
            FilterKind::Unopened => "not opened yet",
            FilterKind::Ready => "unlock date has arrived",
            FilterKind::Unready => "still locked",
            FilterKind::New => "ready and not opened yet",
        };
        Some(PossibleValue::new(self.as_str()).help(help))
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = Config::load()?.with_data_dir(cli.data_dir);
    let output = Output::new(cli.format, cli.verbose, config.use_color() && !cli.no_color);

    output.verbose("bottle starting");

    let store = config.store()?;
    output.verbose_ctx("config", &format!("Using store at: {}", store.path().display()));

    let session = Session::new(&output, store, config.codec()?, Box::new(SystemClock));
    let mut prompter = TerminalPrompter::new(config.effective_editor());

    match command {
        Commands::Create {
            name,
            unlock,
            message,
        } => {
            output.verbose_ctx(
                "create",
                &format!("Creating bottle, editor: {}", config.effective_editor()),
            );
            bottle::create(
                &session,
                &mut prompter,
                CreateArgs {
                    name,
                    unlock,
                    message,
                },
            )?
        }
        Commands::List { kind } => bottle::list(&session, kind)?,
        Commands::Count { kind } => bottle::count(&session, kind)?,
        Commands::Open { index } => {
            output.verbose_ctx("open", &format!("Opening bottle {}", index));
            bottle::open(&session, index)?
        }
        Commands::Smash { index } => {
            output.verbose_ctx("smash", &format!("Smashing bottle {}", index));
            bottle::smash(&session, &mut prompter, index)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
