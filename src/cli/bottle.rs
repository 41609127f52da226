//! Bottle commands: create, list, count, open, smash
//!
//! Every command loads the whole collection and puts it in display order
//! before doing anything, so the indices users see in `list` are the ones
//! `open` and `smash` accept. Mutating commands hold the store lock from
//! load until they write the whole collection back.

use anyhow::Result;
use serde::Serialize;

use super::output::{Output, Style};
use super::prompt::{is_yes, PromptError, Prompter};
use crate::domain::{
    validate_date, validate_name, Bottle, BottleDate, BottleError, BottleState, Clock, Codec,
    Collection, Entry, FilterKind, Opening,
};
use crate::storage::{BottleStore, StoreLock};

/// Everything a command needs: where bottles live, how messages are masked,
/// and what day it is
pub struct Session<'a> {
    output: &'a Output,
    store: BottleStore,
    codec: Codec,
    clock: Box<dyn Clock>,
}

impl<'a> Session<'a> {
    pub fn new(output: &'a Output, store: BottleStore, codec: Codec, clock: Box<dyn Clock>) -> Self {
        Self {
            output,
            store,
            codec,
            clock,
        }
    }

    fn today(&self) -> BottleDate {
        self.clock.today()
    }

    /// Loads the collection in display order
    fn load(&self) -> Result<Collection> {
        let collection = self.store.load()?.sorted(self.today());
        self.output.verbose_ctx(
            "store",
            &format!(
                "Loaded {} bottle(s) from {}",
                collection.len(),
                self.store.path().display()
            ),
        );
        Ok(collection)
    }

    /// Waits for other invocations that are changing the collection
    fn lock(&self) -> Result<StoreLock> {
        let lock = self.store.lock()?;
        self.output.verbose_ctx("store", "Acquired store lock");
        Ok(lock)
    }

    fn save(&self, collection: &Collection) -> Result<()> {
        self.store.save(collection)?;
        self.output.verbose_ctx(
            "store",
            &format!(
                "Saved {} bottle(s) to {}",
                collection.len(),
                self.store.path().display()
            ),
        );
        Ok(())
    }
}

/// Values given on the command line for `create`; missing ones are prompted for
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    pub name: Option<String>,
    pub unlock: Option<String>,
    pub message: Option<String>,
}

/// Seals a new bottle and appends it to the collection
pub fn create(session: &Session, prompter: &mut dyn Prompter, args: CreateArgs) -> Result<()> {
    let output = session.output;
    let today = session.today();

    let Some(bottle) = compose_bottle(prompter, args, &session.codec, session.clock.as_ref())?
    else {
        output.success("Empty message, no bottle was created.");
        return Ok(());
    };

    // Lock and load only after the interactive part so a long editing
    // session neither blocks nor overwrites other invocations
    let _lock = session.lock()?;
    let mut collection = session.load()?;
    collection.push(bottle.clone());
    session.save(&collection)?;

    let index = collection
        .sorted(today)
        .iter()
        .position(|b| *b == bottle)
        .map_or(0, |i| i + 1);

    if output.is_json() {
        output.data(&BottleRow::new(index, &bottle, today));
    } else {
        output.success(&format!(
            "Sealed bottle {} '{}'; it can be opened on {}.",
            index, bottle.name, bottle.unlock_date
        ));
    }

    Ok(())
}

/// Collects name, unlock date and message, reprompting on invalid answers
///
/// Values passed as arguments are validated but not reprompted. Returns
/// `None` when the message is empty.
pub fn compose_bottle(
    prompter: &mut dyn Prompter,
    args: CreateArgs,
    codec: &Codec,
    clock: &dyn Clock,
) -> Result<Option<Bottle>> {
    let name = match args.name {
        Some(raw) => validate_name(&raw)?,
        None => loop {
            let raw = prompter.ask("Name (1-30 characters): ")?;
            match validate_name(&raw) {
                Ok(name) => break name,
                Err(e) => prompter.say(&e.to_string()),
            }
        },
    };

    let unlock_date = match args.unlock {
        Some(raw) => validate_date(&raw)?,
        None => loop {
            let raw = prompter.ask("Unlock date (dd.mm.yyyy): ")?;
            match validate_date(&raw) {
                Ok(date) => break date,
                Err(e) => prompter.say(&e.to_string()),
            }
        },
    };

    if unlock_date <= clock.today() {
        prompter.say(&format!(
            "Note: {} has already arrived, so this bottle can be opened right away.",
            unlock_date
        ));
    }

    let message = match args.message {
        Some(message) => message,
        None => prompter.compose()?,
    };

    if message.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(Bottle::seal(&name, unlock_date, &message, codec, clock)?))
}

/// One row of `list` output
#[derive(Debug, Serialize)]
struct BottleRow {
    index: usize,
    name: String,
    unlock_date: BottleDate,
    created_date: BottleDate,
    opened: bool,
    ready: bool,
    state: BottleState,
}

impl BottleRow {
    fn new(index: usize, bottle: &Bottle, today: BottleDate) -> Self {
        Self {
            index,
            name: bottle.name.clone(),
            unlock_date: bottle.unlock_date,
            created_date: bottle.created_date(),
            opened: bottle.is_opened(),
            ready: bottle.is_ready(today),
            state: bottle.state(today),
        }
    }
}

/// Lists bottles of one kind with their collection-wide indices
pub fn list(session: &Session, kind: FilterKind) -> Result<()> {
    let output = session.output;
    let today = session.today();
    let collection = session.load()?;
    let entries = collection.filter(kind, today);

    output.verbose_ctx(
        "list",
        &format!("{} of {} bottle(s) match '{}'", entries.len(), collection.len(), kind),
    );

    if output.is_json() {
        let rows: Vec<_> = entries
            .iter()
            .map(|e| BottleRow::new(e.index, e.bottle, today))
            .collect();
        output.data(&rows);
    } else if entries.is_empty() {
        match kind {
            FilterKind::All => println!("No bottles found."),
            _ => println!("No {} bottles found.", kind),
        }
    } else {
        println!("{:<4} {:<30} UNLOCKS", "#", "NAME");
        println!("{}", "-".repeat(56));
        for entry in &entries {
            println!(
                "{:<4} {:<30} {}",
                entry.index,
                entry.bottle.name,
                unlock_column(output, entry, today)
            );
        }
    }

    Ok(())
}

fn unlock_column(output: &Output, entry: &Entry<'_>, today: BottleDate) -> String {
    let date = entry.bottle.unlock_date.to_string();
    let state = entry.bottle.state(today);
    let tag = format!("[{}]", state.label());
    match state {
        BottleState::Opened => output.paint(&format!("{} {}", date, tag), Style::Opened),
        BottleState::SealedReady => format!("{} {}", date, output.paint(&tag, Style::Ready)),
        BottleState::SealedNotReady => date,
    }
}

/// Prints how many bottles are of one kind
pub fn count(session: &Session, kind: FilterKind) -> Result<()> {
    let output = session.output;
    let count = session.load()?.count(kind, session.today());

    if output.is_json() {
        output.data(&serde_json::json!({
            "type": kind,
            "count": count,
        }));
    } else {
        println!("{}", count);
    }

    Ok(())
}

/// Opens the bottle at a 1-based index, persisting the opened flag
pub fn open(session: &Session, index: usize) -> Result<()> {
    let output = session.output;
    let _lock = session.lock()?;
    let mut collection = session.load()?;

    let Some(bottle) = collection.get_mut(index) else {
        output.error(&format!("Bottle {} not found", index));
        return Ok(());
    };

    let opening = match bottle.open(&session.codec, session.clock.as_ref()) {
        Ok(opening) => opening,
        Err(refusal @ BottleError::NotReady { .. }) => {
            output.verbose_ctx("open", &format!("Refused bottle {}", index));
            if output.is_json() {
                output.data(&serde_json::json!({
                    "success": false,
                    "message": refusal.to_string(),
                }));
            } else {
                println!("{}", output.paint(&refusal.to_string(), Style::Warning));
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if opening.first_time {
        session.save(&collection)?;
    }

    if output.is_json() {
        output.data(&opening);
    } else {
        print_opening(output, &opening);
    }

    Ok(())
}

fn print_opening(output: &Output, opening: &Opening) {
    println!(
        "{}",
        output.paint(&format!("Bottle '{}'", opening.name), Style::Bold)
    );
    println!();
    println!("{}", opening.message);
    println!();

    let when = match opening.days_elapsed {
        0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{} days ago", n),
    };
    println!(
        "{}",
        output.paint(
            &format!("Sealed {}, on {}.", when, opening.created_phrase()),
            Style::Opened
        )
    );
}

/// Result of a smash attempt
#[derive(Debug, PartialEq, Eq)]
pub enum SmashOutcome {
    NotFound,
    Declined,
    NameMismatch,
    Smashed(Bottle),
}

/// Removes a bottle after the user confirms twice: a yes/no question, then
/// retyping the bottle's exact name
pub fn smash_bottle(
    collection: &mut Collection,
    index: usize,
    prompter: &mut dyn Prompter,
) -> Result<SmashOutcome, PromptError> {
    let Some(bottle) = collection.get(index) else {
        return Ok(SmashOutcome::NotFound);
    };
    let name = bottle.name.clone();

    let answer = prompter.ask(&format!(
        "Smash bottle {} '{}'? Its message will be lost forever [y/N]: ",
        index, name
    ))?;
    if !is_yes(&answer) {
        return Ok(SmashOutcome::Declined);
    }

    let typed = prompter.ask("Type the bottle's name to confirm: ")?;
    if typed != name {
        return Ok(SmashOutcome::NameMismatch);
    }

    Ok(collection
        .remove(index)
        .map_or(SmashOutcome::NotFound, SmashOutcome::Smashed))
}

/// Deletes the bottle at a 1-based index after confirmation
pub fn smash(session: &Session, prompter: &mut dyn Prompter, index: usize) -> Result<()> {
    let output = session.output;
    let _lock = session.lock()?;
    let mut collection = session.load()?;

    match smash_bottle(&mut collection, index, prompter)? {
        SmashOutcome::NotFound => output.error(&format!("Bottle {} not found", index)),
        SmashOutcome::Declined => output.success("Bottle left intact."),
        SmashOutcome::NameMismatch => output.success("Name does not match; bottle left intact."),
        SmashOutcome::Smashed(bottle) => {
            session.save(&collection)?;
            output.success(&format!("Smashed bottle '{}'.", bottle.name));
        }
    }

    Ok(())
}
