//! Bottle domain model
//!
//! A bottle holds an obfuscated message that may only be read once its
//! unlock date has arrived. Readiness is derived from the clock and never
//! stored; the only persisted state change is sealed -> opened.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::clock::Clock;
use super::codec::{Codec, CodecError};
use super::date::{month_name, ordinal, BottleDate};

/// Longest allowed bottle name, in characters
pub const MAX_NAME_LEN: usize = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,

    #[error("Name must be at most 30 characters (got {0})")]
    TooLong(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BottleError {
    #[error("Bottle '{name}' cannot be opened until {unlock_date} ({days_left} more day(s))")]
    NotReady {
        name: String,
        unlock_date: BottleDate,
        days_left: i64,
    },

    #[error(transparent)]
    Name(#[from] NameError),

    #[error("Could not read the message in bottle '{name}': {source}")]
    Corrupt {
        name: String,
        #[source]
        source: CodecError,
    },
}

/// Trims and checks a bottle name
pub fn validate_name(raw: &str) -> Result<String, NameError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 {
        return Err(NameError::Empty);
    }
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong(len));
    }
    Ok(name.to_string())
}

/// Where a bottle is in its lifecycle on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BottleState {
    SealedNotReady,
    SealedReady,
    Opened,
}

impl BottleState {
    /// Tag shown next to the unlock date in listings
    pub fn label(&self) -> &'static str {
        match self {
            BottleState::SealedNotReady => "sealed",
            BottleState::SealedReady => "ready",
            BottleState::Opened => "opened",
        }
    }
}

/// A time-locked message
///
/// Field order is the on-disk field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bottle {
    pub name: String,
    pub unlock_date: BottleDate,
    /// Obfuscated token, see [`Codec`]
    message: String,
    opened: bool,
    created_date: BottleDate,
}

/// What the reader sees when a bottle is opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Opening {
    pub name: String,
    pub message: String,
    pub created_date: BottleDate,
    pub days_elapsed: i64,
    /// False when the bottle had already been opened before
    pub first_time: bool,
}

impl Opening {
    /// e.g. "the 3rd of March 2025"
    pub fn created_phrase(&self) -> String {
        format!(
            "the {} of {} {}",
            ordinal(self.created_date.day()),
            month_name(self.created_date.month()),
            self.created_date.year()
        )
    }
}

impl Bottle {
    /// Seals a new bottle, obfuscating the plaintext message
    pub fn seal(
        name: &str,
        unlock_date: BottleDate,
        plaintext: &str,
        codec: &Codec,
        clock: &dyn Clock,
    ) -> Result<Self, BottleError> {
        Ok(Self {
            name: validate_name(name)?,
            unlock_date,
            message: codec.encode(plaintext),
            opened: false,
            created_date: clock.today(),
        })
    }

    pub fn created_date(&self) -> BottleDate {
        self.created_date
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    /// Ready once today has reached the unlock date
    pub fn is_ready(&self, today: BottleDate) -> bool {
        today >= self.unlock_date
    }

    pub fn state(&self, today: BottleDate) -> BottleState {
        if self.opened {
            BottleState::Opened
        } else if self.is_ready(today) {
            BottleState::SealedReady
        } else {
            BottleState::SealedNotReady
        }
    }

    /// Ready and never opened
    pub fn is_new(&self, today: BottleDate) -> bool {
        self.state(today) == BottleState::SealedReady
    }

    /// Opens the bottle and reveals its message
    ///
    /// Refuses while the bottle is not ready. The `opened` flag is only set
    /// after the message decodes, so a corrupt bottle stays sealed.
    pub fn open(&mut self, codec: &Codec, clock: &dyn Clock) -> Result<Opening, BottleError> {
        let today = clock.today();

        if self.state(today) == BottleState::SealedNotReady {
            return Err(BottleError::NotReady {
                name: self.name.clone(),
                unlock_date: self.unlock_date,
                days_left: today.days_until(self.unlock_date),
            });
        }

        let message = codec.decode(&self.message).map_err(|source| BottleError::Corrupt {
            name: self.name.clone(),
            source,
        })?;

        let first_time = !self.opened;
        self.opened = true;

        Ok(Opening {
            name: self.name.clone(),
            message,
            created_date: self.created_date,
            days_elapsed: self.created_date.days_until(today),
            first_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::domain::date::validate;

    fn clock(raw: &str) -> FixedClock {
        FixedClock(validate(raw).unwrap())
    }

    fn make_bottle(unlock: &str, created: &str) -> Bottle {
        Bottle::seal(
            "Letter",
            validate(unlock).unwrap(),
            "hello from the past",
            &Codec::default(),
            &clock(created),
        )
        .unwrap()
    }

    #[test]
    fn new_bottle_is_sealed() {
        let bottle = make_bottle("01.01.2030", "01.01.2025");

        assert!(!bottle.is_opened());
        assert_eq!(bottle.created_date().to_string(), "01.01.2025");
        assert_eq!(
            bottle.state(validate("02.01.2025").unwrap()),
            BottleState::SealedNotReady
        );
    }

    #[test]
    fn message_is_stored_obfuscated() {
        let bottle = make_bottle("01.01.2030", "01.01.2025");
        let json = serde_json::to_string(&bottle).unwrap();
        assert!(!json.contains("hello from the past"));
    }

    #[test]
    fn ready_on_unlock_day() {
        let bottle = make_bottle("10.06.2025", "01.01.2025");

        assert!(!bottle.is_ready(validate("09.06.2025").unwrap()));
        assert!(bottle.is_ready(validate("10.06.2025").unwrap()));
        assert!(bottle.is_ready(validate("11.06.2025").unwrap()));
        assert!(bottle.is_new(validate("10.06.2025").unwrap()));
    }

    #[test]
    fn state_labels_follow_lifecycle() {
        let mut bottle = make_bottle("10.06.2025", "01.01.2025");

        assert_eq!(bottle.state(validate("09.06.2025").unwrap()).label(), "sealed");
        assert_eq!(bottle.state(validate("10.06.2025").unwrap()).label(), "ready");

        bottle.open(&Codec::default(), &clock("10.06.2025")).unwrap();
        assert_eq!(bottle.state(validate("10.06.2025").unwrap()).label(), "opened");
    }

    #[test]
    fn open_before_unlock_is_refused() {
        let mut bottle = make_bottle("10.06.2025", "01.01.2025");
        let before = bottle.clone();

        let err = bottle.open(&Codec::default(), &clock("07.06.2025")).unwrap_err();

        assert!(matches!(err, BottleError::NotReady { days_left: 3, .. }));
        assert_eq!(bottle, before);
        assert!(!bottle.is_opened());
    }

    #[test]
    fn open_when_ready() {
        let mut bottle = make_bottle("10.06.2025", "03.01.2025");

        let opening = bottle.open(&Codec::default(), &clock("12.06.2025")).unwrap();

        assert!(bottle.is_opened());
        assert_eq!(opening.message, "hello from the past");
        assert_eq!(opening.days_elapsed, 160);
        assert!(opening.first_time);
        assert_eq!(opening.created_phrase(), "the 3rd of January 2025");
        assert_eq!(bottle.state(validate("01.01.2020").unwrap()), BottleState::Opened);
    }

    #[test]
    fn reopening_keeps_opened() {
        let mut bottle = make_bottle("10.06.2025", "01.01.2025");
        let today = clock("10.06.2025");

        bottle.open(&Codec::default(), &today).unwrap();
        let again = bottle.open(&Codec::default(), &today).unwrap();

        assert!(bottle.is_opened());
        assert!(!again.first_time);
        assert_eq!(again.message, "hello from the past");
    }

    #[test]
    fn corrupt_message_stays_sealed() {
        let mut bottle = make_bottle("10.06.2025", "01.01.2025");
        bottle.message = "%%%".to_string();

        let err = bottle.open(&Codec::default(), &clock("10.06.2025")).unwrap_err();

        assert!(matches!(err, BottleError::Corrupt { .. }));
        assert!(!bottle.is_opened());
    }

    #[test]
    fn name_validation() {
        assert_eq!(validate_name("  Birthday  ").unwrap(), "Birthday");
        assert_eq!(validate_name("   "), Err(NameError::Empty));
        assert_eq!(validate_name(&"x".repeat(30)).unwrap().len(), 30);
        assert_eq!(validate_name(&"x".repeat(31)), Err(NameError::TooLong(31)));
        // Counted in characters, not bytes
        assert!(validate_name(&"é".repeat(30)).is_ok());
    }

    #[test]
    fn seal_rejects_bad_name() {
        let result = Bottle::seal(
            "",
            validate("01.01.2030").unwrap(),
            "msg",
            &Codec::default(),
            &clock("01.01.2025"),
        );
        assert_eq!(result.unwrap_err(), BottleError::Name(NameError::Empty));
    }

    #[test]
    fn serde_field_order() {
        let bottle = make_bottle("01.01.2030", "01.01.2025");
        let json = serde_json::to_string(&bottle).unwrap();

        let positions: Vec<_> = ["\"name\"", "\"unlock_date\"", "\"message\"", "\"opened\"", "\"created_date\""]
            .iter()
            .map(|key| json.find(key).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let parsed: Bottle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, bottle);
    }
}
