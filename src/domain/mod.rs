//! Domain models for bottles
//!
//! Contains the core lifecycle rules without any I/O concerns.

mod bottle;
mod clock;
mod codec;
mod collection;
mod date;

pub use bottle::{validate_name, Bottle, BottleError, BottleState, NameError, Opening, MAX_NAME_LEN};
pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{Codec, CodecError, DEFAULT_KEY};
pub use collection::{Collection, Entry, FilterKind, FilterKindError};
pub use date::{month_name, ordinal, validate as validate_date, BottleDate, DateError};
