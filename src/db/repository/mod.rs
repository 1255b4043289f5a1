pub mod caregiver;
pub mod classified_value;
pub mod message;
pub mod patient;
pub mod taxonomy;

pub use caregiver::*;
pub use classified_value::*;
pub use message::*;
pub use patient::*;
pub use taxonomy::*;

/// Timestamp format used across all tables.
pub(crate) const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
