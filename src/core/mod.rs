//! Decision engine and the abstractions its collaborators implement

pub mod config;
pub mod decision;
pub mod error;
pub mod log;
pub mod notify;
pub mod rate;
pub mod reference;

// Re-export main types for cleaner imports
pub use decision::{AlertBounds, AlertDecision, Direction, evaluate};
pub use error::AlertError;
pub use notify::{Notification, Notifier};
pub use rate::{ConversionRequest, RateQuote, RateSource, convert};
pub use reference::{ReferenceRecord, ReferenceStore, daily_key};
