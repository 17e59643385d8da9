pub mod email;
pub mod open_exchange;

pub use email::{HttpEmailNotifier, LogNotifier};
pub use open_exchange::OpenExchangeRatesProvider;
