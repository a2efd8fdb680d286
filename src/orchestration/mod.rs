//! Background work: keeping the live rate overlay fresh and evicting idle
//! sessions.

pub mod rates;
pub mod sessions;

pub use rates::{RateCache, RateRefresher};
pub use sessions::SessionSweeper;
