//! Per-session selection state.
//!
//! [`SelectionState`] snapshots are advanced by a pure reducer; a
//! [`SelectionStore`] holds the current snapshot for one session and
//! [`SessionRegistry`] keys stores by session id.

pub mod selection_store;
pub mod sessions;
pub mod state;

pub use selection_store::SelectionStore;
pub use sessions::{SessionError, SessionRegistry};
pub use state::{Action, SelectionState};
