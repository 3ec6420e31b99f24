//! API handlers.

pub mod playlist;
pub mod state;
pub mod subreddits;

pub use playlist::*;
pub use state::AppState;
pub use subreddits::*;
