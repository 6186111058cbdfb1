//! User storage boundary.
//!
//! Handlers talk to a `UserStore`; which backend sits behind it is decided
//! once at startup from `Settings`.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;
pub use r#trait::{StoreError, UserStore};
