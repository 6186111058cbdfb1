//! Infrastructure layer: user storage backends and process configuration.

pub mod config;
pub mod store;

pub use config::{ConfigError, DatabaseSettings, Environment, Secret, Settings};
pub use store::{InMemoryUserStore, PostgresUserStore, StoreError, UserStore};
