//! `userhub-core`: domain foundation for the user directory.
//!
//! This crate contains **pure domain** types (no infrastructure concerns):
//! identifiers, the `User` entity and its write models, field validation and
//! page arithmetic.

pub mod error;
pub mod id;
pub mod pagination;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use pagination::{Page, PageRequest};
pub use user::{NewUser, User, UserPatch};
