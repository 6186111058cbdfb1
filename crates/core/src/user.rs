//! The `User` entity and its write models.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::UserId;

/// Current time truncated to the precision the stores persist (microseconds).
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A persisted user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Materialize a freshly inserted row.
    pub fn from_new(id: UserId, new: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the supplied fields and refresh `updated_at`.
    pub fn apply(&mut self, patch: UserPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        self.touch(now);
    }

    /// `updated_at` moves strictly forward, even when two writes land in the
    /// same microsecond.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.updated_at + Duration::microseconds(1);
        self.updated_at = if now > floor { now } else { floor };
    }
}

/// Validated input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: String,
}

impl NewUser {
    /// Both fields are required and must be non-empty.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        let email = email.into();
        if name.is_empty() || email.is_empty() {
            return Err(DomainError::validation("name and email are required"));
        }
        Ok(Self { name, email })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Partial update: only the supplied fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserPatch {
    /// Supplied fields must be non-empty; absent fields are left untouched.
    pub fn new(name: Option<String>, email: Option<String>) -> DomainResult<Self> {
        if name.as_deref().is_some_and(str::is_empty) || email.as_deref().is_some_and(str::is_empty) {
            return Err(DomainError::validation("name and email must be non-empty"));
        }
        Ok(Self { name, email })
    }

    /// True when neither field is supplied.
    pub fn is_noop(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}
