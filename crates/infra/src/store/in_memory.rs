use std::collections::BTreeMap;
use std::sync::RwLock;

use userhub_core::user::timestamp_now;
use userhub_core::{NewUser, Page, PageRequest, User, UserId, UserPatch};

use super::r#trait::{StoreError, UserStore};

#[derive(Debug)]
struct Table {
    next_id: i64,
    rows: BTreeMap<UserId, User>,
}

impl Table {
    fn email_owner(&self, email: &str) -> Option<UserId> {
        self.rows
            .values()
            .find(|u| u.email == email)
            .map(|u| u.id)
    }
}

/// In-memory user table.
///
/// Used when no database is configured, and by tests. Not optimized for
/// performance: uniqueness checks scan every row.
#[derive(Debug)]
pub struct InMemoryUserStore {
    table: RwLock<Table>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.table.read().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.table.read().map(|_| ()).map_err(poisoned)
    }

    async fn list(&self, request: PageRequest) -> Result<Page<User>, StoreError> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(Page::paginate(table.rows.values(), request))
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let mut table = self.table.write().map_err(poisoned)?;

        // Check and write under the same lock: no duplicate can slip in between.
        if table.email_owner(new.email()).is_some() {
            return Err(StoreError::EmailTaken);
        }

        let id = UserId::new(table.next_id).map_err(|e| StoreError::Backend(e.to_string()))?;
        table.next_id += 1;

        let user = User::from_new(id, new, timestamp_now());
        table.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, StoreError> {
        let mut table = self.table.write().map_err(poisoned)?;

        if !table.rows.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if let Some(email) = patch.email.as_deref() {
            if table.email_owner(email).is_some_and(|owner| owner != id) {
                return Err(StoreError::EmailTaken);
            }
        }

        let user = table.rows.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.apply(patch, timestamp_now());
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<User, StoreError> {
        let mut table = self.table.write().map_err(poisoned)?;
        table.rows.remove(&id).ok_or(StoreError::NotFound)
    }
}
