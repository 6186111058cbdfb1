//! Postgres-backed user store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `EmailTaken` | Insert/update hit the `email` unique constraint |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolClosed / PoolTimedOut / Io | N/A | `Unavailable` | Database unreachable |
//! | Other | N/A | `Backend` | Decode failures, protocol errors, etc. |
//!
//! Uniqueness is enforced by the database, so two concurrent inserts with the
//! same email cannot both succeed.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use tracing::{instrument, Span};

use userhub_core::user::timestamp_now;
use userhub_core::{NewUser, Page, PageRequest, User, UserId, UserPatch};

use super::r#trait::{StoreError, UserStore};
use crate::config::DatabaseSettings;

/// Idempotent bootstrap of the single table this service owns.
const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id          BIGSERIAL PRIMARY KEY,
        name        TEXT NOT NULL,
        email       TEXT NOT NULL UNIQUE,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
"#;

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(row.id).map_err(|e| StoreError::Backend(e.to_string()))?,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Postgres-backed user store.
///
/// Uses a SQLx connection pool, so it is `Send + Sync` and cheap to share.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from settings and make sure the table exists.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.name)
            .username(&settings.user)
            .password(settings.password.expose());

        let pool = PgPoolOptions::new()
            .acquire_timeout(settings.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Connect from a `postgres://` URL (used by tests and tooling).
    pub async fn connect_url(url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_USERS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }

    #[instrument(
        skip(self),
        fields(page = request.page, limit = request.limit, operation = tracing::field::Empty),
        err
    )]
    async fn list(&self, request: PageRequest) -> Result<Page<User>, StoreError> {
        Span::current().record("operation", "list_users");

        // One snapshot for both statements so `total` agrees with `items`.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, created_at, updated_at
            FROM users
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(request.limit))
        .bind(offset)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        let items = rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total: u64::try_from(total).unwrap_or(0),
            page: request.page,
            limit: request.limit,
        })
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_user", e))?;

        row.map(User::try_from).transpose()
    }

    #[instrument(skip(self, new), err)]
    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(new.name())
        .bind(new.email())
        .bind(timestamp_now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        User::try_from(row)
    }

    #[instrument(skip(self, patch), fields(user_id = %id), err)]
    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, StoreError> {
        // updated_at moves strictly forward, matching `User::touch`.
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                updated_at = GREATEST($4, updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(id.get())
        .bind(patch.name)
        .bind(patch.email)
        .bind(timestamp_now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        row.ok_or(StoreError::NotFound).and_then(User::try_from)
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn delete(&self, id: UserId) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "DELETE FROM users WHERE id = $1 RETURNING id, name, email, created_at, updated_at",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_user", e))?;

        row.ok_or(StoreError::NotFound).and_then(User::try_from)
    }
}

/// Map SQLx errors to `StoreError` (see module docs).
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                StoreError::EmailTaken
            } else {
                StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
            }
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool unavailable in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {operation}: {e}")),
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}
