use std::sync::Arc;

use userhub_infra::{InMemoryUserStore, PostgresUserStore, Settings, StoreError, UserStore};

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn UserStore>,
    settings: Arc<Settings>,
}

impl AppServices {
    pub fn new(store: Arc<dyn UserStore>, settings: Settings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory(settings: Settings) -> Self {
        Self::new(Arc::new(InMemoryUserStore::new()), settings)
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Pick the store from settings: PostgreSQL when a database is configured,
/// in-memory otherwise.
pub async fn build_services(settings: Settings) -> Result<AppServices, StoreError> {
    match &settings.database {
        Some(db) => {
            tracing::info!(host = %db.host, port = db.port, database = %db.name, "connecting to postgres");
            let store = PostgresUserStore::connect(db).await?;
            Ok(AppServices::new(Arc::new(store), settings))
        }
        None => {
            tracing::info!("DB_HOST not set; using in-memory user store");
            Ok(AppServices::in_memory(settings))
        }
    }
}
