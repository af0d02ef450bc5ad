//! Shared application state handed to every route.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sqlx::PgPool;

use crate::catalog::CatalogIndex;
use crate::health::HealthScorer;
use crate::identify::PlantNetClient;
use crate::plants::PlantRegistry;
use crate::resolver::Resolver;

// ---

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogIndex>,
    pub resolver: Arc<Resolver>,
    pub scorer: HealthScorer,
    plants: Arc<Mutex<PlantRegistry>>,
    /// Telemetry store; readings live only in memory when absent.
    pub pool: Option<PgPool>,
    /// Identification service; `POST /identify` is skipped when absent.
    pub identifier: Option<Arc<PlantNetClient>>,
}

impl AppState {
    // ---
    pub fn new(
        catalog: CatalogIndex,
        resolver: Resolver,
        scorer: HealthScorer,
        pool: Option<PgPool>,
        identifier: Option<PlantNetClient>,
    ) -> Self {
        AppState {
            catalog: Arc::new(catalog),
            resolver: Arc::new(resolver),
            scorer,
            plants: Arc::new(Mutex::new(PlantRegistry::new())),
            pool,
            identifier: identifier.map(Arc::new),
        }
    }

    /// Lock the plant registry. Never hold the guard across an `.await`.
    pub fn plants(&self) -> MutexGuard<'_, PlantRegistry> {
        self.plants.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
