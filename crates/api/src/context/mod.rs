//! Application context - dependency injection container

use std::sync::Arc;

use routinely_core::{
    Clock, HabitService, IngredientService, ProductIngredientService, ProductService,
    StatsEngine, SystemClock, TagService, TodayViewBuilder,
};
use routinely_domain::{Config, Result, RoutinelyError};
use routinely_infra::database::{
    DbManager, SqliteCheckRepository, SqliteHabitRepository, SqliteIngredientRepository,
    SqliteProductIngredientRepository, SqliteProductRepository, SqliteTagRepository,
};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Application context - holds all services and dependencies
///
/// One [`DbManager`] is shared by every adapter; services are cheap to clone
/// through their `Arc`s.
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,

    // Habits
    pub habits: Arc<HabitService>,
    pub today: Arc<TodayViewBuilder>,
    pub stats: Arc<StatsEngine>,

    // Catalog
    pub products: Arc<ProductService>,
    pub ingredients: Arc<IngredientService>,
    pub product_ingredients: Arc<ProductIngredientService>,
    pub tags: Arc<TagService>,
}

impl AppContext {
    /// Create a context with the process-local wall clock.
    pub async fn new_with_config(config: Config) -> Result<Self> {
        Self::new_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Create a context with an injected clock.
    ///
    /// Opens the pool and applies the schema before any service is built.
    pub async fn new_with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let db_config = config.database.clone();
        let db = tokio::task::spawn_blocking(move || {
            let db = DbManager::from_config(&db_config)?;
            db.run_migrations()?;
            Ok::<_, RoutinelyError>(db)
        })
        .await
        .map_err(|e| RoutinelyError::Internal(format!("startup task failed: {e}")))??;
        let db = Arc::new(db);

        let habit_repo = Arc::new(SqliteHabitRepository::new(Arc::clone(&db)));
        let check_repo = Arc::new(SqliteCheckRepository::new(Arc::clone(&db)));
        let habits = Arc::new(HabitService::new(habit_repo, check_repo.clone()));
        let today = Arc::new(TodayViewBuilder::new(Arc::clone(&habits), Arc::clone(&clock)));
        let stats = Arc::new(StatsEngine::new(check_repo, clock));

        let products =
            Arc::new(ProductService::new(Arc::new(SqliteProductRepository::new(Arc::clone(&db)))));
        let ingredients = Arc::new(IngredientService::new(Arc::new(
            SqliteIngredientRepository::new(Arc::clone(&db)),
        )));
        let product_ingredients = Arc::new(ProductIngredientService::new(Arc::new(
            SqliteProductIngredientRepository::new(Arc::clone(&db)),
        )));
        let tags = Arc::new(TagService::new(Arc::new(SqliteTagRepository::new(Arc::clone(&db)))));

        tracing::info!(path = %db.path().display(), "application context ready");

        Ok(Self { config, db, habits, today, stats, products, ingredients, product_ingredients, tags })
    }

    /// Check health of all application components
    pub async fn health_check(&self) -> HealthStatus {
        let mut status = HealthStatus::new().add_component(self.check_database_health().await);
        status.calculate_score();
        status
    }

    /// Runs the pool probe on the blocking pool.
    async fn check_database_health(&self) -> ComponentHealth {
        let db = Arc::clone(&self.db);
        match tokio::task::spawn_blocking(move || db.health_check()).await {
            Ok(Ok(())) => ComponentHealth::healthy("database"),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "database health check failed");
                ComponentHealth::unhealthy("database", format!("query failed: {e}"))
            }
            Err(e) => {
                tracing::error!(error = %e, "database health check task panicked");
                ComponentHealth::unhealthy("database", format!("task panic: {e}"))
            }
        }
    }
}
