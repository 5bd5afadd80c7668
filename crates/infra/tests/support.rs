//! Shared harness for infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use routinely_core::{
    FixedClock, HabitService, IngredientService, ProductIngredientService, ProductService,
    StatsEngine, TagService, TodayViewBuilder,
};
use routinely_infra::database::{
    DbManager, SqliteCheckRepository, SqliteHabitRepository, SqliteIngredientRepository,
    SqliteProductIngredientRepository, SqliteProductRepository, SqliteTagRepository,
};
use tempfile::TempDir;

/// Temporary database that keeps its directory alive for the test.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Fresh database file with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("routinely-test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn count(&self, table: &str) -> i64 {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count query should succeed")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Habit-side services wired to one database and a pinned clock.
pub struct HabitStack {
    pub db: TestDatabase,
    pub habits: Arc<SqliteHabitRepository>,
    pub checks: Arc<SqliteCheckRepository>,
    pub service: Arc<HabitService>,
    pub today: TodayViewBuilder,
    pub stats: StatsEngine,
}

impl HabitStack {
    pub fn new(today: NaiveDate) -> Self {
        let db = TestDatabase::new();
        let habits = Arc::new(SqliteHabitRepository::new(Arc::clone(&db.manager)));
        let checks = Arc::new(SqliteCheckRepository::new(Arc::clone(&db.manager)));
        let service = Arc::new(HabitService::new(habits.clone(), checks.clone()));
        let clock = Arc::new(FixedClock(today));
        Self {
            today: TodayViewBuilder::new(Arc::clone(&service), clock.clone()),
            stats: StatsEngine::new(checks.clone(), clock),
            db,
            habits,
            checks,
            service,
        }
    }
}

/// Catalog services wired to one database.
pub struct CatalogStack {
    pub db: TestDatabase,
    pub products: ProductService,
    pub ingredients: IngredientService,
    pub links: ProductIngredientService,
    pub tags: TagService,
}

impl CatalogStack {
    pub fn new() -> Self {
        let db = TestDatabase::new();
        let manager = &db.manager;
        Self {
            products: ProductService::new(Arc::new(SqliteProductRepository::new(Arc::clone(
                manager,
            )))),
            ingredients: IngredientService::new(Arc::new(SqliteIngredientRepository::new(
                Arc::clone(manager),
            ))),
            links: ProductIngredientService::new(Arc::new(
                SqliteProductIngredientRepository::new(Arc::clone(manager)),
            )),
            tags: TagService::new(Arc::new(SqliteTagRepository::new(Arc::clone(manager)))),
            db,
        }
    }
}

impl Default for CatalogStack {
    fn default() -> Self {
        Self::new()
    }
}
