//! Database implementations

mod blocking;
mod edit_log;
mod rows;

pub mod check_repository;
pub mod habit_repository;
pub mod ingredient_repository;
pub mod manager;
pub mod product_ingredient_repository;
pub mod product_repository;
pub mod tag_repository;

pub use check_repository::SqliteCheckRepository;
pub use habit_repository::SqliteHabitRepository;
pub use ingredient_repository::SqliteIngredientRepository;
pub use manager::DbManager;
pub use product_ingredient_repository::SqliteProductIngredientRepository;
pub use product_repository::SqliteProductRepository;
pub use tag_repository::SqliteTagRepository;
