//! Domain types and models

pub mod audit;
pub mod catalog;
pub mod check;
pub mod habit;
pub mod views;

pub use audit::{ChangeSet, EditRecord, FieldChange};
pub use catalog::{
    CreateIngredientInput, CreateProductInput, CreateTagInput, Ingredient, IngredientFilter,
    IngredientInProduct, IngredientPatch, Product, ProductFilter, ProductIngredient,
    ProductIngredientInput, ProductIngredientPatch, ProductPatch, ProductWithConcentration, Tag,
    INGREDIENT_EDITABLE_FIELDS, PRODUCT_EDITABLE_FIELDS,
};
pub use check::{Check, CheckInput, CheckStatus, ToggleResult};
pub use habit::{
    CreateHabitInput, Frequency, FrequencyKind, Habit, HabitWithRelations, Period, Reminder,
    ReminderInput, Timing, TimingInput, UpdateHabitInput, Weekday, validate_reminders,
    validate_timings,
};
pub use views::{HabitStats, TodayHabit};
