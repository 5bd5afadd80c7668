//! Mock repository implementations for testing
//!
//! In-memory, `parking_lot`-guarded mocks mirroring the adapter contracts:
//! `None`/`false` for absent rows, `None` from `insert_check` for a taken slot
//! and `AlreadyExists` for slug collisions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use routinely_core::{CheckRepository, EditLog, HabitRepository, IngredientRepository, ProductRepository};
use routinely_domain::{
    Check, CheckInput, CheckStatus, CreateHabitInput, CreateIngredientInput, CreateProductInput,
    EditRecord, Entity, Frequency, Habit, Ingredient, IngredientFilter, IngredientPatch, Period,
    Product, ProductFilter, ProductPatch, Reminder, ReminderInput, Result, RoutinelyError,
    Timing, TimingInput, UpdateHabitInput,
};

fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

// ============================================================================
// Habits
// ============================================================================

#[derive(Default)]
struct HabitTables {
    habits: Vec<Habit>,
    frequencies: HashMap<String, Frequency>,
    timings: HashMap<String, Vec<Timing>>,
    reminders: HashMap<String, Vec<Reminder>>,
    periods: HashMap<String, Period>,
}

/// In-memory mock for `HabitRepository`.
#[derive(Default, Clone)]
pub struct MockHabitRepository {
    tables: Arc<Mutex<HabitTables>>,
    created_at: Option<DateTime<Utc>>,
}

impl MockHabitRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp every created habit with `created_at` (interval anchors).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn habit_count(&self) -> usize {
        self.tables.lock().habits.len()
    }
}

fn make_timings(habit_id: &str, inputs: &[TimingInput]) -> Vec<Timing> {
    let mut timings: Vec<Timing> = inputs
        .iter()
        .map(|t| Timing {
            id: new_id(),
            habit_id: habit_id.to_owned(),
            time: t.time.clone(),
            label: t.label.clone(),
        })
        .collect();
    timings.sort_by(|a, b| a.time.cmp(&b.time));
    timings
}

fn make_reminders(habit_id: &str, inputs: &[ReminderInput]) -> Vec<Reminder> {
    inputs
        .iter()
        .map(|r| Reminder {
            id: new_id(),
            habit_id: habit_id.to_owned(),
            before_minutes: r.before_minutes,
        })
        .collect()
}

#[async_trait]
impl HabitRepository for MockHabitRepository {
    async fn create_habit(&self, input: &CreateHabitInput) -> Result<Habit> {
        let now = self.created_at.unwrap_or_else(Utc::now);
        let habit = Habit {
            id: new_id(),
            user_id: input.user_id.clone(),
            name: input.name.clone(),
            category: input.category.clone(),
            archived_at: None,
            created_at: now,
            updated_at: now,
        };
        let mut tables = self.tables.lock();
        if let Some(frequency) = &input.frequency {
            tables.frequencies.insert(habit.id.clone(), frequency.clone());
        }
        tables.timings.insert(habit.id.clone(), make_timings(&habit.id, &input.timings));
        tables.reminders.insert(habit.id.clone(), make_reminders(&habit.id, &input.reminders));
        if let Some(period) = &input.period {
            tables.periods.insert(habit.id.clone(), period.clone());
        }
        tables.habits.push(habit.clone());
        Ok(habit)
    }

    async fn find_habit(&self, id: &str) -> Result<Option<Habit>> {
        Ok(self.tables.lock().habits.iter().find(|h| h.id == id).cloned())
    }

    async fn list_active_habits(&self, user_id: &str) -> Result<Vec<Habit>> {
        let mut habits: Vec<Habit> = self
            .tables
            .lock()
            .habits
            .iter()
            .filter(|h| h.user_id == user_id && h.archived_at.is_none())
            .cloned()
            .collect();
        habits.sort_by_key(|h| h.created_at);
        Ok(habits)
    }

    async fn update_habit(&self, id: &str, patch: &UpdateHabitInput) -> Result<Option<Habit>> {
        let mut tables = self.tables.lock();
        let Some(habit) = tables.habits.iter_mut().find(|h| h.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            habit.name = name.clone();
        }
        if let Some(category) = &patch.category {
            habit.category = category.clone();
        }
        habit.updated_at = Utc::now();
        Ok(Some(habit.clone()))
    }

    async fn set_archived_at(
        &self,
        id: &str,
        archived_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Habit>> {
        let mut tables = self.tables.lock();
        Ok(tables.habits.iter_mut().find(|h| h.id == id).map(|habit| {
            habit.archived_at = archived_at;
            habit.clone()
        }))
    }

    async fn delete_habit(&self, id: &str) -> Result<bool> {
        let mut tables = self.tables.lock();
        let before = tables.habits.len();
        tables.habits.retain(|h| h.id != id);
        tables.frequencies.remove(id);
        tables.timings.remove(id);
        tables.reminders.remove(id);
        tables.periods.remove(id);
        Ok(tables.habits.len() < before)
    }

    async fn get_frequency(&self, habit_id: &str) -> Result<Option<Frequency>> {
        Ok(self.tables.lock().frequencies.get(habit_id).cloned())
    }

    async fn upsert_frequency(&self, habit_id: &str, frequency: &Frequency) -> Result<Frequency> {
        self.tables.lock().frequencies.insert(habit_id.to_owned(), frequency.clone());
        Ok(frequency.clone())
    }

    async fn delete_frequency(&self, habit_id: &str) -> Result<bool> {
        Ok(self.tables.lock().frequencies.remove(habit_id).is_some())
    }

    async fn get_timings(&self, habit_id: &str) -> Result<Vec<Timing>> {
        Ok(self.tables.lock().timings.get(habit_id).cloned().unwrap_or_default())
    }

    async fn replace_timings(
        &self,
        habit_id: &str,
        timings: &[TimingInput],
    ) -> Result<Vec<Timing>> {
        let stored = make_timings(habit_id, timings);
        self.tables.lock().timings.insert(habit_id.to_owned(), stored.clone());
        Ok(stored)
    }

    async fn get_reminders(&self, habit_id: &str) -> Result<Vec<Reminder>> {
        Ok(self.tables.lock().reminders.get(habit_id).cloned().unwrap_or_default())
    }

    async fn replace_reminders(
        &self,
        habit_id: &str,
        reminders: &[ReminderInput],
    ) -> Result<Vec<Reminder>> {
        let stored = make_reminders(habit_id, reminders);
        self.tables.lock().reminders.insert(habit_id.to_owned(), stored.clone());
        Ok(stored)
    }

    async fn get_period(&self, habit_id: &str) -> Result<Option<Period>> {
        Ok(self.tables.lock().periods.get(habit_id).cloned())
    }

    async fn upsert_period(&self, habit_id: &str, period: &Period) -> Result<Period> {
        self.tables.lock().periods.insert(habit_id.to_owned(), period.clone());
        Ok(period.clone())
    }

    async fn delete_period(&self, habit_id: &str) -> Result<bool> {
        Ok(self.tables.lock().periods.remove(habit_id).is_some())
    }
}

// ============================================================================
// Checks
// ============================================================================

/// In-memory mock for `CheckRepository`, unique per (habit, date, slot).
#[derive(Default, Clone)]
pub struct MockCheckRepository {
    checks: Arc<Mutex<Vec<Check>>>,
}

impl MockCheckRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a timing-agnostic check directly.
    pub fn seed(&self, user_id: &str, habit_id: &str, date: NaiveDate) {
        self.checks.lock().push(Check {
            id: new_id(),
            user_id: user_id.to_owned(),
            habit_id: habit_id.to_owned(),
            scheduled_date: date,
            timing_id: None,
            actual_time: None,
            status: CheckStatus::Done,
            completed_at: Utc::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.checks.lock().len()
    }
}

fn slot(check: &Check) -> &str {
    check.timing_id.as_deref().unwrap_or("")
}

#[async_trait]
impl CheckRepository for MockCheckRepository {
    async fn insert_check(&self, input: &CheckInput) -> Result<Option<Check>> {
        let mut checks = self.checks.lock();
        let taken = checks.iter().any(|c| {
            c.habit_id == input.habit_id
                && c.scheduled_date == input.date
                && slot(c) == input.timing_slot()
        });
        if taken {
            return Ok(None);
        }
        let check = Check {
            id: new_id(),
            user_id: input.user_id.clone(),
            habit_id: input.habit_id.clone(),
            scheduled_date: input.date,
            timing_id: input.timing_id.clone(),
            actual_time: input.actual_time.clone(),
            status: CheckStatus::Done,
            completed_at: Utc::now(),
        };
        checks.push(check.clone());
        Ok(Some(check))
    }

    async fn delete_check(&self, id: &str) -> Result<bool> {
        let mut checks = self.checks.lock();
        let before = checks.len();
        checks.retain(|c| c.id != id);
        Ok(checks.len() < before)
    }

    async fn delete_checks_on(&self, habit_id: &str, date: NaiveDate) -> Result<u64> {
        let mut checks = self.checks.lock();
        let before = checks.len();
        checks.retain(|c| !(c.habit_id == habit_id && c.scheduled_date == date));
        Ok((before - checks.len()) as u64)
    }

    async fn find_check(
        &self,
        habit_id: &str,
        date: NaiveDate,
        timing_slot: &str,
    ) -> Result<Option<Check>> {
        Ok(self
            .checks
            .lock()
            .iter()
            .find(|c| c.habit_id == habit_id && c.scheduled_date == date && slot(c) == timing_slot)
            .cloned())
    }

    async fn checks_for_user_on(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Check>> {
        Ok(self
            .checks
            .lock()
            .iter()
            .filter(|c| c.user_id == user_id && c.scheduled_date == date)
            .cloned()
            .collect())
    }

    async fn checks_in_range(
        &self,
        habit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Check>> {
        let mut checks: Vec<Check> = self
            .checks
            .lock()
            .iter()
            .filter(|c| c.habit_id == habit_id && c.scheduled_date >= start && c.scheduled_date <= end)
            .cloned()
            .collect();
        checks.sort_by_key(|c| c.scheduled_date);
        Ok(checks)
    }

    async fn count_in_range(&self, habit_id: &str, start: NaiveDate, end: NaiveDate) -> Result<u64> {
        Ok(self.checks_in_range(habit_id, start, end).await?.len() as u64)
    }

    async fn checked_dates_desc(&self, habit_id: &str) -> Result<Vec<NaiveDate>> {
        let mut dates: Vec<NaiveDate> = self
            .checks
            .lock()
            .iter()
            .filter(|c| c.habit_id == habit_id)
            .map(|c| c.scheduled_date)
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        Ok(dates)
    }

    async fn exists_on(&self, habit_id: &str, date: NaiveDate) -> Result<bool> {
        Ok(self.checks.lock().iter().any(|c| c.habit_id == habit_id && c.scheduled_date == date))
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Default)]
struct EditTable {
    edits: Vec<EditRecord>,
}

impl EditTable {
    fn append(&mut self, record: &EditRecord) -> EditRecord {
        self.edits.push(record.clone());
        record.clone()
    }

    fn list(&self, entity_id: &str) -> Vec<EditRecord> {
        let mut edits: Vec<EditRecord> =
            self.edits.iter().filter(|e| e.entity_id == entity_id).cloned().collect();
        edits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        edits
    }
}

/// In-memory mock for `ProductRepository` with a unique slug index.
#[derive(Default, Clone)]
pub struct MockProductRepository {
    products: Arc<Mutex<Vec<Product>>>,
    edits: Arc<Mutex<EditTable>>,
}

impl MockProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit_count(&self) -> usize {
        self.edits.lock().edits.len()
    }
}

#[async_trait]
impl EditLog for MockProductRepository {
    async fn append_edit(&self, record: &EditRecord) -> Result<EditRecord> {
        Ok(self.edits.lock().append(record))
    }

    async fn list_edits(&self, entity_id: &str) -> Result<Vec<EditRecord>> {
        Ok(self.edits.lock().list(entity_id))
    }
}

#[async_trait]
impl ProductRepository for MockProductRepository {
    async fn insert_product(&self, input: &CreateProductInput, slug: &str) -> Result<Product> {
        let mut products = self.products.lock();
        if products.iter().any(|p| p.slug == slug) {
            return Err(RoutinelyError::AlreadyExists(Entity::Product));
        }
        let now = Utc::now();
        let product = Product {
            id: new_id(),
            name: input.name.clone(),
            brand: input.brand.clone(),
            slug: slug.to_owned(),
            category: input.category.clone(),
            description: input.description.clone(),
            image_url: input.image_url.clone(),
            created_by: input.created_by.clone(),
            created_at: now,
            updated_at: now,
        };
        products.push(product.clone());
        Ok(product)
    }

    async fn find_product(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.products.lock().iter().find(|p| p.id == id).cloned())
    }

    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        Ok(self.products.lock().iter().find(|p| p.slug == slug).cloned())
    }

    async fn list_products(&self, _filter: &ProductFilter) -> Result<Vec<Product>> {
        let mut products = self.products.lock().clone();
        products.reverse();
        Ok(products)
    }

    async fn update_product(
        &self,
        id: &str,
        patch: &ProductPatch,
    ) -> Result<Option<(Product, Product)>> {
        let mut products = self.products.lock();
        if let Some(slug) = &patch.slug {
            if products.iter().any(|p| p.id != id && &p.slug == slug) {
                return Err(RoutinelyError::AlreadyExists(Entity::Product));
            }
        }
        let Some(product) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        let before = product.clone();
        if let Some(v) = &patch.name {
            product.name = v.clone();
        }
        if let Some(v) = &patch.brand {
            product.brand = v.clone();
        }
        if let Some(v) = &patch.slug {
            product.slug = v.clone();
        }
        if let Some(v) = &patch.category {
            product.category = v.clone();
        }
        if let Some(v) = &patch.description {
            product.description = v.clone();
        }
        if let Some(v) = &patch.image_url {
            product.image_url = v.clone();
        }
        product.updated_at = Utc::now();
        Ok(Some((before, product.clone())))
    }

    async fn delete_product(&self, id: &str) -> Result<bool> {
        let mut products = self.products.lock();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }
}

/// In-memory mock for `IngredientRepository` with a unique slug index.
#[derive(Default, Clone)]
pub struct MockIngredientRepository {
    ingredients: Arc<Mutex<Vec<Ingredient>>>,
    edits: Arc<Mutex<EditTable>>,
}

impl MockIngredientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EditLog for MockIngredientRepository {
    async fn append_edit(&self, record: &EditRecord) -> Result<EditRecord> {
        Ok(self.edits.lock().append(record))
    }

    async fn list_edits(&self, entity_id: &str) -> Result<Vec<EditRecord>> {
        Ok(self.edits.lock().list(entity_id))
    }
}

#[async_trait]
impl IngredientRepository for MockIngredientRepository {
    async fn insert_ingredient(
        &self,
        input: &CreateIngredientInput,
        slug: &str,
    ) -> Result<Ingredient> {
        let mut ingredients = self.ingredients.lock();
        if ingredients.iter().any(|i| i.slug == slug) {
            return Err(RoutinelyError::AlreadyExists(Entity::Ingredient));
        }
        let now = Utc::now();
        let ingredient = Ingredient {
            id: new_id(),
            name: input.name.clone(),
            slug: slug.to_owned(),
            inci_name: input.inci_name.clone(),
            description: input.description.clone(),
            function: input.function.clone(),
            comedogenic_rating: input.comedogenic_rating,
            created_by: input.created_by.clone(),
            created_at: now,
            updated_at: now,
        };
        ingredients.push(ingredient.clone());
        Ok(ingredient)
    }

    async fn find_ingredient(&self, id: &str) -> Result<Option<Ingredient>> {
        Ok(self.ingredients.lock().iter().find(|i| i.id == id).cloned())
    }

    async fn find_ingredient_by_slug(&self, slug: &str) -> Result<Option<Ingredient>> {
        Ok(self.ingredients.lock().iter().find(|i| i.slug == slug).cloned())
    }

    async fn list_ingredients(&self, _filter: &IngredientFilter) -> Result<Vec<Ingredient>> {
        let mut ingredients = self.ingredients.lock().clone();
        ingredients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ingredients)
    }

    async fn update_ingredient(
        &self,
        id: &str,
        patch: &IngredientPatch,
    ) -> Result<Option<(Ingredient, Ingredient)>> {
        let mut ingredients = self.ingredients.lock();
        let Some(ingredient) = ingredients.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        let before = ingredient.clone();
        if let Some(v) = &patch.name {
            ingredient.name = v.clone();
        }
        if let Some(v) = &patch.slug {
            ingredient.slug = v.clone();
        }
        if let Some(v) = &patch.inci_name {
            ingredient.inci_name = v.clone();
        }
        if let Some(v) = &patch.description {
            ingredient.description = v.clone();
        }
        if let Some(v) = &patch.function {
            ingredient.function = v.clone();
        }
        if let Some(v) = patch.comedogenic_rating {
            ingredient.comedogenic_rating = v;
        }
        ingredient.updated_at = Utc::now();
        Ok(Some((before, ingredient.clone())))
    }

    async fn delete_ingredient(&self, id: &str) -> Result<bool> {
        let mut ingredients = self.ingredients.lock();
        let before = ingredients.len();
        ingredients.retain(|i| i.id != id);
        Ok(ingredients.len() < before)
    }
}
