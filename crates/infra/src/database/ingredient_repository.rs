//! SQLite-backed ingredient repository and ingredient edit log.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use routinely_core::{EditLog, IngredientRepository};
use routinely_domain::{
    CreateIngredientInput, EditRecord, Entity, Ingredient, IngredientFilter, IngredientPatch,
    Result as DomainResult, RoutinelyError,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::blocking::with_connection;
use super::edit_log::{self, INGREDIENT_EDITS};
use super::manager::DbManager;
use super::rows::{from_millis, new_id, paginate, to_millis, SetClause};
use crate::errors::{is_unique_violation, sql_error, storage_error};

/// Ingredient columns, qualified with the `i` alias.
pub(crate) const INGREDIENT_COLUMNS: &str = "i.id, i.name, i.slug, i.inci_name, i.description, \
     i.function, i.comedogenic_rating, i.created_by, i.created_at, i.updated_at";

/// Number of columns in [`INGREDIENT_COLUMNS`].
pub(crate) const INGREDIENT_COLUMN_COUNT: usize = 10;

/// SQLite-backed ingredient repository.
pub struct SqliteIngredientRepository {
    db: Arc<DbManager>,
}

impl SqliteIngredientRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EditLog for SqliteIngredientRepository {
    async fn append_edit(&self, record: &EditRecord) -> DomainResult<EditRecord> {
        let record = record.clone();
        with_connection(&self.db, move |conn| edit_log::append(conn, INGREDIENT_EDITS, &record))
            .await
    }

    async fn list_edits(&self, entity_id: &str) -> DomainResult<Vec<EditRecord>> {
        let entity_id = entity_id.to_owned();
        with_connection(&self.db, move |conn| {
            edit_log::list(conn, INGREDIENT_EDITS, &entity_id).map_err(sql_error)
        })
        .await
    }
}

#[async_trait]
impl IngredientRepository for SqliteIngredientRepository {
    async fn insert_ingredient(
        &self,
        input: &CreateIngredientInput,
        slug: &str,
    ) -> DomainResult<Ingredient> {
        let input = input.clone();
        let slug = slug.to_owned();
        with_connection(&self.db, move |conn| {
            insert_ingredient(conn, &input, &slug).map_err(map_slug_error)
        })
        .await
    }

    async fn find_ingredient(&self, id: &str) -> DomainResult<Option<Ingredient>> {
        let id = id.to_owned();
        with_connection(&self.db, move |conn| query_one(conn, "i.id = ?1", &id).map_err(sql_error))
            .await
    }

    async fn find_ingredient_by_slug(&self, slug: &str) -> DomainResult<Option<Ingredient>> {
        let slug = slug.to_owned();
        with_connection(&self.db, move |conn| {
            query_one(conn, "i.slug = ?1", &slug).map_err(sql_error)
        })
        .await
    }

    async fn list_ingredients(&self, filter: &IngredientFilter) -> DomainResult<Vec<Ingredient>> {
        let filter = filter.clone();
        with_connection(&self.db, move |conn| query_filtered(conn, &filter).map_err(sql_error))
            .await
    }

    async fn update_ingredient(
        &self,
        id: &str,
        patch: &IngredientPatch,
    ) -> DomainResult<Option<(Ingredient, Ingredient)>> {
        let id = id.to_owned();
        let patch = patch.clone();
        with_connection(&self.db, move |conn| {
            let tx = conn.immediate_transaction().map_err(storage_error)?;
            let Some(before) = query_one(&tx, "i.id = ?1", &id).map_err(sql_error)? else {
                return Ok(None);
            };
            apply_patch(&tx, &id, &patch).map_err(map_slug_error)?;
            let after = query_one(&tx, "i.id = ?1", &id)
                .map_err(sql_error)?
                .ok_or(RoutinelyError::UpdateFailed(Entity::Ingredient))?;
            tx.commit().map_err(sql_error)?;
            Ok(Some((before, after)))
        })
        .await
    }

    async fn delete_ingredient(&self, id: &str) -> DomainResult<bool> {
        let id = id.to_owned();
        with_connection(&self.db, move |conn| {
            delete_ingredient(conn, &id).map_err(sql_error)
        })
        .await
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn insert_ingredient(
    conn: &Connection,
    input: &CreateIngredientInput,
    slug: &str,
) -> rusqlite::Result<Ingredient> {
    let id = new_id();
    conn.execute(
        "INSERT INTO ingredients
            (id, name, slug, inci_name, description, function, comedogenic_rating,
             created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            id,
            input.name.trim(),
            slug,
            input.inci_name,
            input.description,
            input.function,
            input.comedogenic_rating,
            input.created_by,
            to_millis(Utc::now())
        ],
    )?;
    conn.query_row(
        &format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients i WHERE i.id = ?1"),
        params![id],
        |row| map_ingredient(row, 0),
    )
}

fn query_one(conn: &Connection, predicate: &str, key: &str) -> rusqlite::Result<Option<Ingredient>> {
    conn.query_row(
        &format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients i WHERE {predicate}"),
        params![key],
        |row| map_ingredient(row, 0),
    )
    .optional()
}

/// `search` matches name or INCI name.
fn query_filtered(
    conn: &Connection,
    filter: &IngredientFilter,
) -> rusqlite::Result<Vec<Ingredient>> {
    let mut sql = format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients i");
    let mut values: Vec<Value> = Vec::new();
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        sql.push_str(" WHERE i.name LIKE ? OR i.inci_name LIKE ?");
        let pattern = format!("%{search}%");
        values.push(Value::Text(pattern.clone()));
        values.push(Value::Text(pattern));
    }
    sql.push_str(" ORDER BY i.name COLLATE NOCASE, i.id");
    paginate(&mut sql, filter.limit, filter.offset);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |row| map_ingredient(row, 0))?;
    rows.collect()
}

fn apply_patch(conn: &Connection, id: &str, patch: &IngredientPatch) -> rusqlite::Result<()> {
    let mut set = SetClause::default();
    set.set_if("name", patch.name.as_deref().map(|v| v.trim().to_owned()));
    set.set_if("slug", patch.slug.clone());
    set.set_if("inci_name", patch.inci_name.clone());
    set.set_if("description", patch.description.clone());
    set.set_if("function", patch.function.clone());
    set.set_if("comedogenic_rating", patch.comedogenic_rating);
    if set.is_empty() {
        return Ok(());
    }
    set.set("updated_at", to_millis(Utc::now()));

    let (sql, values) = set.into_update("ingredients", id);
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

fn delete_ingredient(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    Ok(conn.execute("DELETE FROM ingredients WHERE id = ?1", params![id])? > 0)
}

/// Map an ingredient starting at column `offset`.
pub(crate) fn map_ingredient(row: &Row<'_>, offset: usize) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        slug: row.get(offset + 2)?,
        inci_name: row.get(offset + 3)?,
        description: row.get(offset + 4)?,
        function: row.get(offset + 5)?,
        comedogenic_rating: row.get(offset + 6)?,
        created_by: row.get(offset + 7)?,
        created_at: from_millis(offset + 8, row.get(offset + 8)?)?,
        updated_at: from_millis(offset + 9, row.get(offset + 9)?)?,
    })
}

fn map_slug_error(err: rusqlite::Error) -> RoutinelyError {
    if is_unique_violation(&err) {
        RoutinelyError::AlreadyExists(Entity::Ingredient)
    } else {
        sql_error(err)
    }
}
