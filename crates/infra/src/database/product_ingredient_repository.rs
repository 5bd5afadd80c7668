//! SQLite-backed product/ingredient link table.

use std::sync::Arc;

use async_trait::async_trait;
use routinely_core::ProductIngredientRepository;
use routinely_domain::{
    Entity, IngredientInProduct, ProductIngredient, ProductIngredientInput,
    ProductIngredientPatch, ProductWithConcentration, Result as DomainResult, RoutinelyError,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;

use super::blocking::with_connection;
use super::ingredient_repository::{map_ingredient, INGREDIENT_COLUMNS, INGREDIENT_COLUMN_COUNT};
use super::manager::DbManager;
use super::product_repository::{map_product, PRODUCT_COLUMNS, PRODUCT_COLUMN_COUNT};
use crate::errors::{is_unique_violation, sql_error, storage_error};

/// SQLite-backed product/ingredient link repository.
pub struct SqliteProductIngredientRepository {
    db: Arc<DbManager>,
}

impl SqliteProductIngredientRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductIngredientRepository for SqliteProductIngredientRepository {
    async fn add_link(&self, input: &ProductIngredientInput) -> DomainResult<ProductIngredient> {
        let input = input.clone();
        with_connection(&self.db, move |conn| {
            let tx = conn.immediate_transaction().map_err(storage_error)?;
            if !row_exists(&tx, "products", &input.product_id).map_err(sql_error)? {
                return Err(RoutinelyError::NotFound(Entity::Product));
            }
            if !row_exists(&tx, "ingredients", &input.ingredient_id).map_err(sql_error)? {
                return Err(RoutinelyError::NotFound(Entity::Ingredient));
            }
            insert_link(&tx, &input).map_err(|err| {
                if is_unique_violation(&err) {
                    RoutinelyError::AlreadyExists(Entity::ProductIngredient)
                } else {
                    sql_error(err)
                }
            })?;
            tx.commit().map_err(sql_error)?;
            Ok(ProductIngredient {
                product_id: input.product_id,
                ingredient_id: input.ingredient_id,
                concentration: input.concentration,
                position: input.position,
            })
        })
        .await
    }

    async fn update_link(
        &self,
        product_id: &str,
        ingredient_id: &str,
        patch: &ProductIngredientPatch,
    ) -> DomainResult<Option<ProductIngredient>> {
        let product_id = product_id.to_owned();
        let ingredient_id = ingredient_id.to_owned();
        let patch = patch.clone();
        with_connection(&self.db, move |conn| {
            let tx = conn.immediate_transaction().map_err(storage_error)?;
            apply_patch(&tx, &product_id, &ingredient_id, &patch).map_err(sql_error)?;
            let link = query_link(&tx, &product_id, &ingredient_id).map_err(sql_error)?;
            tx.commit().map_err(sql_error)?;
            Ok(link)
        })
        .await
    }

    async fn remove_link(&self, product_id: &str, ingredient_id: &str) -> DomainResult<bool> {
        let product_id = product_id.to_owned();
        let ingredient_id = ingredient_id.to_owned();
        with_connection(&self.db, move |conn| {
            delete_link(conn, &product_id, &ingredient_id).map_err(sql_error)
        })
        .await
    }

    async fn ingredients_of(&self, product_id: &str) -> DomainResult<Vec<IngredientInProduct>> {
        let product_id = product_id.to_owned();
        with_connection(&self.db, move |conn| {
            let ingredients = query_ingredients_of(conn, &product_id).map_err(sql_error)?;
            debug!(product_id = %product_id, count = ingredients.len(), "listed product ingredients");
            Ok(ingredients)
        })
        .await
    }

    async fn products_with(
        &self,
        ingredient_id: &str,
    ) -> DomainResult<Vec<ProductWithConcentration>> {
        let ingredient_id = ingredient_id.to_owned();
        with_connection(&self.db, move |conn| {
            query_products_with(conn, &ingredient_id).map_err(sql_error)
        })
        .await
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn row_exists(conn: &Connection, table: &str, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
        params![id],
        |row| row.get(0),
    )
}

fn insert_link(conn: &Connection, input: &ProductIngredientInput) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO product_ingredients (product_id, ingredient_id, concentration, position)
         VALUES (?1, ?2, ?3, ?4)",
        params![input.product_id, input.ingredient_id, input.concentration, input.position],
    )?;
    Ok(())
}

fn apply_patch(
    conn: &Connection,
    product_id: &str,
    ingredient_id: &str,
    patch: &ProductIngredientPatch,
) -> rusqlite::Result<()> {
    let mut assignments = Vec::new();
    let mut values: Vec<rusqlite::types::Value> = Vec::new();
    if let Some(concentration) = patch.concentration {
        assignments.push("concentration = ?");
        values.push(concentration.into());
    }
    if let Some(position) = patch.position {
        assignments.push("position = ?");
        values.push(position.into());
    }
    if assignments.is_empty() {
        return Ok(());
    }
    values.push(product_id.to_owned().into());
    values.push(ingredient_id.to_owned().into());
    conn.execute(
        &format!(
            "UPDATE product_ingredients SET {} WHERE product_id = ? AND ingredient_id = ?",
            assignments.join(", ")
        ),
        params_from_iter(values),
    )?;
    Ok(())
}

fn query_link(
    conn: &Connection,
    product_id: &str,
    ingredient_id: &str,
) -> rusqlite::Result<Option<ProductIngredient>> {
    conn.query_row(
        "SELECT product_id, ingredient_id, concentration, position FROM product_ingredients
         WHERE product_id = ?1 AND ingredient_id = ?2",
        params![product_id, ingredient_id],
        |row| {
            Ok(ProductIngredient {
                product_id: row.get(0)?,
                ingredient_id: row.get(1)?,
                concentration: row.get(2)?,
                position: row.get(3)?,
            })
        },
    )
    .optional()
}

fn delete_link(conn: &Connection, product_id: &str, ingredient_id: &str) -> rusqlite::Result<bool> {
    let removed = conn.execute(
        "DELETE FROM product_ingredients WHERE product_id = ?1 AND ingredient_id = ?2",
        params![product_id, ingredient_id],
    )?;
    Ok(removed > 0)
}

fn query_ingredients_of(
    conn: &Connection,
    product_id: &str,
) -> rusqlite::Result<Vec<IngredientInProduct>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INGREDIENT_COLUMNS}, pi.concentration, pi.position
         FROM product_ingredients pi
         JOIN ingredients i ON i.id = pi.ingredient_id
         WHERE pi.product_id = ?1
         ORDER BY pi.position, i.name"
    ))?;
    let rows = stmt.query_map(params![product_id], |row| {
        Ok(IngredientInProduct {
            ingredient: map_ingredient(row, 0)?,
            concentration: row.get(INGREDIENT_COLUMN_COUNT)?,
            position: row.get(INGREDIENT_COLUMN_COUNT + 1)?,
        })
    })?;
    rows.collect()
}

fn query_products_with(
    conn: &Connection,
    ingredient_id: &str,
) -> rusqlite::Result<Vec<ProductWithConcentration>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS}, pi.concentration, pi.position
         FROM product_ingredients pi
         JOIN products p ON p.id = pi.product_id
         WHERE pi.ingredient_id = ?1
         ORDER BY p.name, p.id"
    ))?;
    let rows = stmt.query_map(params![ingredient_id], map_product_with)?;
    rows.collect()
}

fn map_product_with(row: &Row<'_>) -> rusqlite::Result<ProductWithConcentration> {
    Ok(ProductWithConcentration {
        product: map_product(row, 0)?,
        concentration: row.get(PRODUCT_COLUMN_COUNT)?,
        position: row.get(PRODUCT_COLUMN_COUNT + 1)?,
    })
}
