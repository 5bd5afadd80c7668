//! SQLite-backed product repository and product edit log.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use routinely_core::{EditLog, ProductRepository};
use routinely_domain::{
    CreateProductInput, EditRecord, Entity, Product, ProductFilter, ProductPatch,
    Result as DomainResult, RoutinelyError,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;

use super::blocking::with_connection;
use super::edit_log::{self, PRODUCT_EDITS};
use super::manager::DbManager;
use super::rows::{from_millis, new_id, paginate, to_millis, SetClause};
use crate::errors::{is_unique_violation, sql_error, storage_error};

/// Product columns, qualified with the `p` alias.
pub(crate) const PRODUCT_COLUMNS: &str = "p.id, p.name, p.brand, p.slug, p.category, \
     p.description, p.image_url, p.created_by, p.created_at, p.updated_at";

/// Number of columns in [`PRODUCT_COLUMNS`].
pub(crate) const PRODUCT_COLUMN_COUNT: usize = 10;

/// SQLite-backed product repository.
pub struct SqliteProductRepository {
    db: Arc<DbManager>,
}

impl SqliteProductRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EditLog for SqliteProductRepository {
    async fn append_edit(&self, record: &EditRecord) -> DomainResult<EditRecord> {
        let record = record.clone();
        with_connection(&self.db, move |conn| edit_log::append(conn, PRODUCT_EDITS, &record))
            .await
    }

    async fn list_edits(&self, entity_id: &str) -> DomainResult<Vec<EditRecord>> {
        let entity_id = entity_id.to_owned();
        with_connection(&self.db, move |conn| {
            edit_log::list(conn, PRODUCT_EDITS, &entity_id).map_err(sql_error)
        })
        .await
    }
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn insert_product(
        &self,
        input: &CreateProductInput,
        slug: &str,
    ) -> DomainResult<Product> {
        let input = input.clone();
        let slug = slug.to_owned();
        with_connection(&self.db, move |conn| {
            insert_product(conn, &input, &slug).map_err(map_slug_error)
        })
        .await
    }

    async fn find_product(&self, id: &str) -> DomainResult<Option<Product>> {
        let id = id.to_owned();
        with_connection(&self.db, move |conn| {
            query_one(conn, "p.id = ?1", &id).map_err(sql_error)
        })
        .await
    }

    async fn find_product_by_slug(&self, slug: &str) -> DomainResult<Option<Product>> {
        let slug = slug.to_owned();
        with_connection(&self.db, move |conn| {
            query_one(conn, "p.slug = ?1", &slug).map_err(sql_error)
        })
        .await
    }

    async fn list_products(&self, filter: &ProductFilter) -> DomainResult<Vec<Product>> {
        let filter = filter.clone();
        with_connection(&self.db, move |conn| {
            let products = query_filtered(conn, &filter).map_err(sql_error)?;
            debug!(count = products.len(), "listed products");
            Ok(products)
        })
        .await
    }

    async fn update_product(
        &self,
        id: &str,
        patch: &ProductPatch,
    ) -> DomainResult<Option<(Product, Product)>> {
        let id = id.to_owned();
        let patch = patch.clone();
        with_connection(&self.db, move |conn| {
            let tx = conn.immediate_transaction().map_err(storage_error)?;
            let Some(before) = query_one(&tx, "p.id = ?1", &id).map_err(sql_error)? else {
                return Ok(None);
            };
            apply_patch(&tx, &id, &patch).map_err(map_slug_error)?;
            let after = query_one(&tx, "p.id = ?1", &id)
                .map_err(sql_error)?
                .ok_or(RoutinelyError::UpdateFailed(Entity::Product))?;
            tx.commit().map_err(sql_error)?;
            Ok(Some((before, after)))
        })
        .await
    }

    async fn delete_product(&self, id: &str) -> DomainResult<bool> {
        let id = id.to_owned();
        with_connection(&self.db, move |conn| {
            delete_product(conn, &id).map_err(sql_error)
        })
        .await
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn insert_product(
    conn: &Connection,
    input: &CreateProductInput,
    slug: &str,
) -> rusqlite::Result<Product> {
    let id = new_id();
    let now = to_millis(Utc::now());
    conn.execute(
        "INSERT INTO products
            (id, name, brand, slug, category, description, image_url, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            id,
            input.name.trim(),
            input.brand.trim(),
            slug,
            input.category,
            input.description,
            input.image_url,
            input.created_by,
            now
        ],
    )?;
    conn.query_row(
        &format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = ?1"),
        params![id],
        |row| map_product(row, 0),
    )
}

fn query_one(conn: &Connection, predicate: &str, key: &str) -> rusqlite::Result<Option<Product>> {
    conn.query_row(
        &format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE {predicate}"),
        params![key],
        |row| map_product(row, 0),
    )
    .optional()
}

fn query_filtered(conn: &Connection, filter: &ProductFilter) -> rusqlite::Result<Vec<Product>> {
    let mut sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE 1 = 1");
    let mut values: Vec<Value> = Vec::new();

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        sql.push_str(" AND (p.name LIKE ? OR p.brand LIKE ?)");
        let pattern = format!("%{search}%");
        values.push(Value::Text(pattern.clone()));
        values.push(Value::Text(pattern));
    }
    if let Some(brand) = &filter.brand {
        sql.push_str(" AND p.brand = ? COLLATE NOCASE");
        values.push(Value::Text(brand.clone()));
    }
    if let Some(category) = &filter.category {
        sql.push_str(" AND p.category = ?");
        values.push(Value::Text(category.clone()));
    }
    sql.push_str(" ORDER BY p.created_at DESC, p.id DESC");
    paginate(&mut sql, filter.limit, filter.offset);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |row| map_product(row, 0))?;
    rows.collect()
}

fn apply_patch(conn: &Connection, id: &str, patch: &ProductPatch) -> rusqlite::Result<()> {
    let mut set = SetClause::default();
    set.set_if("name", patch.name.as_deref().map(|v| v.trim().to_owned()));
    set.set_if("brand", patch.brand.as_deref().map(|v| v.trim().to_owned()));
    set.set_if("slug", patch.slug.clone());
    set.set_if("category", patch.category.clone());
    set.set_if("description", patch.description.clone());
    set.set_if("image_url", patch.image_url.clone());
    if set.is_empty() {
        return Ok(());
    }
    set.set("updated_at", to_millis(Utc::now()));

    let (sql, values) = set.into_update("products", id);
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

fn delete_product(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    Ok(conn.execute("DELETE FROM products WHERE id = ?1", params![id])? > 0)
}

/// Map a product starting at column `offset`.
pub(crate) fn map_product(row: &Row<'_>, offset: usize) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        brand: row.get(offset + 2)?,
        slug: row.get(offset + 3)?,
        category: row.get(offset + 4)?,
        description: row.get(offset + 5)?,
        image_url: row.get(offset + 6)?,
        created_by: row.get(offset + 7)?,
        created_at: from_millis(offset + 8, row.get(offset + 8)?)?,
        updated_at: from_millis(offset + 9, row.get(offset + 9)?)?,
    })
}

fn map_slug_error(err: rusqlite::Error) -> RoutinelyError {
    if is_unique_violation(&err) {
        RoutinelyError::AlreadyExists(Entity::Product)
    } else {
        sql_error(err)
    }
}
