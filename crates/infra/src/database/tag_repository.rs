//! SQLite-backed tags and product tagging.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use routinely_core::TagRepository;
use routinely_domain::{Entity, Result as DomainResult, RoutinelyError, Tag};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::blocking::with_connection;
use super::manager::DbManager;
use super::rows::{from_millis, new_id, to_millis};
use crate::errors::{is_unique_violation, sql_error};

/// SQLite-backed tag repository.
pub struct SqliteTagRepository {
    db: Arc<DbManager>,
}

impl SqliteTagRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TagRepository for SqliteTagRepository {
    async fn insert_tag(&self, name: &str, slug: &str) -> DomainResult<Tag> {
        let name = name.to_owned();
        let slug = slug.to_owned();
        with_connection(&self.db, move |conn| {
            insert_tag(conn, &name, &slug).map_err(|err| {
                if is_unique_violation(&err) {
                    RoutinelyError::AlreadyExists(Entity::Tag)
                } else {
                    sql_error(err)
                }
            })
        })
        .await
    }

    async fn list_tags(&self) -> DomainResult<Vec<Tag>> {
        with_connection(&self.db, |conn| list_tags(conn).map_err(sql_error)).await
    }

    async fn find_tag_by_slug(&self, slug: &str) -> DomainResult<Option<Tag>> {
        let slug = slug.to_owned();
        with_connection(&self.db, move |conn| find_by_slug(conn, &slug).map_err(sql_error)).await
    }

    async fn delete_tag(&self, id: &str) -> DomainResult<bool> {
        let id = id.to_owned();
        with_connection(&self.db, move |conn| delete_tag(conn, &id).map_err(sql_error)).await
    }

    async fn attach(&self, product_id: &str, tag_id: &str) -> DomainResult<bool> {
        let product_id = product_id.to_owned();
        let tag_id = tag_id.to_owned();
        with_connection(&self.db, move |conn| {
            if !exists(conn, "products", &product_id).map_err(sql_error)? {
                return Err(RoutinelyError::NotFound(Entity::Product));
            }
            if !exists(conn, "tags", &tag_id).map_err(sql_error)? {
                return Err(RoutinelyError::NotFound(Entity::Tag));
            }
            attach(conn, &product_id, &tag_id).map_err(sql_error)
        })
        .await
    }

    async fn detach(&self, product_id: &str, tag_id: &str) -> DomainResult<bool> {
        let product_id = product_id.to_owned();
        let tag_id = tag_id.to_owned();
        with_connection(&self.db, move |conn| {
            detach(conn, &product_id, &tag_id).map_err(sql_error)
        })
        .await
    }

    async fn tags_of(&self, product_id: &str) -> DomainResult<Vec<Tag>> {
        let product_id = product_id.to_owned();
        with_connection(&self.db, move |conn| {
            tags_of_product(conn, &product_id).map_err(sql_error)
        })
        .await
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn insert_tag(conn: &Connection, name: &str, slug: &str) -> rusqlite::Result<Tag> {
    let id = new_id();
    conn.execute(
        "INSERT INTO tags (id, name, slug, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, name, slug, to_millis(Utc::now())],
    )?;
    conn.query_row("SELECT id, name, slug, created_at FROM tags WHERE id = ?1", params![id], map_tag)
}

fn list_tags(conn: &Connection) -> rusqlite::Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name, slug, created_at FROM tags ORDER BY name, id")?;
    let rows = stmt.query_map([], map_tag)?;
    rows.collect()
}

fn tags_of_product(conn: &Connection, product_id: &str) -> rusqlite::Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, t.slug, t.created_at
         FROM product_tags pt
         JOIN tags t ON t.id = pt.tag_id
         WHERE pt.product_id = ?1
         ORDER BY t.name, t.id",
    )?;
    let rows = stmt.query_map(params![product_id], map_tag)?;
    rows.collect()
}

fn find_by_slug(conn: &Connection, slug: &str) -> rusqlite::Result<Option<Tag>> {
    conn.query_row(
        "SELECT id, name, slug, created_at FROM tags WHERE slug = ?1",
        params![slug],
        map_tag,
    )
    .optional()
}

fn delete_tag(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    Ok(conn.execute("DELETE FROM tags WHERE id = ?1", params![id])? > 0)
}

fn exists(conn: &Connection, table: &str, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
        params![id],
        |row| row.get(0),
    )
}

/// `false` when the pair was already present.
fn attach(conn: &Connection, product_id: &str, tag_id: &str) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO product_tags (product_id, tag_id) VALUES (?1, ?2)",
        params![product_id, tag_id],
    )?;
    Ok(inserted > 0)
}

fn detach(conn: &Connection, product_id: &str, tag_id: &str) -> rusqlite::Result<bool> {
    let removed = conn.execute(
        "DELETE FROM product_tags WHERE product_id = ?1 AND tag_id = ?2",
        params![product_id, tag_id],
    )?;
    Ok(removed > 0)
}

fn map_tag(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        created_at: from_millis(3, row.get(3)?)?,
    })
}
