//! Shared storage of catalog edit records
//!
//! `product_edits` and `ingredient_edits` have the same shape and differ only
//! in table and owning-column names.

use routinely_domain::{EditRecord, Entity, Result as DomainResult, RoutinelyError};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::rows::{from_json, from_millis, to_json, to_millis};
use crate::errors::{is_foreign_key_violation, sql_error};

/// Table layout of one entity's edit log.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EditTable {
    pub table: &'static str,
    pub owner_column: &'static str,
    /// Entity reported when the owner row is missing.
    pub owner: Entity,
    pub edit: Entity,
}

pub(crate) const PRODUCT_EDITS: EditTable = EditTable {
    table: "product_edits",
    owner_column: "product_id",
    owner: Entity::Product,
    edit: Entity::ProductEdit,
};

pub(crate) const INGREDIENT_EDITS: EditTable = EditTable {
    table: "ingredient_edits",
    owner_column: "ingredient_id",
    owner: Entity::Ingredient,
    edit: Entity::IngredientEdit,
};

pub(crate) fn append(
    conn: &Connection,
    table: EditTable,
    record: &EditRecord,
) -> DomainResult<EditRecord> {
    let changes = to_json(&record.changes).map_err(sql_error)?;
    conn.execute(
        &format!(
            "INSERT INTO {} (id, {}, edited_by, changes, summary, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            table.table, table.owner_column
        ),
        params![
            record.id,
            record.entity_id,
            record.edited_by,
            changes,
            record.summary,
            to_millis(record.created_at)
        ],
    )
    .map_err(|err| {
        if is_foreign_key_violation(&err) {
            RoutinelyError::NotFound(table.owner)
        } else {
            sql_error(err)
        }
    })?;
    // Stored timestamps are millisecond precision; hand back what was written.
    find(conn, table, &record.id)
        .map_err(sql_error)?
        .ok_or(RoutinelyError::CreationFailed(table.edit))
}

fn find(conn: &Connection, table: EditTable, id: &str) -> rusqlite::Result<Option<EditRecord>> {
    conn.query_row(
        &format!(
            "SELECT id, {}, edited_by, changes, summary, created_at FROM {} WHERE id = ?1",
            table.owner_column, table.table
        ),
        params![id],
        map_edit,
    )
    .optional()
}

/// Edits of one entity, newest first.
pub(crate) fn list(
    conn: &Connection,
    table: EditTable,
    entity_id: &str,
) -> rusqlite::Result<Vec<EditRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, {owner}, edited_by, changes, summary, created_at FROM {table}
         WHERE {owner} = ?1
         ORDER BY created_at DESC, id DESC",
        owner = table.owner_column,
        table = table.table,
    ))?;
    let rows = stmt.query_map(params![entity_id], map_edit)?;
    rows.collect()
}

fn map_edit(row: &Row<'_>) -> rusqlite::Result<EditRecord> {
    let changes: String = row.get(3)?;
    Ok(EditRecord {
        id: row.get(0)?,
        entity_id: row.get(1)?,
        edited_by: row.get(2)?,
        changes: from_json(3, &changes)?,
        summary: row.get(4)?,
        created_at: from_millis(5, row.get(5)?)?,
    })
}
