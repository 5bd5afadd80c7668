//! Column encodings shared by the adapters

use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Epoch milliseconds.
pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(idx: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {millis}").into(),
        )
    })
}

pub(crate) fn opt_from_millis(
    idx: usize,
    millis: Option<i64>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    millis.map(|ms| from_millis(idx, ms)).transpose()
}

/// Decode a JSON text column.
pub(crate) fn from_json<T: DeserializeOwned>(idx: usize, text: &str) -> rusqlite::Result<T> {
    serde_json::from_str(text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Appends `LIMIT`/`OFFSET` clauses; SQLite needs a LIMIT before any OFFSET.
pub(crate) fn paginate(sql: &mut String, limit: Option<u32>, offset: Option<u32>) {
    match (limit, offset) {
        (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
        (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
        (None, None) => {}
    }
}

/// Column assignments of a partial UPDATE, built from a patch.
#[derive(Debug, Default)]
pub(crate) struct SetClause {
    columns: Vec<&'static str>,
    values: Vec<Value>,
}

impl SetClause {
    pub(crate) fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        self.columns.push(column);
        self.values.push(value.into());
    }

    /// Assign only when the patch carries the field.
    pub(crate) fn set_if<T: Into<Value>>(&mut self, column: &'static str, value: Option<T>) {
        if let Some(value) = value {
            self.set(column, value);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `UPDATE {table} SET ... WHERE id = ?` with the id bound last.
    pub(crate) fn into_update(self, table: &str, id: &str) -> (String, Vec<Value>) {
        let assignments: Vec<String> =
            self.columns.iter().map(|column| format!("{column} = ?")).collect();
        let sql = format!("UPDATE {table} SET {} WHERE id = ?", assignments.join(", "));
        let mut values = self.values;
        values.push(Value::Text(id.to_owned()));
        (sql, values)
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_round_trip_keeps_millisecond_precision() {
        let at = DateTime::from_timestamp_millis(1_718_000_000_123).unwrap();
        assert_eq!(from_millis(0, to_millis(at)).unwrap(), at);
    }

    #[test]
    fn set_clause_binds_id_last() {
        let mut set = SetClause::default();
        set.set_if("name", Some("Toner".to_owned()));
        set.set_if::<String>("brand", None);
        set.set("description", None::<String>);

        let (sql, values) = set.into_update("products", "p1");
        assert_eq!(sql, "UPDATE products SET name = ?, description = ? WHERE id = ?");
        assert_eq!(values.len(), 3);
        assert_eq!(values[1], Value::Null);
        assert_eq!(values[2], Value::Text("p1".to_owned()));
    }

    #[test]
    fn pagination_clauses() {
        let mut sql = String::from("SELECT 1");
        paginate(&mut sql, None, Some(5));
        assert_eq!(sql, "SELECT 1 LIMIT -1 OFFSET 5");

        let mut sql = String::from("SELECT 1");
        paginate(&mut sql, Some(10), None);
        assert_eq!(sql, "SELECT 1 LIMIT 10");
    }
}
