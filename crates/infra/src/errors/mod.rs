//! Infrastructure error conversions

mod conversions;

pub use conversions::{
    is_foreign_key_violation, is_unique_violation, map_join_error, sql_error, storage_error,
    InfraError,
};
