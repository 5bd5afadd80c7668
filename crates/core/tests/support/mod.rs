//! Shared test helpers for `routinely-core` integration tests.
//!
//! In-memory mocks of every port the services use, so behaviour tests run
//! without a database.

#![allow(dead_code)]

pub mod repositories;
