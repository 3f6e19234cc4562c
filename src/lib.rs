//! Recipes and their ingredients, stored in SQLite and served over HTTP.
//!
//! Shared by the `main` server binary and the `import-data` loader.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod repository;
pub mod serializers;
