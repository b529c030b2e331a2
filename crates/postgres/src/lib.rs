//! # Postgres
//!
//! This crate provides the database client for the reservation platform backend.

/// Database pool construction and schema migrations.
pub mod database;
