//! LeadLab API Library
//!
//! A CRUD backend for sales leads: an axum HTTP layer over a PostgreSQL `leads` table.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `db_storage`: The `LeadStorage` trait and its PostgreSQL implementation.
//! - `memory_storage`: In-process `LeadStorage` for tests and database-less runs.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `lead_models`: API request/response shapes and input validation.
//! - `middleware`: Request logging and panic handling.
//! - `models`: Storage row and write models.
//! - `router`: Route table, middleware stack and OpenAPI document.
//! - `services`: Lead CRUD operations.
//! - `shutdown`: Graceful shutdown signal handling.

pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod lead_models;
pub mod memory_storage;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;
pub mod shutdown;
