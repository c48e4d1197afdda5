//! # Tokens Infra
//!
//! Infrastructure layer for the refresh-token service: the PostgreSQL
//! implementation of the storage contract and connection-pool plumbing.

pub mod database;

pub use database::postgres::PostgresTokenRepository;
