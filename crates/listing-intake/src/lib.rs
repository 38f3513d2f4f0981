//! Core library for the partner-facing listing intake service.
//!
//! The `intake` module implements the Open API ingestion pipeline: credential
//! authentication, per-credential rate limiting, alias resolution of
//! heterogeneous CRM payloads into the canonical listing schema, validation,
//! and draft persistence. `config` and `telemetry` cover service bootstrap.

pub mod config;
pub mod error;
pub mod intake;
pub mod telemetry;
