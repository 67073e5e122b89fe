//! Storage functions, one module per table family. Every function takes the
//! pool, checks out a connection and returns `DbError` on failure; missing
//! rows come back as `None`/`false` rather than errors.

pub mod analytics;
pub mod appointments;
pub mod assistants;
pub mod business;
pub mod calendar;
pub mod call_logs;
pub mod knowledge_base;
pub mod tenants;
pub mod tools;
