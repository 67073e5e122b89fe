pub mod analytics;
pub mod query_cache;
pub mod rollup_scheduler;
