pub mod api;
pub mod config;
pub mod crypto;
pub mod db;
pub mod domain;
pub mod http_server;
pub mod models;
pub mod observability;
pub mod repository;
pub mod schema;
pub mod services;
