pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;
pub mod stores;
pub mod websocket;
