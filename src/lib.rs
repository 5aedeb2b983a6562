#![doc = "The `tasktrack` library crate."]
#![doc = ""]
#![doc = "Accounts with bcrypt-hashed credentials, one-hour HS256 session tokens, and"]
#![doc = "per-owner task lists behind an access gate, served with actix-web over a"]
#![doc = "Postgres or in-memory store. The binary (`main.rs`) wires configuration,"]
#![doc = "storage and the HTTP server together."]

pub mod auth;
pub mod config;
pub mod deadline;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
