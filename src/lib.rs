#![doc = "The `uptask` library crate."]
#![doc = ""]
#![doc = "Project and task management backend: email-confirmed accounts, projects owned by a"]
#![doc = "manager and shared with a team, tasks with an append-only status history, and notes."]
#![doc = "The binary (`main.rs`) wires these modules into an Actix Web server."]

pub mod access;
pub mod auth;
pub mod cascade;
pub mod config;
pub mod cors;
pub mod error;
pub mod mail;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
