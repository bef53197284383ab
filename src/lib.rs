#![doc = "The `taskdesk` library crate."]
#![doc = ""]
#![doc = "Domain models, the entity store, JWT authentication, role checks, routing"]
#![doc = "and error handling for the TaskDesk API. The binary (`main.rs`) wires these"]
#![doc = "into an `HttpServer`; the integration tests build the same app in process."]

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
