#![doc = "The `tasktrack` library crate."]
#![doc = ""]
#![doc = "Task, comment and user endpoints behind stateless bearer-token authentication."]
#![doc = "The `auth` module holds the token codec, credential lookup, token issuer, route"]
#![doc = "classification and the request authenticator that `main.rs` wraps around the app."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
