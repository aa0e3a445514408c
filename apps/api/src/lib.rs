//! Profile sections service: section models, validation, the repeatable-record
//! editor, lookup suggestions and the axum router that serves them.

pub mod auth;
pub mod config;
pub mod documents;
pub mod errors;
pub mod lookups;
pub mod notify;
pub mod places;
pub mod profile;
pub mod routes;
pub mod state;
pub mod support;
pub mod uploads;
