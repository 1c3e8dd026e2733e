//! HTTP inbound adapter exposing the workflow as a JSON API.

pub mod audit;
pub mod auth;
pub mod contracts;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod session;
pub mod session_config;
pub mod state;
pub mod tasks;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
