//! Request handlers, one module per resource

pub mod health;
pub mod pull_request;
pub mod team;
pub mod user;
