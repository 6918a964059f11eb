//! Backend runtime entry point and public API surface.
//!
//! This crate owns the backend lifecycle, polls the renewal alerts endpoint,
//! routes bridge messages to services, and manages shared state used by
//! asynchronous tasks.

mod app;
pub mod auth;
pub mod config;
mod poller;
mod runtime;
mod services;
mod state;

pub use crate::auth::{AuthTokenProvider, EnvTokenProvider};
pub use crate::runtime::run;
