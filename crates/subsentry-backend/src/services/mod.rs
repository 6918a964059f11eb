//! Backend service handlers for frontend-driven requests.
//!
//! This module groups async request handlers that operate on the shared
//! `AppContext`, perform side effects (network, filesystem), and emit state
//! updates or notifications back to the frontend.

pub mod alerts_service;
pub mod config_service;

/// Represents a type that is used in all handlers as an application context.
pub(crate) type AppContextHandle<A> = std::sync::Arc<crate::app::AppContext<A>>;
