//! Foundation layer: update model, per-update context and services, errors.

pub mod context;
pub mod error;
pub mod services;
pub mod update;
