//! Core functionality: settings layering and reconciliation, the
//! connection state machine, the capture loop, and the persisted
//! config/template/runtime records.

pub mod capture;
pub mod config;
pub mod connection;
pub mod error;
pub mod reconcile;
pub mod runtime;
pub mod settings;
pub mod template;
