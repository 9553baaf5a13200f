//! HTTP client library for the remote asset service.
//!
//! Provides the typed REST wrapper ([`api::AssetApi`]), the
//! [`service::AssetService`] seam used by the synchronization engine, and
//! environment-driven [`config::ClientConfig`].

pub mod api;
pub mod config;
pub mod service;

pub use api::{AssetApi, AssetApiError, FailureKind};
pub use config::{ClientConfig, ConfigError};
pub use service::AssetService;
