// src/control_plane/mod.rs

//! Read access to the control-plane API.
//!
//! Only listing pools is done over HTTP; everything that changes state goes
//! through the external CLI (see [`crate::exec`]).

pub mod http;

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::errors::Result;

pub use http::HttpControlPlane;

/// A work pool as reported by the control plane.
///
/// The service returns many more fields; only these are read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoolSummary {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Trait abstracting the control-plane API.
pub trait ControlPlane: Send + Sync {
    /// List all work pools known to the control plane.
    fn list_pools(&self) -> Pin<Box<dyn Future<Output = Result<Vec<PoolSummary>>> + Send + '_>>;
}
