// src/control_plane/http.rs

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tracing::debug;

use crate::config::ConnectionTarget;
use crate::errors::{FlowdeployError, Result};

use super::{ControlPlane, PoolSummary};

/// `reqwest`-backed control-plane client.
#[derive(Debug, Clone)]
pub struct HttpControlPlane {
    client: Client,
    base_url: String,
}

impl HttpControlPlane {
    /// Build a client for `target`.
    ///
    /// Without `timeout` requests rely on the transport defaults.
    pub fn new(target: &ConnectionTarget, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: target.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ControlPlane for HttpControlPlane {
    fn list_pools(&self) -> Pin<Box<dyn Future<Output = Result<Vec<PoolSummary>>> + Send + '_>> {
        Box::pin(async move {
            let url = format!("{}/work_pools/filter", self.base_url);
            debug!(%url, "listing work pools");

            let response = self
                .client
                .post(&url)
                .json(&serde_json::json!({}))
                .send()
                .await
                .map_err(|e| FlowdeployError::Connectivity(format!("POST {url}: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(FlowdeployError::Connectivity(format!(
                    "POST {url} returned {status}: {}",
                    body.trim()
                )));
            }

            let pools: Vec<PoolSummary> = response.json().await.map_err(|e| {
                FlowdeployError::Connectivity(format!("malformed pool list from {url}: {e}"))
            })?;

            debug!(count = pools.len(), "work pools listed");
            Ok(pools)
        })
    }
}
