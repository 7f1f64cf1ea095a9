// src/deploy/probe.rs

//! Readiness probing of the control plane.

use tracing::{debug, info, warn};

use crate::config::ProbePolicy;
use crate::control_plane::ControlPlane;

/// Result of one readiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady(String),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// One best-effort readiness check: a single pool listing.
///
/// Never fails; every problem is folded into [`Readiness::NotReady`].
pub async fn check<C: ControlPlane + ?Sized>(control_plane: &C) -> Readiness {
    match control_plane.list_pools().await {
        Ok(pools) => {
            debug!(pools = pools.len(), "control plane answered");
            Readiness::Ready
        }
        Err(e) => {
            warn!(error = %e, "control plane not ready");
            Readiness::NotReady(e.to_string())
        }
    }
}

pub async fn is_ready<C: ControlPlane + ?Sized>(control_plane: &C) -> bool {
    check(control_plane).await.is_ready()
}

/// Probe up to `policy.attempts` times, sleeping `policy.backoff` between
/// attempts, and stop at the first success.
///
/// Returns the last readiness result and the number of probes made.
pub async fn check_with_retry<C: ControlPlane + ?Sized>(
    control_plane: &C,
    policy: ProbePolicy,
) -> (Readiness, u32) {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        let readiness = check(control_plane).await;
        if readiness.is_ready() || attempt >= attempts {
            if attempt > 1 {
                info!(attempt, ready = readiness.is_ready(), "readiness probing finished");
            }
            return (readiness, attempt);
        }
        debug!(attempt, attempts, backoff = ?policy.backoff, "retrying readiness probe");
        tokio::time::sleep(policy.backoff).await;
        attempt += 1;
    }
}
