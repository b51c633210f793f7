//! Derived health labels. Never stored; recomputed on every query.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display label for one scheduled job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobHealth {
    Healthy,
    Running,
    Unhealthy,
}

impl fmt::Display for JobHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobHealth::Healthy => write!(f, "healthy"),
            JobHealth::Running => write!(f, "running"),
            JobHealth::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Overall status of the system.
///
/// Variants are declared in ascending severity so `Ord` can rank them:
/// `Healthy < Degraded < Running < Unhealthy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemHealth {
    Healthy,
    Degraded,
    Running,
    Unhealthy,
}

impl fmt::Display for SystemHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemHealth::Healthy => write!(f, "healthy"),
            SystemHealth::Degraded => write!(f, "degraded"),
            SystemHealth::Running => write!(f, "running"),
            SystemHealth::Unhealthy => write!(f, "unhealthy"),
        }
    }
}
