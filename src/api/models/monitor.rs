//! Request/response models for the monitor API.

use crate::types::{EndpointId, MonitorSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Daemon lifecycle actions accepted by the control endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ControlAction {
    Start,
    Stop,
}

#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    pub action: ControlAction,
}

#[derive(Debug, Deserialize)]
pub struct ActiveRequest {
    /// Target endpoint; "PRIMARY" or "SECONDARY" (NONE is rejected by the
    /// monitor, not by deserialization, so the caller gets the fixed
    /// message).
    pub active: EndpointId,
}

/// Outcome envelope for control-style endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Coarse service health for load balancers and uptime checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallHealth {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: OverallHealth,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub timestamp: DateTime<Utc>,
    pub monitor: MonitorSnapshot,
}

/// Raw answer of the managed DNS record, surfaced for diagnostics.
#[derive(Debug, Serialize)]
pub struct DnsAnswerResponse {
    pub answer: Option<String>,
}
