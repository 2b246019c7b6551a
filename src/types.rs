//! Domain types shared by the monitor core, the DNS client and the API layer.
//!
//! The wire representations here are load-bearing: the dashboard matches the
//! uppercase enum values (`"PRIMARY"`, `"RUNNING"`, `"UP"`) and the
//! lowercase `next_action` strings, so the serde attributes below are part
//! of the public contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which endpoint a DNS answer, a snapshot or a manual switch request
/// designates.
///
/// `None` is the honest "no endpoint currently active" state: the DNS record
/// is missing, unreadable, or names an address that matches neither
/// configured endpoint. It is a valid *detected* state but never a valid
/// manual-switch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EndpointId {
    Primary,
    Secondary,
    None,
}

impl EndpointId {
    /// Lowercase form used in operator-facing messages ("primary server").
    pub fn as_lower(&self) -> &'static str {
        match self {
            EndpointId::Primary => "primary",
            EndpointId::Secondary => "secondary",
            EndpointId::None => "none",
        }
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndpointId::Primary => "PRIMARY",
            EndpointId::Secondary => "SECONDARY",
            EndpointId::None => "NONE",
        };
        f.write_str(s)
    }
}

/// Health of a single endpoint as seen by the TCP probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthState {
    Up,
    Down,
    /// Only meaningful when asking about the health of [`EndpointId::None`].
    Unknown,
}

impl HealthState {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable { HealthState::Up } else { HealthState::Down }
    }
}

/// Whether the monitoring daemon is accepting scheduled polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DaemonState {
    Running,
    Stopped,
}

/// Outcome of the most recent decision cycle.
///
/// The two `Waiting*` variants carry the whole seconds left in their
/// hysteresis window, recomputed on every poll. The payload only becomes a
/// string ("waiting_for_failover (20s remaining)") at the serialization
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    None,
    WaitingForFailover { remaining_secs: i64 },
    WaitingForFailback { remaining_secs: i64 },
    SwitchedToSecondary,
    SwitchedToPrimary,
    FailedToSwitchToSecondary,
    FailedToSwitchToPrimary,
    BothServersDown,
    SecondaryServerDown,
}

impl NextAction {
    fn label(&self) -> &'static str {
        match self {
            NextAction::None => "none",
            NextAction::WaitingForFailover { .. } => "waiting_for_failover",
            NextAction::WaitingForFailback { .. } => "waiting_for_failback",
            NextAction::SwitchedToSecondary => "switched_to_secondary",
            NextAction::SwitchedToPrimary => "switched_to_primary",
            NextAction::FailedToSwitchToSecondary => "failed_to_switch_to_secondary",
            NextAction::FailedToSwitchToPrimary => "failed_to_switch_to_primary",
            NextAction::BothServersDown => "both_servers_down",
            NextAction::SecondaryServerDown => "secondary_server_down",
        }
    }
}

impl fmt::Display for NextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextAction::WaitingForFailover { remaining_secs } | NextAction::WaitingForFailback { remaining_secs } => {
                write!(f, "{} ({}s remaining)", self.label(), remaining_secs)
            }
            _ => f.write_str(self.label()),
        }
    }
}

impl Serialize for NextAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Static descriptor of one configured endpoint, echoed in snapshots so the
/// dashboard can label the servers without a second config fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub host: String,
    pub port: u16,
}

/// The endpoint descriptor pair nested under `config` in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigInfo {
    pub primary: ServerInfo,
    pub secondary: ServerInfo,
}

/// Immutable point-in-time composite of all monitor-visible state.
///
/// Returned by both `poll()` and `status()`; the field names are the wire
/// names.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub daemon_status: DaemonState,
    pub current_active: EndpointId,
    pub primary_status: HealthState,
    pub secondary_status: HealthState,
    pub last_check: DateTime<Utc>,
    pub primary_down_since: Option<DateTime<Utc>>,
    pub primary_up_since: Option<DateTime<Utc>>,
    pub next_action: NextAction,
    pub config: ConfigInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_action_serializes_as_plain_label() {
        let json = serde_json::to_value(NextAction::SwitchedToSecondary).unwrap();
        assert_eq!(json, serde_json::json!("switched_to_secondary"));
    }

    #[test]
    fn waiting_actions_carry_remaining_seconds_in_suffix() {
        let json = serde_json::to_value(NextAction::WaitingForFailover { remaining_secs: 20 }).unwrap();
        assert_eq!(json, serde_json::json!("waiting_for_failover (20s remaining)"));

        let json = serde_json::to_value(NextAction::WaitingForFailback { remaining_secs: 7 }).unwrap();
        assert_eq!(json, serde_json::json!("waiting_for_failback (7s remaining)"));
    }

    #[test]
    fn endpoint_id_uses_uppercase_wire_values() {
        assert_eq!(serde_json::to_value(EndpointId::Primary).unwrap(), serde_json::json!("PRIMARY"));
        let parsed: EndpointId = serde_json::from_value(serde_json::json!("SECONDARY")).unwrap();
        assert_eq!(parsed, EndpointId::Secondary);
    }
}
