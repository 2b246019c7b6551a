//! The monitoring daemon: poll orchestration, manual switches, lifecycle.
//!
//! [`FailoverMonitor`] owns the small set of mutable cells the system needs
//! (daemon flag, hysteresis timestamps, cached decision context). Each cell
//! updates independently and atomically - there is no outer lock, so a
//! scheduled `poll()` never blocks `status()` readers or a racing
//! `manual_switch()`, and an overlapping poll cannot corrupt the tracker's
//! first-down semantics.

pub mod engine;
pub mod tracker;

use crate::config::{Config, ServerConfig};
use crate::dns::DnsProvider;
use crate::errors::{Error, Result};
use crate::probe::HealthProbe;
use crate::types::{ConfigInfo, DaemonState, EndpointId, HealthState, MonitorSnapshot, NextAction, ServerInfo};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use engine::DecisionInput;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracker::HysteresisTracker;

/// Daemon controller over the probe, tracker, engine and DNS collaborators.
pub struct FailoverMonitor {
    config: Config,
    probe: Arc<dyn HealthProbe>,
    dns: Arc<dyn DnsProvider>,
    running: AtomicBool,
    tracker: HysteresisTracker,
    last_check: ArcSwap<DateTime<Utc>>,
    last_action: ArcSwap<NextAction>,
}

impl FailoverMonitor {
    pub fn new(config: Config, probe: Arc<dyn HealthProbe>, dns: Arc<dyn DnsProvider>) -> Self {
        Self {
            probe,
            dns,
            running: AtomicBool::new(true),
            tracker: HysteresisTracker::new(),
            last_check: ArcSwap::from_pointee(Utc::now()),
            last_action: ArcSwap::from_pointee(NextAction::None),
            config,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn reachable(&self, server: &ServerConfig) -> bool {
        self.probe
            .probe(&server.host, server.port, self.config.timing.connection_timeout)
            .await
    }

    /// One monitoring cycle: detect the active endpoint from DNS, probe both
    /// endpoints, fold the primary observation into the tracker, run the
    /// decision engine, and cache the outcome for `status()` readers.
    ///
    /// This is the only operation that mutates tracker state or writes DNS.
    pub async fn poll(&self) -> MonitorSnapshot {
        let current_active = self.dns.detect_active().await;
        tracing::info!("Checking endpoints, current active: {}", current_active);

        let now = Utc::now();
        self.last_check.store(Arc::new(now));

        let primary_up = self.reachable(&self.config.primary).await;
        let secondary_up = self.reachable(&self.config.secondary).await;

        self.tracker.observe(primary_up, now);

        let action = engine::decide(
            self.dns.as_ref(),
            DecisionInput {
                current_active,
                primary_up,
                secondary_up,
                down_since: self.tracker.down_since(),
                up_since: self.tracker.up_since(),
                now,
                failover_delay: self.config.timing.failover_delay,
                failback_delay: self.config.timing.failback_delay,
            },
        )
        .await;
        self.last_action.store(Arc::new(action));

        self.snapshot(
            current_active,
            HealthState::from_reachable(primary_up),
            HealthState::from_reachable(secondary_up),
            now,
            action,
        )
    }

    /// Read-only view: live active-endpoint detection and health probes,
    /// composed with the decision context cached by the most recent poll.
    /// Performs no decision and no DNS write, so it is safe to call at any
    /// rate.
    pub async fn status(&self) -> MonitorSnapshot {
        let current_active = self.dns.detect_active().await;
        let primary_up = self.reachable(&self.config.primary).await;
        let secondary_up = self.reachable(&self.config.secondary).await;

        self.snapshot(
            current_active,
            HealthState::from_reachable(primary_up),
            HealthState::from_reachable(secondary_up),
            **self.last_check.load(),
            **self.last_action.load(),
        )
    }

    pub async fn start(&self) -> Result<String> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(Error::invalid("Monitor is already running"));
        }

        tracing::info!("Starting failover monitoring daemon");

        // Initial check
        self.poll().await;

        Ok("Monitor started successfully".to_string())
    }

    pub async fn stop(&self) -> Result<String> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(Error::invalid("Monitor is not running"));
        }

        tracing::info!("Stopping failover monitoring daemon");

        Ok("Monitor stopped successfully".to_string())
    }

    /// Operator-initiated switch to a specific endpoint. Validates the
    /// target against the DNS-detected active endpoint and its live
    /// reachability before writing. A successful switch clears the
    /// hysteresis stamps - the operator's decision supersedes any
    /// in-progress window.
    pub async fn manual_switch(&self, target: EndpointId) -> Result<String> {
        let server = match target {
            EndpointId::Primary => &self.config.primary,
            EndpointId::Secondary => &self.config.secondary,
            EndpointId::None => {
                return Err(Error::invalid("Cannot manually switch to NONE. Use specific server type."));
            }
        };

        let current = self.dns.detect_active().await;
        if target == current {
            return Err(Error::invalid(format!("Already using {} server", target.as_lower())));
        }

        if !self.reachable(server).await {
            return Err(Error::invalid(format!(
                "Target {} server ({}) is not reachable",
                target.as_lower(),
                server.name
            )));
        }

        if self.dns.switch_to(target).await {
            // A manual switch resets hysteresis state
            self.tracker.clear();
            Ok(format!("Successfully switched to {} server", target.as_lower()))
        } else {
            Err(Error::switch_failed(format!("Failed to switch to {} server", target.as_lower())))
        }
    }

    /// Administrative/test hook: clear tracker stamps and cached decision
    /// context, refresh last-check, and reassert the running state.
    pub fn reset_state(&self) {
        self.tracker.clear();
        self.last_action.store(Arc::new(NextAction::None));
        self.last_check.store(Arc::new(Utc::now()));
        self.running.store(true, Ordering::SeqCst);
    }

    /// Raw current answer of the managed DNS record, for diagnostics.
    pub async fn current_answer(&self) -> Option<String> {
        self.dns.current_answer().await
    }

    fn snapshot(
        &self,
        current_active: EndpointId,
        primary_status: HealthState,
        secondary_status: HealthState,
        last_check: DateTime<Utc>,
        next_action: NextAction,
    ) -> MonitorSnapshot {
        MonitorSnapshot {
            daemon_status: if self.is_running() { DaemonState::Running } else { DaemonState::Stopped },
            current_active,
            primary_status,
            secondary_status,
            last_check,
            primary_down_since: self.tracker.down_since(),
            primary_up_since: self.tracker.up_since(),
            next_action,
            config: ConfigInfo {
                primary: server_info(&self.config.primary),
                secondary: server_info(&self.config.secondary),
            },
        }
    }
}

fn server_info(server: &ServerConfig) -> ServerInfo {
    ServerInfo {
        name: server.name.clone(),
        host: server.host.clone(),
        port: server.port,
    }
}
