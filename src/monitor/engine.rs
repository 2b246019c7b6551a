//! The failover decision engine.
//!
//! [`decide`] is a function of one consistent observation set - the detected
//! active endpoint, both health observations, the tracker's timestamps and
//! the configured hysteresis windows - with a single side effect: invoking
//! the DNS switch when a flip is warranted. The DNS record itself is the
//! source of truth for which endpoint is active, so the engine never stores
//! an "active" cell of its own; the next poll re-reads the record and sees
//! whatever the last switch (or a concurrent manual one) produced.
//!
//! A failed DNS write is never retried inline. It surfaces as a
//! `FailedToSwitchTo*` action and retries naturally on the next poll, since
//! the condition that wanted the switch still holds.

use crate::dns::DnsProvider;
use crate::types::{EndpointId, NextAction};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Everything one decision cycle looks at, collected up front.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput {
    pub current_active: EndpointId,
    pub primary_up: bool,
    pub secondary_up: bool,
    pub down_since: Option<DateTime<Utc>>,
    pub up_since: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
    pub failover_delay: Duration,
    pub failback_delay: Duration,
}

impl DecisionInput {
    /// Time elapsed since `since`, clamped to zero if the clock ran
    /// backwards.
    fn elapsed_since(&self, since: DateTime<Utc>) -> Duration {
        self.now.signed_duration_since(since).to_std().unwrap_or_default()
    }
}

/// Compute the next action for this poll, switching DNS when warranted.
pub async fn decide(dns: &dyn DnsProvider, input: DecisionInput) -> NextAction {
    match input.current_active {
        EndpointId::Primary => decide_serving_primary(dns, input).await,
        EndpointId::Secondary => decide_serving_secondary(dns, input).await,
        EndpointId::None => decide_serving_none(dns, input).await,
    }
}

/// Serving primary: hold while it is up, wait out the failover window while
/// it is down, then flip to the secondary.
async fn decide_serving_primary(dns: &dyn DnsProvider, input: DecisionInput) -> NextAction {
    if input.primary_up {
        return NextAction::None;
    }

    if !input.secondary_up {
        tracing::error!("Both primary and secondary endpoints are down");
        return NextAction::BothServersDown;
    }

    // The tracker stamps down_since before we are called; a missing stamp
    // means this observation set predates any downtime episode.
    let Some(down_since) = input.down_since else {
        return NextAction::None;
    };

    let elapsed = input.elapsed_since(down_since);
    if elapsed < input.failover_delay {
        let remaining = (input.failover_delay - elapsed).as_secs() as i64;
        return NextAction::WaitingForFailover { remaining_secs: remaining };
    }

    tracing::info!(
        "Primary down for {}, switching to secondary",
        humantime::format_duration(Duration::from_secs(elapsed.as_secs()))
    );
    if dns.switch_to(EndpointId::Secondary).await {
        NextAction::SwitchedToSecondary
    } else {
        NextAction::FailedToSwitchToSecondary
    }
}

/// Serving secondary: losing it is reported immediately (no wait policy for
/// an actively-serving endpoint); a recovered primary is adopted back only
/// after the failback window.
async fn decide_serving_secondary(dns: &dyn DnsProvider, input: DecisionInput) -> NextAction {
    if !input.secondary_up {
        if !input.primary_up {
            tracing::error!("Both primary and secondary endpoints are down");
            return NextAction::BothServersDown;
        }
        tracing::error!("Secondary endpoint is down while actively serving");
        return NextAction::SecondaryServerDown;
    }

    if input.primary_up
        && let Some(up_since) = input.up_since
    {
        let elapsed = input.elapsed_since(up_since);
        if elapsed < input.failback_delay {
            let remaining = (input.failback_delay - elapsed).as_secs() as i64;
            return NextAction::WaitingForFailback { remaining_secs: remaining };
        }

        tracing::info!(
            "Primary up for {}, switching back to primary",
            humantime::format_duration(Duration::from_secs(elapsed.as_secs()))
        );
        return if dns.switch_to(EndpointId::Primary).await {
            NextAction::SwitchedToPrimary
        } else {
            NextAction::FailedToSwitchToPrimary
        };
    }

    NextAction::None
}

/// No active endpoint (prior outage or fresh deployment): adopt the primary
/// whenever it is up, otherwise the secondary. No hysteresis applies here -
/// the windows gate moving traffic *off* a serving endpoint, not recovery
/// from an outage.
async fn decide_serving_none(dns: &dyn DnsProvider, input: DecisionInput) -> NextAction {
    if input.primary_up {
        tracing::info!("Primary endpoint available, adopting it from NONE");
        return if dns.switch_to(EndpointId::Primary).await {
            NextAction::SwitchedToPrimary
        } else {
            NextAction::FailedToSwitchToPrimary
        };
    }

    if input.secondary_up {
        tracing::info!("Secondary endpoint available, adopting it from NONE");
        return if dns.switch_to(EndpointId::Secondary).await {
            NextAction::SwitchedToSecondary
        } else {
            NextAction::FailedToSwitchToSecondary
        };
    }

    tracing::error!("Both primary and secondary endpoints are down");
    NextAction::BothServersDown
}
