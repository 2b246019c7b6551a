//! # failoverd: DNS-steered failover monitor
//!
//! `failoverd` watches a primary/secondary pair of network endpoints and
//! steers client traffic between them by rewriting a single DNS record.
//! Clients resolve one hostname; this daemon decides which endpoint's
//! address that hostname currently answers with.
//!
//! ## Overview
//!
//! A pair of redundant servers behind one hostname needs an arbiter: when
//! the primary stops answering, something has to notice, wait long enough to
//! rule out a blip, point the DNS record at the secondary, and later move
//! traffic back once the primary has proven itself stable again. Doing this
//! by hand means 3am pages; doing it naively (flip on the first failed
//! probe) means flapping. `failoverd` is that arbiter, with hysteresis on
//! both directions of the flip.
//!
//! ### What It Does
//!
//! On every poll the monitor reads the DNS record to learn which endpoint is
//! currently active (the record is the source of truth - there is no
//! internal "active" variable to drift out of sync), TCP-probes both
//! endpoints, and feeds the observations through a decision engine:
//!
//! - Primary serving and healthy: hold.
//! - Primary down past the failover window with a healthy secondary: rewrite
//!   the record to the secondary.
//! - Secondary serving while the primary has been back up past the failback
//!   window: rewrite the record back.
//! - Record pointing at neither endpoint (prior outage, fresh deployment):
//!   adopt whichever endpoint is up, preferring the primary, with no wait.
//! - Both endpoints down: report the outage and keep polling.
//!
//! Every outcome is published as the snapshot's `next_action` - the primary
//! operator-facing status channel - including "waiting" states with the
//! seconds left in their window.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum); the monitor
//! core keeps its mutable state in independent atomic cells (an
//! [`arc_swap`]-based tracker plus a daemon flag), so the scheduled poll,
//! dashboard reads and operator actions never serialize behind one lock.
//! External collaborators sit behind seams: [`probe::HealthProbe`] for TCP
//! reachability and [`dns::DnsProvider`] for the record read/rewrite API.
//! Both are total - transient remote failures normalize to "down" / "no
//! answer" rather than surfacing as errors.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use failoverd::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = failoverd::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Initialize structured logging
//!     failoverd::telemetry::init_telemetry()?;
//!
//!     // Create and start the application
//!     let app = Application::new(config)?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod dns;
pub mod errors;
pub mod monitor;
pub mod probe;
pub mod telemetry;
pub mod types;

pub use config::Config;

use crate::dns::{DnsProvider, NameComDnsClient};
use crate::monitor::FailoverMonitor;
use crate::probe::{HealthProbe, TcpHealthProbe};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub monitor: Arc<FailoverMonitor>,
}

/// Build the API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(api::handlers::monitor::health))
        .route("/api/status", get(api::handlers::monitor::status))
        .route("/api/check", post(api::handlers::monitor::check))
        .route("/api/control", post(api::handlers::monitor::control))
        .route("/api/active", post(api::handlers::monitor::active))
        .route("/api/reset", post(api::handlers::monitor::reset))
        .route("/api/dns", get(api::handlers::monitor::dns_answer))
        // The dashboard is served from a different origin in development
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The assembled application: monitor core, router and poll scheduler.
pub struct Application {
    config: Config,
    router: Router,
    monitor: Arc<FailoverMonitor>,
}

impl Application {
    /// Wire the application with its production collaborators.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let probe: Arc<dyn HealthProbe> = Arc::new(TcpHealthProbe);
        let dns: Arc<dyn DnsProvider> = Arc::new(NameComDnsClient::new(&config)?);
        Ok(Self::with_collaborators(config, probe, dns))
    }

    /// Assemble the application around explicit collaborators. Tests inject
    /// probe/DNS doubles here.
    pub fn with_collaborators(config: Config, probe: Arc<dyn HealthProbe>, dns: Arc<dyn DnsProvider>) -> Self {
        let monitor = Arc::new(FailoverMonitor::new(config.clone(), probe, dns));
        let state = AppState {
            config: config.clone(),
            monitor: monitor.clone(),
        };

        Self {
            router: router(state),
            config,
            monitor,
        }
    }

    /// Serve HTTP and run the poll scheduler until `shutdown` resolves.
    pub async fn serve(self, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
        let scheduler = tokio::spawn(run_scheduler(self.monitor.clone(), self.config.timing.check_interval));

        let listener = TcpListener::bind(self.config.bind_address()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        scheduler.abort();
        Ok(())
    }

    /// Convert to an in-process test server (no socket, no scheduler).
    #[cfg(test)]
    pub(crate) fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }
}

/// Drive `poll()` at the configured cadence while the daemon is running.
///
/// Ticks are skipped, not bunched, if a poll overruns the interval; a
/// stopped daemon keeps ticking cheaply so `start()` takes effect without
/// respawning anything.
async fn run_scheduler(monitor: Arc<FailoverMonitor>, period: Duration) {
    tracing::info!("Starting poll scheduler (every {})", humantime::format_duration(period));

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        if monitor.is_running() {
            monitor.poll().await;
        }
    }
}
