//! Handlers for the monitor control API.
//!
//! Thin layer over [`FailoverMonitor`](crate::monitor::FailoverMonitor):
//! every decision lives in the monitor; handlers only shape requests and
//! responses.

use crate::AppState;
use crate::api::models::monitor::{
    ActiveRequest, ApiResponse, ControlAction, ControlRequest, DnsAnswerResponse, HealthResponse, OverallHealth,
    StatusResponse,
};
use crate::errors::Result;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

/// GET /api/health - coarse liveness derived purely from the daemon flag.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let running = state.monitor.is_running();

    let body = HealthResponse {
        status: if running { OverallHealth::Healthy } else { OverallHealth::Unhealthy },
        timestamp: Utc::now(),
    };

    let code = if running { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR };
    (code, Json(body))
}

/// GET /api/status - read-only snapshot. Health fields are probed live; the
/// decision context is whatever the most recent poll cached. Never decides,
/// never writes DNS.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let monitor = state.monitor.status().await;

    Json(StatusResponse {
        timestamp: Utc::now(),
        monitor,
    })
}

/// POST /api/check - run one full poll cycle on demand instead of waiting
/// for the scheduler.
pub async fn check(State(state): State<AppState>) -> Json<StatusResponse> {
    let monitor = state.monitor.poll().await;

    Json(StatusResponse {
        timestamp: Utc::now(),
        monitor,
    })
}

/// POST /api/control - start or stop the daemon.
pub async fn control(State(state): State<AppState>, Json(request): Json<ControlRequest>) -> Result<Json<ApiResponse>> {
    let message = match request.action {
        ControlAction::Start => state.monitor.start().await?,
        ControlAction::Stop => state.monitor.stop().await?,
    };

    Ok(Json(ApiResponse::ok(message)))
}

/// POST /api/active - manually switch the DNS record to a specific endpoint.
pub async fn active(State(state): State<AppState>, Json(request): Json<ActiveRequest>) -> Result<Json<ApiResponse>> {
    let message = state.monitor.manual_switch(request.active).await?;

    Ok(Json(ApiResponse::ok(message)))
}

/// POST /api/reset - administrative state reset.
pub async fn reset(State(state): State<AppState>) -> Json<ApiResponse> {
    state.monitor.reset_state();

    Json(ApiResponse::ok("Monitor state reset"))
}

/// GET /api/dns - raw current answer of the managed record.
pub async fn dns_answer(State(state): State<AppState>) -> Json<DnsAnswerResponse> {
    Json(DnsAnswerResponse {
        answer: state.monitor.current_answer().await,
    })
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::dns::DnsProvider;
    use crate::probe::HealthProbe;
    use crate::types::EndpointId;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;

    /// Probe double: everything is reachable.
    struct AlwaysUpProbe;

    #[async_trait]
    impl HealthProbe for AlwaysUpProbe {
        async fn probe(&self, _host: &str, _port: u16, _timeout: Duration) -> bool {
            true
        }
    }

    /// DNS double pinned to one detected answer; accepts switches.
    struct StaticDns {
        active: EndpointId,
        answer: Option<&'static str>,
    }

    #[async_trait]
    impl DnsProvider for StaticDns {
        async fn detect_active(&self) -> EndpointId {
            self.active
        }

        async fn switch_to(&self, _endpoint: EndpointId) -> bool {
            true
        }

        async fn current_answer(&self) -> Option<String> {
            self.answer.map(|s| s.to_string())
        }
    }

    fn test_server(active: EndpointId) -> TestServer {
        let app = crate::Application::with_collaborators(
            Config::default(),
            Arc::new(AlwaysUpProbe),
            Arc::new(StaticDns {
                active,
                answer: Some("203.0.113.10"),
            }),
        );
        app.into_test_server()
    }

    #[tokio::test]
    async fn health_reflects_daemon_state() {
        let server = test_server(EndpointId::Primary);

        let response = server.get("/api/health").await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], json!("HEALTHY"));

        server
            .post("/api/control")
            .json(&json!({"action": "STOP"}))
            .await
            .assert_status(StatusCode::OK);

        let response = server.get("/api/health").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["status"], json!("UNHEALTHY"));
    }

    #[tokio::test]
    async fn status_returns_the_full_snapshot_shape() {
        let server = test_server(EndpointId::Primary);

        let response = server.get("/api/status").await;
        response.assert_status(StatusCode::OK);

        let body: Value = response.json();
        let monitor = &body["monitor"];
        assert_eq!(monitor["daemon_status"], json!("RUNNING"));
        assert_eq!(monitor["current_active"], json!("PRIMARY"));
        assert_eq!(monitor["primary_status"], json!("UP"));
        assert_eq!(monitor["secondary_status"], json!("UP"));
        assert_eq!(monitor["next_action"], json!("none"));
        assert_eq!(monitor["primary_down_since"], Value::Null);
        assert!(monitor["last_check"].is_string());
        assert!(monitor["config"]["primary"]["name"].is_string());
        assert!(monitor["config"]["secondary"]["port"].is_number());
    }

    #[tokio::test]
    async fn check_runs_a_poll_and_reports_the_decision() {
        let server = test_server(EndpointId::Primary);

        let response = server.post("/api/check").await;
        response.assert_status(StatusCode::OK);

        let body: Value = response.json();
        assert_eq!(body["monitor"]["next_action"], json!("none"));
    }

    #[tokio::test]
    async fn control_rejects_double_start() {
        let server = test_server(EndpointId::Primary);

        let response = server.post("/api/control").json(&json!({"action": "START"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Monitor is already running"));
    }

    #[tokio::test]
    async fn control_stop_then_start_round_trips() {
        let server = test_server(EndpointId::Primary);

        let response = server.post("/api/control").json(&json!({"action": "STOP"})).await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(true));

        let response = server.post("/api/control").json(&json!({"action": "START"})).await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn active_rejects_switching_to_none() {
        let server = test_server(EndpointId::Primary);

        let response = server.post("/api/active").json(&json!({"active": "NONE"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["message"], json!("Cannot manually switch to NONE. Use specific server type."));
    }

    #[tokio::test]
    async fn active_rejects_the_current_endpoint_and_accepts_the_other() {
        let server = test_server(EndpointId::Primary);

        let response = server.post("/api/active").json(&json!({"active": "PRIMARY"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], json!("Already using primary server"));

        let response = server.post("/api/active").json(&json!({"active": "SECONDARY"})).await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("Successfully switched to secondary server"));
    }

    #[tokio::test]
    async fn reset_reasserts_running() {
        let server = test_server(EndpointId::Primary);

        server
            .post("/api/control")
            .json(&json!({"action": "STOP"}))
            .await
            .assert_status(StatusCode::OK);

        let response = server.post("/api/reset").await;
        response.assert_status(StatusCode::OK);

        let response = server.get("/api/health").await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn dns_endpoint_exposes_the_raw_answer() {
        let server = test_server(EndpointId::Primary);

        let response = server.get("/api/dns").await;
        response.assert_status(StatusCode::OK);

        let body: Value = response.json();
        assert_eq!(body["answer"], json!("203.0.113.10"));
    }
}
