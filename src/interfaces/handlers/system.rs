use actix_web::{get, web, HttpResponse, Responder};
use humantime::format_duration;
use serde::Serialize;
use std::time::Duration;

use crate::{constants::START_TIME, AppState};

#[derive(Serialize)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    version: String,
    session_store: String,
    session_store_status: String,
    database: String,
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now_utc = chrono::Utc::now();
    let uptime_secs = now_utc.signed_duration_since(*START_TIME).num_seconds().max(0) as u64;

    let session_store_status = state.sessions.status().await;
    let database = match &state.contact_repo {
        Some(repo) => match repo.check_connection().await {
            Ok(_) => "OK",
            Err(e) => {
                tracing::warn!("Database health check failed: {}", e);
                "Unavailable"
            }
        },
        None => "Not configured",
    };

    let status = if session_store_status == "OK" { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthCheckResponse {
        status: status.to_string(),
        uptime: format_duration(Duration::from_secs(uptime_secs)).to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        session_store: state.sessions.name().to_string(),
        session_store_status: session_store_status.to_string(),
        database: database.to_string(),
    })
}
