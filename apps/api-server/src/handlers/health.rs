//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{AppState, Storage};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// `in-memory`, `connected` or `unreachable`.
    pub database: &'static str,
}

async fn database_status(storage: &Storage) -> &'static str {
    match storage {
        Storage::InMemory => "in-memory",
        #[cfg(feature = "postgres")]
        Storage::Postgres(connections) => match connections.ping().await {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "Health check could not reach the database");
                "unreachable"
            }
        },
    }
}

/// Health check endpoint - returns server status.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, description = "Server is up", body = HealthResponse))
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: database_status(&state.storage).await,
    };

    HttpResponse::Ok().json(response)
}
