use std::sync::Arc;

use actix_web::{error, get, middleware, web, App, HttpRequest, HttpResponse, HttpServer, Responder};

use crate::api::{self, ApiError};
use crate::crypto::TokenCrypto;
use crate::db::PgPool;
use crate::observability::metrics::Metrics;
use crate::services::query_cache::QueryCache;

pub struct AppState {
    pub pool: PgPool,
    pub crypto: TokenCrypto,
    pub metrics: Arc<Metrics>,
    pub cache: QueryCache,
    pub tool_webhook_base_url: String,
}

pub(crate) fn count_rejection(req: &HttpRequest) {
    if let Some(state) = req.app_data::<web::Data<AppState>>() {
        state.metrics.increment_rejected();
    }
}

fn query_error_handler(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    count_rejection(req);
    ApiError::BadRequest {
        field: "query".to_string(),
        message: err.to_string(),
    }
    .into()
}

/// Routes plus extractor settings, shared by the server and handler tests.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(health)
        .service(metrics)
        .configure(api::configure);
}

pub async fn run_http_server(state: web::Data<AppState>, port: u16) -> std::io::Result<()> {
    tracing::info!("Starting HTTP server on port {}", port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_app)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[get("/health")]
async fn health() -> impl Responder {
    tracing::debug!("Health check");
    "I'm ok"
}

#[get("/metrics")]
async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.metrics.snapshot())
}
