use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::EngineError;
use crate::models::{ErrorResponse, HealthResponse, PairActionRequest};
use crate::routes::AppState;

/// Configure like/dislike routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/like", web::post().to(like))
        .route("/matches/dislike", web::post().to(dislike));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.relationships.health_check().await.unwrap_or(false);
    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Like endpoint
///
/// POST /api/v1/matches/like
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "targetUserId": "string"
/// }
/// ```
async fn like(
    state: web::Data<AppState>,
    req: web::Json<PairActionRequest>,
) -> Result<HttpResponse, EngineError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for like request: {:?}", errors);
        return Ok(validation_error(errors));
    }

    tracing::info!("Like: {} -> {}", req.user_id, req.target_user_id);

    let outcome = state
        .resolution
        .like(&req.user_id, &req.target_user_id)
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// Dislike endpoint
///
/// POST /api/v1/matches/dislike
async fn dislike(
    state: web::Data<AppState>,
    req: web::Json<PairActionRequest>,
) -> Result<HttpResponse, EngineError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for dislike request: {:?}", errors);
        return Ok(validation_error(errors));
    }

    tracing::info!("Dislike: {} -> {}", req.user_id, req.target_user_id);

    let outcome = state
        .resolution
        .dislike(&req.user_id, &req.target_user_id)
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}
