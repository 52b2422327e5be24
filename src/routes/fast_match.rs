use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::EngineError;
use crate::models::{
    CleanupResponse, ErrorResponse, FastMatchCancelRequest, FastMatchCancelResponse,
    FastMatchRequestResponse, PairActionRequest,
};
use crate::routes::AppState;

/// Configure fast match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/fast-match/request", web::post().to(request))
        .route("/fast-match/accept", web::post().to(accept))
        .route("/fast-match/cancel", web::post().to(cancel))
        .route("/fast-match/cleanup", web::post().to(cleanup));
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Open a fast match request
///
/// POST /api/v1/fast-match/request
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "targetUserId": "string"
/// }
/// ```
async fn request(
    state: web::Data<AppState>,
    req: web::Json<PairActionRequest>,
) -> Result<HttpResponse, EngineError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for fast match request: {:?}", errors);
        return Ok(validation_error(errors));
    }

    let request_id = state
        .fast_match
        .request(&req.user_id, &req.target_user_id)
        .await?;

    Ok(HttpResponse::Ok().json(FastMatchRequestResponse { request_id }))
}

/// Accept a pending fast match request
///
/// POST /api/v1/fast-match/accept
async fn accept(
    state: web::Data<AppState>,
    req: web::Json<PairActionRequest>,
) -> Result<HttpResponse, EngineError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for fast match accept: {:?}", errors);
        return Ok(validation_error(errors));
    }

    let outcome = state
        .fast_match
        .accept(&req.user_id, &req.target_user_id)
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// Cancel or reject a pending fast match request
///
/// POST /api/v1/fast-match/cancel
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "targetUserId": "string",
///   "isRejection": false
/// }
/// ```
async fn cancel(
    state: web::Data<AppState>,
    req: web::Json<FastMatchCancelRequest>,
) -> Result<HttpResponse, EngineError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for fast match cancel: {:?}", errors);
        return Ok(validation_error(errors));
    }

    state
        .fast_match
        .cancel_or_reject(&req.user_id, &req.target_user_id, req.is_rejection)
        .await?;

    Ok(HttpResponse::Ok().json(FastMatchCancelResponse {
        status: "deleted".to_string(),
    }))
}

/// Sweep expired fast match requests on demand
///
/// POST /api/v1/fast-match/cleanup
async fn cleanup(state: web::Data<AppState>) -> Result<HttpResponse, EngineError> {
    let deleted_count = state.fast_match.cleanup_expired().await?;

    Ok(HttpResponse::Ok().json(CleanupResponse { deleted_count }))
}
