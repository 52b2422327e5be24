// Route exports
pub mod fast_match;
pub mod matches;

use std::sync::Arc;

use actix_web::web;

use crate::core::{FastMatchEngine, MatchResolutionEngine};
use crate::store::PgRelationshipStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub resolution: Arc<MatchResolutionEngine>,
    pub fast_match: Arc<FastMatchEngine>,
    pub relationships: Arc<PgRelationshipStore>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(fast_match::configure),
    );
}
