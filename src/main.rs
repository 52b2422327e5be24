use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use tracing::{error, info, warn};

use amora_match::config::Settings;
use amora_match::core::{FastMatchEngine, MatchResolutionEngine};
use amora_match::routes::{self, AppState};
use amora_match::services::{
    AnalyticsSink, CacheManager, HttpUserDirectory, NoopAnalytics, PushGatewayClient,
    RedisAnalytics, UserDirectory,
};
use amora_match::store::{connect_pool, PgFastMatchStore, PgRelationshipStore};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Amora match engine...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize profile cache (optional - directory reads fall through on miss)
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
        Ok(c) => {
            info!("Profile cache initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            Some(Arc::new(c))
        }
        Err(e) => {
            warn!("Failed to connect to Redis ({}), running without profile cache", e);
            None
        }
    };

    // Initialize user directory client
    let directory: Arc<dyn UserDirectory> = Arc::new(HttpUserDirectory::new(
        settings.directory.endpoint.clone(),
        settings.directory.api_key.clone(),
        cache,
    ));

    info!("User directory client initialized");

    // Initialize push gateway client
    let notifier = Arc::new(PushGatewayClient::new(
        settings.push.endpoint.clone(),
        settings.push.server_key.clone(),
    ));

    // Initialize analytics sink (best-effort - degrade to noop without Redis)
    let analytics: Arc<dyn AnalyticsSink> = match RedisAnalytics::new(
        &settings.cache.redis_url,
        settings.analytics.stream_key.clone(),
    )
    .await
    {
        Ok(sink) => {
            info!("Analytics stream initialized ({})", settings.analytics.stream_key);
            Arc::new(sink)
        }
        Err(e) => {
            warn!("Failed to connect analytics stream ({}), events will be dropped", e);
            Arc::new(NoopAnalytics)
        }
    };

    // Initialize PostgreSQL stores
    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let db_min_conn = settings.database.min_connections.unwrap_or(1);

    let pool = connect_pool(&settings.database.url, db_max_conn, db_min_conn)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            panic!("PostgreSQL connection error: {}", e);
        });

    info!("PostgreSQL stores initialized (max: {} connections)", db_max_conn);

    let relationships = Arc::new(PgRelationshipStore::new(pool.clone()));
    let fast_requests = Arc::new(PgFastMatchStore::new(pool));

    // Initialize engines
    let resolution = Arc::new(MatchResolutionEngine::new(
        relationships.clone(),
        directory.clone(),
        notifier.clone(),
        analytics.clone(),
    ));

    let fast_match = Arc::new(FastMatchEngine::new(
        relationships.clone(),
        fast_requests,
        directory,
        notifier,
        analytics,
        chrono::Duration::seconds(settings.fast_match.ttl_secs),
    ));

    info!(
        "Engines initialized (fast match TTL: {}s)",
        settings.fast_match.ttl_secs
    );

    // Periodic expiry sweep; the cleanup endpoint triggers the same pass on demand
    let sweeper = fast_match.clone();
    let sweep_interval = settings.fast_match.sweep_interval_secs;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(sweep_interval));
        loop {
            ticker.tick().await;
            if let Err(e) = sweeper.cleanup_expired().await {
                warn!("Fast match expiry sweep failed: {}", e);
            }
        }
    });

    // Build application state
    let app_state = AppState {
        resolution,
        fast_match,
        relationships,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
