//! User Service API 서버 진입점.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    middleware,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use user_api::{
    metrics_layer,
    openapi::swagger_ui_router,
    routes::create_api_router,
    setup_metrics_recorder,
    AppState, IdentityService, InMemoryCredentialStore, PasswordHasher, PgCredentialStore,
    RateLimitConfig, RateLimitState, TokenIssuer, TokenValidator,
};
use user_core::{init_logging, AppConfig, CredentialStore, LogConfig, ServerConfig};

/// CORS 레이어 생성.
///
/// `server.cors_origins`가 비어 있으면 모든 origin을 허용합니다 (개발 모드).
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let restricted = !origins.is_empty();
    let allow_origin = if restricted {
        info!("CORS configured with {} allowed origins", origins.len());
        AllowOrigin::list(origins)
    } else {
        warn!("No valid CORS origins configured, allowing any origin (development mode)");
        AllowOrigin::any()
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        // 자격 증명 포함은 origin 목록이 지정된 경우에만
        .allow_credentials(restricted)
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 자격증명 저장소 생성.
///
/// 데이터베이스 URL이 설정되어 있으면 PostgreSQL, 아니면 메모리 저장소를 사용합니다.
async fn create_store(
    config: &AppConfig,
) -> Result<(Arc<dyn CredentialStore>, Option<sqlx::PgPool>), Box<dyn std::error::Error>> {
    let Some(database_url) = config.database.url.as_deref() else {
        warn!("database.url not set, using in-memory credential store (development only)");
        return Ok((Arc::new(InMemoryCredentialStore::new()), None));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .connect(database_url)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Connected to PostgreSQL, migrations applied");

    Ok((Arc::new(PgCredentialStore::new(pool.clone())), Some(pool)))
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    config: &AppConfig,
    metrics_handle: PrometheusHandle,
    rate_limit: Option<RateLimitState>,
) -> Router {
    // 메트릭 라우터 (별도 상태, Rate Limit 제외)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let api_router = create_api_router(rate_limit).with_state(state);

    Router::new()
        .merge(metrics_router)
        .merge(api_router)
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        // 메트릭 미들웨어 (모든 요청에 적용)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_secs),
        ))
        .layer(cors_layer(&config.server))
}

/// 오래된 Rate Limit 버킷을 주기적으로 정리.
fn spawn_rate_limit_cleanup(rate_limit: RateLimitState, shutdown_token: CancellationToken) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(rate_limit.limiter().cleanup_interval());
        loop {
            tokio::select! {
                _ = shutdown_token.cancelled() => break,
                _ = interval.tick() => rate_limit.limiter().cleanup().await,
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // 설정 로드 (로깅 초기화 전이므로 stderr 출력)
    let config = AppConfig::load_default().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        e
    })?;

    init_logging(LogConfig::from_settings(&config.logging))?;

    info!("Starting User Service API server...");

    // 서명 설정이 유효하지 않으면 시작하지 않음
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration. Set USERSVC__JWT__SECRET (>= 32 bytes).");
        return Err(e.into());
    }

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            error!(
                host = %config.server.host,
                port = config.server.port,
                error = %e,
                "소켓 주소 설정이 유효하지 않습니다. USERSVC__SERVER__HOST, USERSVC__SERVER__PORT를 확인하세요."
            );
            e
        })?;

    let hasher = PasswordHasher::new(&config.password)?;
    let issuer = TokenIssuer::new(&config.jwt)?;
    let validator = TokenValidator::new(&config.jwt)?;

    let (store, db_pool) = create_store(&config).await?;
    let identity = IdentityService::new(store, hasher, Arc::new(issuer));

    let mut state = AppState::new(identity, Arc::new(validator));
    if let Some(pool) = db_pool {
        state = state.with_db_pool(pool);
    }
    let state = Arc::new(state);

    info!(
        version = %state.version,
        has_db = state.db_pool.is_some(),
        token_lifetime_secs = config.jwt.token_lifetime_secs,
        "Application state initialized"
    );

    // 전역 종료 토큰 (백그라운드 태스크 종료 전파용)
    let shutdown_token = CancellationToken::new();

    let rate_limit = if config.rate_limit.enabled {
        info!(
            requests_per_minute = config.rate_limit.requests_per_minute,
            burst_size = config.rate_limit.burst_size,
            "Rate limiting configured for register/authenticate"
        );
        let rate_limit_state = RateLimitState::new(RateLimitConfig::from(&config.rate_limit));
        spawn_rate_limit_cleanup(rate_limit_state.clone(), shutdown_token.clone());
        Some(rate_limit_state)
    } else {
        warn!("Rate limiting DISABLED");
        None
    };

    let app = create_router(state, &config, metrics_handle, rate_limit);

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
    .await?;

    shutdown_token.cancel();
    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
