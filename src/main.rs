mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::AuthService;
use crate::features::auth::{handlers::AuthHandlerState, InMemorySessionStore, TokenService};
use crate::features::files::{routes as files_routes, FileService};
use crate::features::pages::routes as pages_routes;
use crate::features::users::{routes as users_routes, UserService};
use crate::modules::mailer::Mailer;
use crate::modules::storage::S3Client;
use axum::extract::State;
use axum::middleware::from_fn;
use axum::{Json, Router};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn health_check(State(pool): State<PgPool>) -> Json<serde_json::Value> {
    let database = sqlx::query("SELECT 1").execute(&pool).await.is_ok();
    Json(serde_json::json!({
        "status": "ok",
        "database": database,
    }))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Session store with a periodic expiry sweep
    let session_ttl = Duration::from_secs(config.auth.ttl_hours.max(0) as u64 * 3600);
    let session_store = Arc::new(InMemorySessionStore::new(session_ttl));
    InMemorySessionStore::spawn_prune_task(Arc::clone(&session_store));
    tracing::info!("Session store initialized (ttl: {}h)", config.auth.ttl_hours);

    // Token signer for the claims cookie
    let token_service = Arc::new(TokenService::new(
        &config.auth.token_secret,
        config.auth.ttl_hours,
    ));
    tracing::info!("Token service initialized");

    // Mailer for best-effort notifications
    let mailer = Arc::new(Mailer::new(&config.smtp));

    // Object storage client
    let storage = Arc::new(
        S3Client::new(config.s3.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize storage client: {}", e))?,
    );
    tracing::info!("Storage client initialized for bucket: {}", storage.bucket_name());

    // Initialize services
    let user_service = Arc::new(UserService::new(pool.clone()));
    let file_service = Arc::new(FileService::new(
        pool.clone(),
        Arc::clone(&storage),
        Arc::clone(&mailer),
    ));
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_service),
        Arc::clone(&mailer),
    ));
    tracing::info!("Services initialized");

    // Seed the protected system accounts (idempotent)
    user_service
        .seed_system_accounts(&config.bootstrap)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to seed system accounts: {}", e))?;
    tracing::info!("System accounts seeded");

    let auth_state = middleware::AuthState {
        sessions: session_store.clone(),
        tokens: Arc::clone(&token_service),
        cookie_secure: config.app.cookie_secure,
        ttl_hours: config.auth.ttl_hours,
    };

    let auth_handler_state = AuthHandlerState {
        auth: auth_service,
        sessions: session_store,
        tokens: token_service,
        cookie_secure: config.app.cookie_secure,
        ttl_hours: config.auth.ttl_hours,
    };

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require the session/token pair)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(auth_handler_state.clone()))
        .merge(files_routes::page_routes(Arc::clone(&file_service)))
        .merge(files_routes::api_routes(Arc::clone(&file_service)))
        .merge(users_routes::page_routes(
            Arc::clone(&user_service),
            Arc::clone(&file_service),
        ))
        .merge(users_routes::api_routes(
            Arc::clone(&user_service),
            Arc::clone(&file_service),
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::session_auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    let health_route = Router::new()
        .route("/health", axum::routing::get(health_check))
        .with_state(pool.clone());

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(pages_routes::routes())
        .merge(auth_routes::public_routes(auth_handler_state));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
