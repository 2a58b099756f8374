use crate::config::{Direction, ServerConfig};
use crate::error::Result;
use axum::http::StatusCode;
use axum::{response::IntoResponse, routing::get, Router};
use futures::FutureExt;
use story_app::state::{AppConfig, AppState};
use story_comments::CommentClient;
use story_dal::Pool;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if !args.no_cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(feature = "openapi")]
fn api_docs() -> utoipa::openapi::OpenApi {
    #[derive(utoipa::OpenApi)]
    #[openapi(info(title = "Story Service"))]
    struct OpenApi;

    use utoipa::OpenApi as _;
    OpenApi::openapi()
        .nest("/v1/stories", story_app::rest_api::story::api_docs())
        .nest("/v1/categories", story_app::rest_api::category::api_docs())
}

pub fn main_router(state: AppState) -> Router<()> {
    #[allow(unused_mut)]
    let mut router = story_app::rest_api::api_router()
        .with_state(state)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http());

    #[cfg(feature = "openapi")]
    {
        let docs = api_docs();
        router = router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs),
        );
    }
    router
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn open_pool(config: &ServerConfig) -> Result<Pool> {
    if config.uses_data_dir() {
        let data_dir = config.data_dir();
        if !data_dir.is_dir() {
            tokio::fs::create_dir_all(&data_dir).await?;
            info!("Created data directory {}", data_dir.display());
        }
    }
    Ok(story_dal::new_pool(&config.database_url()).await?)
}

/// Runs migrations in given direction, returns number of migrations processed
pub async fn migrate(config: &ServerConfig, direction: Direction, step: usize) -> Result<usize> {
    let pool = open_pool(config).await?;
    let processed = story_dal::migrate_steps(&pool, direction.into(), step).await?;
    info!("Successfully processed {processed} migrations ({direction:?})");
    pool.close().await;
    Ok(processed)
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let app_config: AppConfig = config.into();

    let pool = open_pool(config).await?;
    if config.no_migrate {
        debug!("Skipping database migrations");
    } else {
        story_dal::migrate(&pool).await?;
        debug!("Database migrated");
    }

    let comments = CommentClient::new(&config.comment_service_url, config.comment_timeout)?;
    Ok(AppState::new(app_config, pool, comments))
}
