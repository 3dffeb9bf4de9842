use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use cinerec::{init_tracing, AppError, AppState, Config};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "cinerec-server")]
struct Args {
    /// Path to a config file; defaults apply when omitted.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PopularQuery {
    top_n: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }
}

async fn health_check() -> Json<ApiResponse<HashMap<String, String>>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "cinerec".to_string());
    status.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());

    Json(ApiResponse::success(status))
}

async fn list_titles(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(
        state.recommendation_service.titles(),
    ))
}

async fn get_popular(
    State(state): State<AppState>,
    Query(params): Query<PopularQuery>,
) -> Json<ApiResponse<Vec<cinerec::PopularityStat>>> {
    Json(ApiResponse::success(
        state.recommendation_service.popular(params.top_n),
    ))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Json(request): Json<cinerec::RecommendationRequest>,
) -> Result<Json<ApiResponse<cinerec::RecommendationResponse>>, AppError> {
    let response = state.recommendation_service.recommend(&request).await?;
    Ok(Json(ApiResponse::success(response)))
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/titles", get(list_titles))
        .route("/popular", get(get_popular))
        .route("/recommendations", post(get_recommendations))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().await;

    let args = Args::parse();
    let config = match args.config.as_deref() {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    info!("Starting cinerec server with config: {:?}", config.server);

    let state = AppState::new(config)?;

    // Build the derived tables up front so the first request is cheap.
    state.recommendation_service.warm().await?;

    let addr = state.config.server.socket_addr();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
