use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{
    parse_platform, required_user, ApiRecommendationQuery, ApiRecommendationResponse,
    ApiReportRequest, ApiSeedRequest, ApiSeedResponse,
};
use crate::Backend;
use engagement_engine::calendar::upcoming_slots;
use engagement_engine::seed::{generate_sample_audience, generate_sample_posts};
use engagement_engine::store::FileStore;
use engagement_engine::{ReportAssembler, ReportOutcome};

const DEFAULT_UPCOMING: usize = 5;

#[derive(Clone)]
struct AppState {
    assembler: Arc<ReportAssembler>,
    store: Option<Arc<FileStore>>,
}

pub async fn serve(args: crate::ServeArgs, backend: Backend) -> Result<(), String> {
    let state = AppState {
        assembler: backend.assembler,
        store: backend.store,
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/report", post(report_handler))
        .route("/api/recommendations", get(recommendations_handler))
        .route("/api/seed", post(seed_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    info!(%addr, "analytics server listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        format!("failed to bind server: {}", err)
    })?, app)
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn report_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiReportRequest>,
) -> Result<Json<ReportOutcome>, (StatusCode, String)> {
    let request = request
        .into_request(Utc::now())
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let outcome = state
        .assembler
        .generate_report(&request)
        .await
        .map_err(|err| (StatusCode::BAD_GATEWAY, err.to_string()))?;
    Ok(Json(outcome))
}

async fn recommendations_handler(
    State(state): State<AppState>,
    Query(query): Query<ApiRecommendationQuery>,
) -> Result<Json<ApiRecommendationResponse>, (StatusCode, String)> {
    let user_id = required_user(query.user_id).map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let platform =
        parse_platform(query.platform.as_deref()).map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let recommendations = state
        .assembler
        .recommend(&user_id, platform)
        .await
        .map_err(|err| (StatusCode::BAD_GATEWAY, err.to_string()))?;
    let upcoming = upcoming_slots(
        &recommendations,
        Utc::now(),
        state.assembler.timezone(),
        query.upcoming.unwrap_or(DEFAULT_UPCOMING),
    );
    Ok(Json(ApiRecommendationResponse {
        recommendations,
        upcoming,
    }))
}

async fn seed_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiSeedRequest>,
) -> Result<Json<ApiSeedResponse>, (StatusCode, String)> {
    let store = state.store.as_ref().ok_or_else(|| {
        (
            StatusCode::NOT_IMPLEMENTED,
            "sample data can only be seeded into the file store".to_string(),
        )
    })?;
    let user_id = required_user(request.user_id).map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let seed = request.seed.unwrap_or(42);
    let now = Utc::now();
    let posts = store
        .replace_user_data(
            &user_id,
            generate_sample_posts(&user_id, now, seed),
            generate_sample_audience(&user_id, now, seed),
        )
        .await
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err))?;
    info!(user_id = %user_id, posts, "sample data seeded");
    Ok(Json(ApiSeedResponse { user_id, posts }))
}
