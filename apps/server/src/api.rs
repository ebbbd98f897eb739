use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN},
        HeaderValue, Method, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use marketlens_market_data::{HistoricalSeries, Quote, SearchResult};
use serde::{Deserialize, Serialize};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::{error::ApiResult, main_lib::AppState};

const ALLOW_ORIGIN: &str = "*";
const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

pub async fn healthz() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
struct SearchRequest {
    query: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

async fn finance_search(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Json(request) = payload?;
    let results = state
        .market_data
        .search(request.query.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(SearchResponse { results }))
}

#[derive(Deserialize)]
struct QuoteRequest {
    symbol: Option<String>,
}

async fn finance_quote(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<Json<Quote>> {
    let Json(request) = payload?;
    let quote = state
        .market_data
        .quote(request.symbol.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(quote))
}

#[derive(Deserialize)]
struct HistoryRequest {
    symbol: Option<String>,
    period: Option<String>,
}

#[derive(Serialize)]
struct HistoryResponse {
    data: HistoricalSeries,
}

async fn finance_history(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HistoryRequest>, JsonRejection>,
) -> ApiResult<Json<HistoryResponse>> {
    let Json(request) = payload?;
    let data = state
        .market_data
        .history_named(
            request.symbol.as_deref().unwrap_or_default(),
            request.period.as_deref(),
        )
        .await?;
    Ok(Json(HistoryResponse { data }))
}

/// Answer `OPTIONS` on any path with an empty 200.
async fn preflight(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}

pub fn app_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/finance-search", post(finance_search))
        .route("/finance-quote", post(finance_quote))
        .route("/finance-history", post(finance_history));

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(middleware::from_fn(preflight))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
}
