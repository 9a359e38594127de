use crate::bridge::relay;
use crate::service::{ChatBackend, ChatRequest, MapChatService, NewsSearchService};
use crate::workflow::config::{RelayConfig, AIS_KEY_ENV};
use log::{error, warn};
use navmapcore::ais::Subscription;
use navmapcore::news::NewsQuery;
use navmapcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reply::{self, Reply, Response};
use warp::ws::Ws;
use warp::{Filter, Rejection};

const CORS_HEADERS: [&str; 4] = ["authorization", "x-client-info", "apikey", "content-type"];

/// Shared state behind every route.
pub struct GatewayState<B> {
    pub relay: RelayConfig,
    pub chat: MapChatService<B>,
    pub news: NewsSearchService<B>,
    pub metrics: Arc<MetricsRecorder>,
}

impl<B: ChatBackend> GatewayState<B> {
    pub fn new(relay: RelayConfig, backend: Arc<B>) -> Self {
        let news = NewsSearchService::new(backend.clone(), relay.bounding_box);
        Self {
            relay,
            chat: MapChatService::new(backend),
            news,
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    #[serde(flatten)]
    metrics: MetricsSnapshot,
}

/// All gateway routes with CORS applied.
pub fn routes<B>(
    state: Arc<GatewayState<B>>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone
where
    B: ChatBackend + 'static,
{
    let with_state = warp::any().map(move || state.clone());

    let upgrade = warp::ws().map(Some).or(warp::any().map(|| None)).unify();
    let ais_stream = warp::path("ais-stream")
        .and(warp::path::end())
        .and(upgrade)
        .and(with_state.clone())
        .map(|upgrade: Option<Ws>, state: Arc<GatewayState<B>>| {
            ais_stream_reply(upgrade, &state)
        });

    let chat = warp::path("map-ai-chat")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state.clone())
        .and_then(handle_chat::<B>);

    let news = warp::path("search-news-events")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state.clone())
        .and_then(handle_news::<B>);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state)
        .map(|state: Arc<GatewayState<B>>| {
            reply::json(&Health {
                status: "ok",
                metrics: state.metrics.snapshot(),
            })
        });

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(CORS_HEADERS)
        .allow_methods(["GET", "POST", "OPTIONS"]);

    ais_stream
        .or(chat)
        .or(news)
        .or(health)
        .recover(handle_rejection)
        .with(cors)
}

fn ais_stream_reply<B: ChatBackend>(upgrade: Option<Ws>, state: &GatewayState<B>) -> Response {
    let Some(ws) = upgrade else {
        return reply::with_status("Expected WebSocket connection", StatusCode::BAD_REQUEST)
            .into_response();
    };
    let Some(api_key) = state.relay.api_key.clone() else {
        error!("{} is not set", AIS_KEY_ENV);
        return reply::with_status(
            "Server configuration error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .into_response();
    };

    let endpoint = state.relay.upstream_endpoint(&api_key);
    let subscription = Subscription::new(api_key, &state.relay.bounding_box);
    let metrics = state.metrics.clone();
    ws.on_upgrade(move |socket| async move {
        relay::run_session(socket, endpoint, subscription, metrics).await;
    })
    .into_response()
}

async fn handle_chat<B: ChatBackend>(
    request: ChatRequest,
    state: Arc<GatewayState<B>>,
) -> Result<Response, Rejection> {
    match state.chat.respond(&request).await {
        Ok(command) => Ok(reply::json(&command).into_response()),
        Err(err) => {
            warn!("map-ai-chat failed: {}", err);
            Ok(err.into_response())
        }
    }
}

async fn handle_news<B: ChatBackend>(
    query: NewsQuery,
    state: Arc<GatewayState<B>>,
) -> Result<Response, Rejection> {
    match state.news.search(&query).await {
        Ok(report) => Ok(reply::json(&report).into_response()),
        Err(err) => {
            warn!("search-news-events failed: {}", err);
            Ok(err.into_response())
        }
    }
}

async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(err) = rejection.find::<BodyDeserializeError>() {
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        warn!("unhandled rejection: {:?}", rejection);
        (StatusCode::INTERNAL_SERVER_ERROR, "Unknown error".to_string())
    };
    Ok(reply::with_status(reply::json(&json!({ "error": message })), status).into_response())
}
