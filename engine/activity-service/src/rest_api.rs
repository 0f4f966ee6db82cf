//! REST API endpoints for repository activity
//!
//! Routes:
//! - `POST /api/update`  fetch new events for a list of repositories and store them
//! - `GET  /api/events`  stored events inside a time window
//! - `GET  /api/avgtime` average seconds between events per type and repository
//! - `POST /api/fetch`   fetch events without storing them
//! - `GET  /health`

use crate::updater::{EventUpdater, UpdateError, UpdateSummary};
use activity_events::{
    average_interval, filter_recent, Event, DEFAULT_MAX_EVENTS, DEFAULT_WINDOW_DAYS,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, error, warn};
use warp::http::StatusCode;
use warp::Filter;

/// Message for requests without a repository list
pub const NO_REPOSITORIES_MESSAGE: &str = "No repositories provided in the request";

/// Message for a successful fetch
pub const FETCH_MESSAGE: &str = "Events fetched successfully.";

/// Largest accepted request body
const MAX_BODY_BYTES: u64 = 64 * 1024;

/// Plain message response, used for errors
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Body of `POST /api/update`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RepositoriesRequest {
    #[serde(default)]
    pub repositories: Vec<String>,
}

/// Body of `POST /api/fetch`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub repositories: Vec<String>,
    pub per_page: Option<u32>,
}

/// Query parameters of `GET /api/events`
#[derive(Debug, Serialize, Deserialize)]
pub struct EventsQuery {
    #[serde(default = "default_days")]
    pub days: i64,
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

fn default_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}

fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

impl Default for EventsQuery {
    fn default() -> Self {
        Self { days: DEFAULT_WINDOW_DAYS, max_events: DEFAULT_MAX_EVENTS }
    }
}

/// Response of `POST /api/fetch`
#[derive(Debug, Serialize, Deserialize)]
pub struct FetchResponse {
    pub message: String,
    pub repositories: Vec<String>,
    pub event_count: usize,
    pub events: Vec<Event>,
}

fn json_with_status<T: Serialize>(
    body: &T,
    status: StatusCode,
) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(body), status)
}

/// Fetch events newer than the newest stored one and merge them into the store
pub async fn update_events(
    request: RepositoriesRequest,
    updater: Arc<EventUpdater>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if request.repositories.is_empty() {
        let body = MessageResponse::new(NO_REPOSITORIES_MESSAGE);
        return Ok(json_with_status(&body, StatusCode::BAD_REQUEST));
    }

    match updater.update_from_store(&request.repositories).await {
        Ok(summary) => Ok(json_with_status(&summary, StatusCode::OK)),
        Err(UpdateError::InvalidRepository(e)) => {
            warn!("Rejected update request: {}", e);
            Ok(json_with_status(&UpdateSummary::rejected(e.to_string()), StatusCode::BAD_REQUEST))
        }
        Err(e) => {
            error!("Update request failed: {}", e);
            let body = MessageResponse::new(e.to_string());
            Ok(json_with_status(&body, StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

/// Stored events inside the requested window
pub async fn list_events(
    query: EventsQuery,
    updater: Arc<EventUpdater>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let events = updater.store().load().await;
    let recent = filter_recent(events, query.days, query.max_events);
    debug!(
        "Returning {} events for days={} max_events={}",
        recent.len(),
        query.days,
        query.max_events
    );

    Ok(warp::reply::json(&recent))
}

/// Average seconds between consecutive events per `"Type - owner/repo"`
pub async fn average_time(updater: Arc<EventUpdater>) -> Result<impl warp::Reply, warp::Rejection> {
    let events = updater.store().load().await;
    Ok(warp::reply::json(&average_interval(&events)))
}

/// Fetch events for the given repositories without storing them
pub async fn fetch_events(
    request: FetchRequest,
    updater: Arc<EventUpdater>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if request.repositories.is_empty() {
        let body = MessageResponse::new(NO_REPOSITORIES_MESSAGE);
        return Ok(json_with_status(&body, StatusCode::BAD_REQUEST));
    }

    let per_page = request.per_page.unwrap_or(updater.per_page());
    match updater.fetch(&request.repositories, per_page).await {
        Ok(events) => {
            let response = FetchResponse {
                message: FETCH_MESSAGE.to_string(),
                repositories: request.repositories,
                event_count: events.len(),
                events,
            };
            Ok(json_with_status(&response, StatusCode::OK))
        }
        Err(e) => {
            error!("Fetch request failed: {}", e);
            Ok(json_with_status(
                &MessageResponse::new(format!("Error fetching events: {e}")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

/// Turn rejections into JSON `{message}` responses
pub async fn handle_rejection(err: warp::Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(e) = err.find::<warp::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {e}"))
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length required".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected a JSON body".to_string())
    } else if let Some(e) = err.find::<warp::cors::CorsForbidden>() {
        (StatusCode::FORBIDDEN, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
    };

    Ok(json_with_status(&MessageResponse { message }, status))
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// Build every route with CORS and rejection handling applied
pub fn create_routes(
    updater: Arc<EventUpdater>,
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    let updater_filter = warp::any().map(move || updater.clone());

    // Update endpoint
    let update = warp::path!("api" / "update")
        .and(warp::post())
        .and(json_body::<RepositoriesRequest>())
        .and(updater_filter.clone())
        .and_then(update_events);

    // Stored events endpoint
    let events = warp::path!("api" / "events")
        .and(warp::get())
        .and(warp::query::<EventsQuery>())
        .and(updater_filter.clone())
        .and_then(list_events);

    // Average interval endpoint
    let avgtime = warp::path!("api" / "avgtime")
        .and(warp::get())
        .and(updater_filter.clone())
        .and_then(average_time);

    // Fetch-only endpoint
    let fetch = warp::path!("api" / "fetch")
        .and(warp::post())
        .and(json_body::<FetchRequest>())
        .and(updater_filter)
        .and_then(fetch_events);

    // Health check endpoint
    let health = warp::path("health").and(warp::path::end()).and(warp::get()).map(|| {
        warp::reply::json(&serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    });

    update
        .or(events)
        .or(avgtime)
        .or(fetch)
        .or(health)
        .with(
            warp::cors()
                .allow_any_origin()
                .allow_headers(vec!["content-type"])
                .allow_methods(vec!["GET", "POST", "OPTIONS"]),
        )
        .recover(handle_rejection)
}
