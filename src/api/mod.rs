//! REST/JSON API over the lifecycle engine
//!
//! The acting user is taken from the `X-Actor-Id` and `X-Actor-Role`
//! headers on every request. Verifying those headers is the job of
//! whatever sits in front of this server.
//!
//! | Method | Path                              | Operation                   |
//! |--------|-----------------------------------|-----------------------------|
//! | POST   | `/api/tickets`                    | file a ticket               |
//! | GET    | `/api/tickets/tickets`            | list within caller's scope  |
//! | GET    | `/api/tickets/admin`              | list all (administrators)   |
//! | GET    | `/api/tickets/stats`              | dashboard counts            |
//! | GET    | `/api/tickets/:id`                | view (admins begin handling)|
//! | POST   | `/api/tickets/:id/handle`         | begin handling              |
//! | GET    | `/api/tickets/:id/comments`       | comment log                 |
//! | POST   | `/api/tickets/:id/comments`       | add a comment               |
//! | POST   | `/api/tickets/:id/resolve`        | resolve with a comment      |
//! | POST   | `/api/tickets/:id/reopen`         | reopen (`confirm: true`)    |

use crate::core::{Actor, Priority, Role, Status, TicketId};
use crate::error::HelpdeskError;
use crate::lifecycle::Helpdesk;
use crate::policy::{AccessPolicy, Operation};
use crate::query::TicketQuery;
use crate::storage::Repository;
use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

type SharedDesk<R> = Arc<Helpdesk<R>>;

/// Errors returned by API handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed actor headers
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Body missing, not JSON, or not the expected shape
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Helpdesk(#[from] HelpdeskError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Helpdesk(e) => match e {
                HelpdeskError::Validation(_) => StatusCode::BAD_REQUEST,
                HelpdeskError::Forbidden(_) => StatusCode::FORBIDDEN,
                HelpdeskError::TicketNotFound { .. } => StatusCode::NOT_FOUND,
                HelpdeskError::InvalidState { .. } | HelpdeskError::Conflict { .. } => {
                    StatusCode::CONFLICT
                },
                HelpdeskError::LockTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidBody(_) => "validation_error",
            Self::Helpdesk(e) => e.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }
        let body = Json(serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Read the acting user from request headers
pub fn actor_from_headers(headers: &HeaderMap) -> ApiResult<Actor> {
    let id = header_text(headers, ACTOR_ID_HEADER)?
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {ACTOR_ID_HEADER} header")))?;
    let role = match header_text(headers, ACTOR_ROLE_HEADER)? {
        Some(role) => role
            .parse::<Role>()
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?,
        None => Role::User,
    };
    Ok(Actor::new(id, role))
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> ApiResult<Option<&'a str>> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(str::trim)
                .map_err(|_| ApiError::Unauthorized(format!("Header {name} is not valid text")))
        })
        .transpose()
}

fn parse_ticket_id(id: &str) -> ApiResult<TicketId> {
    TicketId::parse_str(id).map_err(|_| {
        ApiError::Helpdesk(HelpdeskError::TicketNotFound { id: id.to_string() })
    })
}

/// Run an engine call on the blocking pool; the file store sleeps while
/// waiting for ticket locks
async fn blocking<R, T, F>(desk: &SharedDesk<R>, f: F) -> ApiResult<T>
where
    R: Repository + 'static,
    T: Send + 'static,
    F: FnOnce(&Helpdesk<R>) -> crate::Result<T> + Send + 'static,
{
    let desk = Arc::clone(desk);
    tokio::task::spawn_blocking(move || f(&desk))
        .await
        .map_err(|e| HelpdeskError::custom(format!("Worker task failed: {e}")))?
        .map_err(ApiError::from)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    pub priority: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentRequest {
    pub comment: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReopenRequest {
    pub confirm: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

impl ListParams {
    fn into_query(self) -> crate::Result<TicketQuery> {
        Ok(TicketQuery {
            status: self.status.as_deref().map(str::parse::<Status>).transpose()?,
            priority: self
                .priority
                .as_deref()
                .map(str::parse::<Priority>)
                .transpose()?,
            search: self.search,
        })
    }
}

async fn create_ticket<R: Repository + 'static>(
    State(desk): State<SharedDesk<R>>,
    headers: HeaderMap,
    req: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let actor = actor_from_headers(&headers)?;
    let Json(req) = req?;
    let ticket = blocking(&desk, move |desk| {
        let priority = req.priority.as_deref().map(str::parse::<Priority>).transpose()?;
        desk.create_ticket(&actor, &req.title, &req.description, priority)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

async fn list_tickets<R: Repository + 'static>(
    State(desk): State<SharedDesk<R>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let actor = actor_from_headers(&headers)?;
    let tickets = blocking(&desk, move |desk| {
        desk.list_tickets(&actor, &params.into_query()?)
    })
    .await?;
    Ok(Json(tickets))
}

async fn list_all_tickets<R: Repository + 'static>(
    State(desk): State<SharedDesk<R>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let actor = actor_from_headers(&headers)?;
    let tickets = blocking(&desk, move |desk| {
        desk.list_all_tickets(&actor, &params.into_query()?)
    })
    .await?;
    Ok(Json(tickets))
}

async fn ticket_stats<R: Repository + 'static>(
    State(desk): State<SharedDesk<R>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let actor = actor_from_headers(&headers)?;
    let stats = blocking(&desk, move |desk| desk.ticket_stats(&actor)).await?;
    Ok(Json(stats))
}

async fn get_ticket<R: Repository + 'static>(
    State(desk): State<SharedDesk<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let actor = actor_from_headers(&headers)?;
    let id = parse_ticket_id(&id)?;
    let ticket = blocking(&desk, move |desk| desk.get_ticket(&actor, &id)).await?;
    Ok(Json(ticket))
}

async fn begin_handling<R: Repository + 'static>(
    State(desk): State<SharedDesk<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let actor = actor_from_headers(&headers)?;
    let id = parse_ticket_id(&id)?;
    let ticket = blocking(&desk, move |desk| desk.begin_handling(&actor, &id)).await?;
    Ok(Json(ticket))
}

async fn list_comments<R: Repository + 'static>(
    State(desk): State<SharedDesk<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let actor = actor_from_headers(&headers)?;
    let id = parse_ticket_id(&id)?;
    let comments = blocking(&desk, move |desk| desk.list_comments(&actor, &id)).await?;
    Ok(Json(comments))
}

async fn add_comment<R: Repository + 'static>(
    State(desk): State<SharedDesk<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    req: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let actor = actor_from_headers(&headers)?;
    let id = parse_ticket_id(&id)?;
    let Json(req) = req?;
    let comment = blocking(&desk, move |desk| {
        desk.add_comment(&actor, &id, &req.comment)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn resolve_ticket<R: Repository + 'static>(
    State(desk): State<SharedDesk<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    req: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let actor = actor_from_headers(&headers)?;
    let id = parse_ticket_id(&id)?;
    let Json(req) = req?;
    let ticket = blocking(&desk, move |desk| {
        desk.resolve_ticket(&actor, &id, &req.comment)
    })
    .await?;
    Ok(Json(ticket))
}

async fn reopen_ticket<R: Repository + 'static>(
    State(desk): State<SharedDesk<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    req: Result<Json<ReopenRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let actor = actor_from_headers(&headers)?;
    let id = parse_ticket_id(&id)?;
    // Checked before the body so non-administrators always see 403
    AccessPolicy.authorize(&actor, Operation::Transition)?;
    let Json(req) = req?;
    if !req.confirm {
        return Err(HelpdeskError::validation("Reopening requires \"confirm\": true").into());
    }
    let ticket = blocking(&desk, move |desk| desk.reopen_ticket(&actor, &id)).await?;
    Ok(Json(ticket))
}

/// Build the API router over an engine
pub fn router<R: Repository + 'static>(desk: Helpdesk<R>) -> Router {
    Router::new()
        .route("/api/tickets", post(create_ticket::<R>))
        .route("/api/tickets/tickets", get(list_tickets::<R>))
        .route("/api/tickets/admin", get(list_all_tickets::<R>))
        .route("/api/tickets/stats", get(ticket_stats::<R>))
        .route("/api/tickets/:id", get(get_ticket::<R>))
        .route("/api/tickets/:id/handle", post(begin_handling::<R>))
        .route(
            "/api/tickets/:id/comments",
            get(list_comments::<R>).post(add_comment::<R>),
        )
        .route("/api/tickets/:id/resolve", post(resolve_ticket::<R>))
        .route("/api/tickets/:id/reopen", post(reopen_ticket::<R>))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(Arc::new(desk))
}

/// Bind `host:port` and serve until the process is stopped
pub async fn serve<R: Repository + 'static>(
    desk: Helpdesk<R>,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Help desk API listening on {addr}");

    axum::serve(listener, router(desk))
        .await
        .context("API server stopped unexpectedly")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_actor_headers() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            actor_from_headers(&headers),
            Err(ApiError::Unauthorized(_))
        ));

        headers.insert(ACTOR_ID_HEADER, HeaderValue::from_static("ops"));
        assert!(!actor_from_headers(&headers).unwrap().is_admin());

        headers.insert(ACTOR_ROLE_HEADER, HeaderValue::from_static("admin"));
        assert!(actor_from_headers(&headers).unwrap().is_admin());

        headers.insert(ACTOR_ROLE_HEADER, HeaderValue::from_static("root"));
        assert!(matches!(
            actor_from_headers(&headers),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (HelpdeskError::validation("x"), StatusCode::BAD_REQUEST),
            (HelpdeskError::forbidden("x"), StatusCode::FORBIDDEN),
            (
                HelpdeskError::TicketNotFound { id: "x".into() },
                StatusCode::NOT_FOUND,
            ),
            (
                HelpdeskError::InvalidState {
                    operation: "resolve",
                    status: Status::Open,
                },
                StatusCode::CONFLICT,
            ),
            (
                HelpdeskError::Conflict {
                    id: "x".into(),
                    expected: Status::InProgress,
                    actual: Status::Resolved,
                },
                StatusCode::CONFLICT,
            ),
            (HelpdeskError::custom("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }
}
