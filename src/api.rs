use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::config::ApiConfig;
use crate::feed::{FeedController, FeedFilter, FeedSource, HttpFeedSource, PageOutcome};
use crate::model::{Category, SearchHit, SiteInfo, User};
use crate::services::{BlogApi, BookmarkAction, CommentWindow, RegisterForm, ServiceError};
use crate::session::SessionContext;
use crate::view::{CommentView, FeedView, LikeState, NotificationView, PostPageView};

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<ApiConfig>,
    source: Arc<dyn FeedSource>,
    api: Arc<BlogApi>,
}

impl AppState {
    pub fn new(cfg: ApiConfig, source: Arc<dyn FeedSource>, api: BlogApi) -> Self {
        Self {
            cfg: Arc::new(cfg),
            source,
            api: Arc::new(api),
        }
    }

    /// State backed by the live HTTP API described by `cfg`.
    pub fn from_config(cfg: ApiConfig) -> anyhow::Result<Self> {
        let http = cfg.http_client()?;
        let source = Arc::new(HttpFeedSource::from_config(&cfg, http.clone()));
        let api = BlogApi::new(cfg.clone(), http);
        Ok(Self::new(cfg, source, api))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/site", get(site_info))
        .route("/feed", get(home_feed))
        .route("/category/{slug}", get(category_feed))
        .route("/tags/{slug}", get(tag_feed))
        .route("/categories", get(categories))
        .route("/search", get(search))
        .route("/post/{category}/{slug}", get(post_page))
        .route("/posts/{id}/comments", get(list_comments).post(add_comment))
        .route("/posts/{id}/like", post(toggle_like))
        .route("/posts/{id}/bookmark", post(bookmark))
        .route("/notifications", get(notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/{id}", delete(delete_notification))
        .route("/login", post(login))
        .route("/register", post(register))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::NotLoggedIn => StatusCode::UNAUTHORIZED,
            ServiceError::EmptyComment | ServiceError::PasswordMismatch => StatusCode::BAD_REQUEST,
            ServiceError::AlreadyExists => StatusCode::CONFLICT,
            ServiceError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Network(_) | ServiceError::Status { .. } | ServiceError::Decode(_) => {
                tracing::warn!(error = %self, "remote API call failed");
                StatusCode::BAD_GATEWAY
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

// --- feeds ---

#[derive(Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Option<u32>,
}

/// Drive a fresh feed for `filter` through up to `pages` pages, stopping at
/// the first page that does not append (end of data or failure).
async fn drive_feed(state: &AppState, filter: FeedFilter, pages: Option<u32>) -> FeedView {
    let pages = pages
        .unwrap_or(1)
        .min(state.cfg.max_pages_per_request)
        .max(1);
    let mut feed = FeedController::new(filter);
    for _ in 0..pages {
        match feed.request_next_page(state.source.as_ref()).await {
            PageOutcome::Appended(_) => continue,
            _ => break,
        }
    }
    FeedView::from_snapshot(&feed.snapshot(), &state.cfg.base_url)
}

async fn home_feed(State(state): State<AppState>, Query(q): Query<PagesQuery>) -> Json<FeedView> {
    Json(drive_feed(&state, FeedFilter::None, q.pages).await)
}

async fn category_feed(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(q): Query<PagesQuery>,
) -> Json<FeedView> {
    Json(drive_feed(&state, FeedFilter::Category(slug), q.pages).await)
}

async fn tag_feed(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(q): Query<PagesQuery>,
) -> Json<FeedView> {
    Json(drive_feed(&state, FeedFilter::Tag(slug), q.pages).await)
}

// --- site, categories, search ---

async fn site_info(State(state): State<AppState>) -> Result<Json<SiteInfo>, StatusCode> {
    state
        .api
        .site_info()
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ServiceError> {
    Ok(Json(state.api.categories().await?))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, ServiceError> {
    Ok(Json(state.api.search(&q.q).await?))
}

// --- post page ---

async fn post_page(
    State(state): State<AppState>,
    Path((_category, slug)): Path<(String, String)>,
) -> Result<Response, ServiceError> {
    match state.api.post_page(&slug).await? {
        Some(page) => Ok(Json(PostPageView::from_page(&page, &state.cfg.base_url)).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "post not found" })),
        )
            .into_response()),
    }
}

#[derive(Deserialize)]
struct CommentsQuery {
    offset: Option<u32>,
    limit: Option<u32>,
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<CommentsQuery>,
) -> Result<Json<Vec<CommentView>>, ServiceError> {
    let window = q.offset.map(|offset| CommentWindow {
        offset,
        limit: q.limit.unwrap_or(crate::services::COMMENT_PAGE_SIZE),
    });
    let now = now();
    let comments = state.api.comments(&id, window).await?;
    Ok(Json(
        comments
            .iter()
            .map(|c| CommentView::from_comment(c, now))
            .collect(),
    ))
}

#[derive(Deserialize)]
struct NewComment {
    content: String,
}

async fn add_comment(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
    Json(body): Json<NewComment>,
) -> Result<StatusCode, ServiceError> {
    state.api.add_comment(&session, &id, &body.content).await?;
    Ok(StatusCode::CREATED)
}

/// The client posts the like state it shows; the answer is that state
/// toggled, once the backend accepted the toggle.
async fn toggle_like(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
    Json(mut like): Json<LikeState>,
) -> Result<Json<LikeState>, ServiceError> {
    state.api.toggle_like(&session, &id).await?;
    like.toggle();
    Ok(Json(like))
}

#[derive(Deserialize)]
struct BookmarkQuery {
    action: BookmarkAction,
}

async fn bookmark(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
    Query(q): Query<BookmarkQuery>,
) -> Result<StatusCode, ServiceError> {
    state.api.bookmark(&session, &id, q.action).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- notifications ---

async fn notifications(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Json<Vec<NotificationView>>, ServiceError> {
    let now = now();
    let list = state.api.notifications(&session).await?;
    Ok(Json(
        list.iter()
            .map(|n| NotificationView::from_notification(n, now))
            .collect(),
    ))
}

async fn unread_count(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let count = state.api.unread_notification_count(&session).await?;
    Ok(Json(json!({ "count": count })))
}

async fn delete_notification(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state.api.delete_notification(&session, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- auth ---

#[derive(Deserialize)]
struct LoginReq {
    username: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginReq>,
) -> Result<Json<User>, ServiceError> {
    Ok(Json(state.api.login(&body.username, &body.password).await?))
}

async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let message = state.api.register(&form).await?;
    Ok(Json(json!({ "message": message })))
}
