//! Thin typed client for the non-feed parts of the remote blog API:
//! site info, posts by slug, likes, bookmarks, comments, notifications,
//! search and auth. Each call is one request/response round trip.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::config::ApiConfig;
use crate::model::{
    Category, Comment, CommentCount, LikeCount, Notification, PostDetail, RelatedPost, SearchHit,
    SiteInfo, User,
};
use crate::session::SessionContext;

const ALREADY_EXISTS_MESSAGE: &str = "Username or email already exists.";

/// Page size used when loading more comments.
pub const COMMENT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("remote API answered HTTP {status}")]
    Status { status: u16 },
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("please log in first")]
    NotLoggedIn,
    #[error("comment is empty")]
    EmptyComment,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("username or email already exists")]
    AlreadyExists,
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkAction {
    Add,
    Delete,
}

impl BookmarkAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

/// Offset/limit window for comment paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CommentWindow {
    pub offset: u32,
    pub limit: u32,
}

impl CommentWindow {
    /// The window following `loaded` already-shown comments.
    pub fn after(loaded: usize) -> Self {
        Self {
            offset: u32::try_from(loaded).unwrap_or(u32::MAX),
            limit: COMMENT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Post plus everything the post page shows next to it.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub post: PostDetail,
    pub like_count: u64,
    pub comment_count: u64,
    pub related: Vec<RelatedPost>,
    pub top_viewed: Vec<RelatedPost>,
}

#[derive(Clone)]
pub struct BlogApi {
    cfg: ApiConfig,
    http: reqwest::Client,
}

impl BlogApi {
    pub fn new(cfg: ApiConfig, http: reqwest::Client) -> Self {
        Self { cfg, http }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.cfg
    }

    fn url(&self, endpoint: &str) -> String {
        self.cfg.endpoint(endpoint)
    }

    async fn send_value(&self, req: RequestBuilder) -> Result<Value, ServiceError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(trimmed)?)
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ServiceError> {
        let v = self.send_value(req).await?;
        Ok(serde_json::from_value(v)?)
    }

    /// Lists come back as `{"message": ...}` or `null` when there is nothing.
    async fn send_list<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<Vec<T>, ServiceError> {
        match self.send_value(req).await? {
            v @ Value::Array(_) => Ok(serde_json::from_value(v)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Head metadata. Failures are logged and yield `None`.
    pub async fn site_info(&self) -> Option<SiteInfo> {
        let req = self.http.get(self.url(&self.cfg.site_info_endpoint));
        match self.send_json::<Option<SiteInfo>>(req).await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "site info fetch failed");
                None
            }
        }
    }

    pub async fn post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, ServiceError> {
        let req = self
            .http
            .get(self.url(&self.cfg.posts_endpoint))
            .query(&[("post_slug", slug)]);
        match self.send_value(req).await? {
            v @ Value::Object(_) if v.get("id").is_some() => Ok(Some(serde_json::from_value(v)?)),
            _ => Ok(None),
        }
    }

    /// The post first, then its counters and side lists concurrently.
    /// Secondary failures degrade to zero / empty.
    pub async fn post_page(&self, slug: &str) -> Result<Option<PostPage>, ServiceError> {
        let Some(post) = self.post_by_slug(slug).await? else {
            return Ok(None);
        };
        let id = post.summary.id.clone();

        let (likes, comments, related, top) = tokio::join!(
            self.like_count(&id),
            self.comment_count(&id),
            self.related_posts(&post.category_name, &id),
            self.top_viewed_posts(&id),
        );

        Ok(Some(PostPage {
            like_count: degrade(likes, "like count"),
            comment_count: degrade(comments, "comment count"),
            related: degrade(related, "related posts"),
            top_viewed: degrade(top, "top viewed posts"),
            post,
        }))
    }

    pub async fn like_count(&self, post_id: &str) -> Result<u64, ServiceError> {
        let req = self
            .http
            .get(self.url(&self.cfg.likes_endpoint))
            .query(&[("action", "getLikeCount"), ("post_id", post_id)]);
        Ok(self.send_json::<LikeCount>(req).await?.like_count)
    }

    pub async fn comment_count(&self, post_id: &str) -> Result<u64, ServiceError> {
        let req = self
            .http
            .get(self.url(&self.cfg.comment_count_endpoint))
            .query(&[("post_id", post_id)]);
        Ok(self.send_json::<CommentCount>(req).await?.comment_count)
    }

    pub async fn related_posts(
        &self,
        category_name: &str,
        exclude_post_id: &str,
    ) -> Result<Vec<RelatedPost>, ServiceError> {
        let req = self.http.get(self.url(&self.cfg.related_endpoint)).query(&[
            ("related_posts", category_name),
            ("exclude_post_id", exclude_post_id),
        ]);
        self.send_list(req).await
    }

    pub async fn top_viewed_posts(
        &self,
        exclude_post_id: &str,
    ) -> Result<Vec<RelatedPost>, ServiceError> {
        let req = self
            .http
            .get(self.url(&self.cfg.related_endpoint))
            .query(&[("topviewpost", "true"), ("exclude_post_id", exclude_post_id)]);
        self.send_list(req).await
    }

    pub async fn toggle_like(
        &self,
        session: &SessionContext,
        post_id: &str,
    ) -> Result<(), ServiceError> {
        let user = session.require_user()?;
        let url = format!("{}?toggle-like", self.url(&self.cfg.likes_endpoint));
        let req = self
            .http
            .post(url)
            .json(&json!({ "post_id": post_id, "user_id": user.id }));
        self.send_value(req).await.map(|_| ())
    }

    pub async fn bookmark(
        &self,
        session: &SessionContext,
        post_id: &str,
        action: BookmarkAction,
    ) -> Result<(), ServiceError> {
        let user = session.require_user()?;
        let req = self.http.get(self.url(&self.cfg.bookmark_endpoint)).query(&[
            ("action", action.as_str()),
            ("user_id", user.id.as_str()),
            ("post_id", post_id),
        ]);
        self.send_value(req).await.map(|_| ())
    }

    pub async fn comments(
        &self,
        post_id: &str,
        window: Option<CommentWindow>,
    ) -> Result<Vec<Comment>, ServiceError> {
        let mut req = self
            .http
            .get(self.url(&self.cfg.comments_endpoint))
            .query(&[("post_id", post_id)]);
        if let Some(w) = window {
            req = req.query(&[("offset", w.offset), ("limit", w.limit)]);
        }
        self.send_list(req).await
    }

    pub async fn add_comment(
        &self,
        session: &SessionContext,
        post_id: &str,
        content: &str,
    ) -> Result<(), ServiceError> {
        let user = session.require_user()?;
        if content.trim().is_empty() {
            return Err(ServiceError::EmptyComment);
        }
        let req = self
            .http
            .post(self.url(&self.cfg.comments_endpoint))
            .json(&json!({ "post_id": post_id, "user_id": user.id, "content": content }));
        self.send_value(req).await.map(|_| ())
    }

    fn notifications_request(&self, user_id: &str) -> RequestBuilder {
        let url = format!(
            "{}?get_notifications",
            self.url(&self.cfg.notifications_endpoint)
        );
        self.http.get(url).query(&[("user_id", user_id)])
    }

    pub async fn notifications(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<Notification>, ServiceError> {
        let user = session.require_user()?;
        self.send_list(self.notifications_request(&user.id)).await
    }

    pub async fn unread_notification_count(
        &self,
        session: &SessionContext,
    ) -> Result<usize, ServiceError> {
        let user = session.require_user()?;
        let req = self
            .notifications_request(&user.id)
            .query(&[("is_read", "false")]);
        Ok(self.send_list::<Value>(req).await?.len())
    }

    pub async fn delete_notification(
        &self,
        session: &SessionContext,
        notification_id: &str,
    ) -> Result<(), ServiceError> {
        let user = session.require_user()?;
        let req = self
            .http
            .get(self.url(&self.cfg.notifications_endpoint))
            .query(&[
                ("delete_notification", "true"),
                ("user_id", user.id.as_str()),
                ("notification_id", notification_id),
            ]);
        self.send_value(req).await.map(|_| ())
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ServiceError> {
        let url = format!("{}?categories", self.url(&self.cfg.categories_endpoint));
        let req = self.http.get(url).query(&[
            ("order_index", "asc"),
            ("header_menu_is_included", "TRUE"),
        ]);
        self.send_list(req).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError> {
        let q = query.trim();
        if q.is_empty() {
            return Ok(Vec::new());
        }
        let req = self
            .http
            .get(self.url(&self.cfg.search_endpoint))
            .query(&[("search", q)]);
        self.send_list(req).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ServiceError> {
        let req = self
            .http
            .post(self.url(&self.cfg.login_endpoint))
            .json(&json!({ "username": username, "password": password }));
        let v = self.send_value(req).await?;
        match v.get("user") {
            Some(u) if u.is_object() => Ok(serde_json::from_value(u.clone())?),
            _ => Err(ServiceError::Rejected(
                message_of(&v).unwrap_or_else(|| "invalid credentials".to_string()),
            )),
        }
    }

    /// Returns the backend's confirmation message.
    pub async fn register(&self, form: &RegisterForm) -> Result<String, ServiceError> {
        if form.password != form.confirm_password {
            return Err(ServiceError::PasswordMismatch);
        }
        let req = self.http.post(self.url(&self.cfg.register_endpoint)).json(&json!({
            "username": form.username,
            "name": form.name,
            "email": form.email,
            "password": form.password,
        }));
        let v = self.send_value(req).await?;
        let message = message_of(&v).unwrap_or_default();
        if message == ALREADY_EXISTS_MESSAGE {
            return Err(ServiceError::AlreadyExists);
        }
        Ok(message)
    }
}

fn message_of(v: &Value) -> Option<String> {
    v.get("message").and_then(Value::as_str).map(str::to_string)
}

fn degrade<T: Default>(r: Result<T, ServiceError>, what: &str) -> T {
    r.unwrap_or_else(|e| {
        warn!(error = %e, "{what} unavailable");
        T::default()
    })
}
