//! View-models handed to the browser. All display strings are produced
//! here through [`crate::format`]; handlers never format by hand.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::feed::{FeedFilter, FeedPhase, FeedSnapshot};
use crate::format::{
    self, avatar_url, format_date, format_views, post_url, read_time_label, relative_time,
    share_url, SharePlatform, Truncate,
};
use crate::model::{Comment, Notification, PostSummary, RelatedPost};
use crate::services::PostPage;

/// Comment bodies longer than this are shown collapsed.
pub const COMMENT_PREVIEW_CHARS: usize = 100;
/// Title limit on tag feeds and related-post cards.
pub const CARD_TITLE_CHARS: usize = 50;

/// Per-feed truncation of card text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardStyle {
    pub title: Option<Truncate>,
    pub excerpt: Option<Truncate>,
}

impl CardStyle {
    pub fn for_filter(filter: &FeedFilter) -> Self {
        match filter {
            FeedFilter::None => Self {
                title: Some(Truncate::Words(10)),
                excerpt: Some(Truncate::Words(20)),
            },
            FeedFilter::Category(_) => Self {
                title: None,
                excerpt: None,
            },
            FeedFilter::Tag(_) => Self {
                title: Some(Truncate::Chars(CARD_TITLE_CHARS)),
                excerpt: None,
            },
        }
    }
}

fn maybe_truncate(text: &str, mode: Option<Truncate>) -> String {
    match mode {
        Some(m) => format::truncate(text, m),
        None => text.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostCard {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub url: String,
    pub image: String,
    pub read_time: String,
    pub views: String,
    pub date: String,
    pub author: String,
    pub avatar: String,
}

impl PostCard {
    pub fn from_summary(p: &PostSummary, style: CardStyle, base_url: &str) -> Self {
        Self {
            id: p.id.clone(),
            title: maybe_truncate(&p.title, style.title),
            excerpt: maybe_truncate(&format::clean_text(&p.meta_description), style.excerpt),
            url: post_url(&p.category_slug, &p.slug),
            image: p.image_url.clone(),
            read_time: read_time_label(p.read_time_minutes),
            views: format!("{} views", format_views(p.view_count)),
            date: format_date(&p.created_at),
            author: p.author_username.clone(),
            avatar: avatar_url(base_url, &p.author_avatar_url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedView {
    pub filter: FeedFilter,
    pub phase: FeedPhase,
    pub items: Vec<PostCard>,
    pub next_page: u32,
    pub exhausted: bool,
    /// Display name of the tag, taken from the first loaded item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
}

impl FeedView {
    pub fn from_snapshot(snap: &FeedSnapshot, base_url: &str) -> Self {
        let style = CardStyle::for_filter(&snap.filter);
        let tag_name = match snap.filter {
            FeedFilter::Tag(_) => snap.items.first().and_then(|p| p.tag_name.clone()),
            _ => None,
        };
        Self {
            filter: snap.filter.clone(),
            phase: snap.phase,
            items: snap
                .items
                .iter()
                .map(|p| PostCard::from_summary(p, style, base_url))
                .collect(),
            next_page: snap.next_page,
            exhausted: snap.exhausted,
            tag_name,
        }
    }
}

/// Like button state. Count never drops below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LikeState {
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub count: u64,
}

impl LikeState {
    pub fn toggle(&mut self) {
        if self.liked {
            self.count = self.count.saturating_sub(1);
        } else {
            self.count += 1;
        }
        self.liked = !self.liked;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedCard {
    pub title: String,
    pub url: String,
    pub image: String,
    pub read_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl RelatedCard {
    /// `fallback_category` is used for related posts, which the backend
    /// returns without their own category slug.
    fn from_related(r: &RelatedPost, fallback_category: &str) -> Self {
        let category = r.category_slug.as_deref().unwrap_or(fallback_category);
        Self {
            title: format::truncate(&r.title, Truncate::Chars(CARD_TITLE_CHARS)),
            url: post_url(category, &r.slug),
            image: r.image.clone(),
            read_time: read_time_label(r.read_time),
            excerpt: r.excerpt.as_deref().map(format::clean_text),
            category: r.category_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    pub facebook: String,
    pub twitter: String,
    pub whatsapp: String,
}

impl ShareLinks {
    pub fn for_page(page_url: &str) -> Self {
        Self {
            facebook: share_url(SharePlatform::Facebook, page_url),
            twitter: share_url(SharePlatform::Twitter, page_url),
            whatsapp: share_url(SharePlatform::WhatsApp, page_url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagLink {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPageView {
    pub id: String,
    pub title: String,
    pub meta_description: String,
    pub content: String,
    pub image: String,
    pub category: String,
    pub tags: Vec<TagLink>,
    pub views: String,
    pub read_time: String,
    pub date: String,
    pub like: LikeState,
    pub bookmarked: bool,
    pub comment_count: u64,
    pub related: Vec<RelatedCard>,
    pub top_viewed: Vec<RelatedCard>,
    pub share: ShareLinks,
}

impl PostPageView {
    /// `site_url` is the public origin the share links point at.
    pub fn from_page(page: &PostPage, site_url: &str) -> Self {
        let p = &page.post.summary;
        let path = post_url(&p.category_slug, &p.slug);
        let page_url = format!("{}{}", site_url.trim_end_matches('/'), path);
        Self {
            id: p.id.clone(),
            title: p.title.clone(),
            meta_description: format::clean_text(&p.meta_description),
            content: page.post.content.clone(),
            image: p.image_url.clone(),
            category: page.post.category_name.clone(),
            tags: page
                .post
                .tags()
                .into_iter()
                .map(|(slug, name)| TagLink { slug, name })
                .collect(),
            views: format!("{} views", format_views(p.view_count)),
            read_time: read_time_label(p.read_time_minutes),
            date: format_date(&p.created_at),
            like: LikeState {
                liked: false,
                count: page.like_count,
            },
            bookmarked: false,
            comment_count: page.comment_count,
            related: page
                .related
                .iter()
                .map(|r| RelatedCard::from_related(r, &p.category_slug))
                .collect(),
            top_viewed: page
                .top_viewed
                .iter()
                .map(|r| RelatedCard::from_related(r, &p.category_slug))
                .collect(),
            share: ShareLinks::for_page(&page_url),
        }
    }
}

fn posted(raw: &str, now: NaiveDateTime) -> String {
    format::parse_timestamp(raw)
        .map(|t| relative_time(t, now))
        .unwrap_or_else(|| raw.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub username: String,
    pub avatar: String,
    pub preview: String,
    pub content: String,
    pub collapsed: bool,
    pub posted: String,
}

impl CommentView {
    pub fn from_comment(c: &Comment, now: NaiveDateTime) -> Self {
        let collapsed = c.content.chars().count() > COMMENT_PREVIEW_CHARS;
        Self {
            username: c.username.clone(),
            avatar: c.avatar.clone(),
            preview: format::truncate(&c.content, Truncate::Chars(COMMENT_PREVIEW_CHARS)),
            content: c.content.clone(),
            collapsed,
            posted: posted(&c.created_at, now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationView {
    pub id: String,
    pub message: String,
    pub url: String,
    pub unread: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_avatar: Option<String>,
    pub posted: String,
}

impl NotificationView {
    pub fn from_notification(n: &Notification, now: NaiveDateTime) -> Self {
        Self {
            id: n.id.clone(),
            message: n.message.clone(),
            url: n.url.clone(),
            unread: !n.is_read,
            from: n.from_username.clone(),
            from_avatar: n.from_avatar.clone(),
            posted: posted(&n.created_at, now),
        }
    }
}
