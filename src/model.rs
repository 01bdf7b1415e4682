//! Wire types returned by the remote blog API.
//!
//! The PHP backend is loose about scalar types (ids and counters arrive as
//! either JSON numbers or strings), so numeric fields go through the lenient
//! helpers at the bottom of this file.

use serde::{Deserialize, Deserializer, Serialize};

/// One entry of a feed page (home, category or tag).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostSummary {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub meta_description: String,
    #[serde(rename = "image", default, deserialize_with = "null_as_empty")]
    pub image_url: String,
    pub category_slug: String,
    pub slug: String,
    #[serde(rename = "read_time", default, deserialize_with = "lenient_u32")]
    pub read_time_minutes: u32,
    #[serde(rename = "views", default, deserialize_with = "lenient_u64")]
    pub view_count: u64,
    /// Raw server timestamp, e.g. `2024-04-05 10:22:11`.
    pub created_at: String,
    #[serde(rename = "username", default, deserialize_with = "null_as_empty")]
    pub author_username: String,
    #[serde(rename = "avatar", default, deserialize_with = "null_as_empty")]
    pub author_avatar_url: String,
    /// Only present on tag feeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
}

/// Full post as returned by `?post_slug=`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category_name: String,
    /// Comma separated, parallel to `tag_names`.
    #[serde(default)]
    pub tag_slugs: Option<String>,
    #[serde(default)]
    pub tag_names: Option<String>,
}

impl PostDetail {
    /// Pairs of `(slug, name)` from the parallel CSV lists. Extra slugs with
    /// no matching name fall back to the slug.
    pub fn tags(&self) -> Vec<(String, String)> {
        let Some(slugs) = self.tag_slugs.as_deref() else {
            return Vec::new();
        };
        let names: Vec<&str> = self
            .tag_names
            .as_deref()
            .map(|n| n.split(',').collect())
            .unwrap_or_default();

        slugs
            .split(',')
            .map(str::trim)
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .map(|(i, slug)| {
                let name = names.get(i).map(|n| n.trim()).unwrap_or(slug);
                (slug.to_string(), name.to_string())
            })
            .collect()
    }
}

/// Related / top-viewed cards on the post page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelatedPost {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub category_slug: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub read_time: u32,
    #[serde(default)]
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteInfo {
    pub site_title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub meta_description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub meta_keywords: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub logo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Search results use camelCase keys on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub title: String,
    pub category_slug: String,
    pub post_slug: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    #[serde(default, deserialize_with = "opt_id_string")]
    pub id: Option<String>,
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub avatar: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_read: bool,
    pub created_at: String,
    #[serde(rename = "fromUsername", default)]
    pub from_username: Option<String>,
    #[serde(rename = "fromAvatar", default)]
    pub from_avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LikeCount {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub like_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommentCount {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub comment_count: u64,
}

// --- lenient scalars ---

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Num(serde_json::Number),
    Str(String),
    Bool(bool),
}

fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match NumOrStr::deserialize(d)? {
        NumOrStr::Num(n) => n.to_string(),
        NumOrStr::Str(s) => s,
        NumOrStr::Bool(b) => b.to_string(),
    })
}

fn opt_id_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<NumOrStr>::deserialize(d)?.map(|v| match v {
        NumOrStr::Num(n) => n.to_string(),
        NumOrStr::Str(s) => s,
        NumOrStr::Bool(b) => b.to_string(),
    }))
}

/// MySQL NULL columns arrive as JSON `null`; show them as empty text.
fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let v = Option::<NumOrStr>::deserialize(d)?;
    Ok(match v {
        Some(NumOrStr::Num(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Some(NumOrStr::Str(s)) => s.trim().parse().unwrap_or(0),
        Some(NumOrStr::Bool(_)) | None => 0,
    })
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    lenient_u64(d).map(|v| u32::try_from(v).unwrap_or(u32::MAX))
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let v = Option::<NumOrStr>::deserialize(d)?;
    Ok(match v {
        Some(NumOrStr::Bool(b)) => b,
        Some(NumOrStr::Num(n)) => n.as_u64().unwrap_or(0) != 0,
        Some(NumOrStr::Str(s)) => matches!(s.trim(), "1" | "true" | "TRUE"),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_accepts_stringly_typed_numbers() {
        let raw = r#"{
            "id": "42", "title": "Gulmarg in winter", "meta_description": "Snow",
            "image": "https://cdn/x.jpg", "category_slug": "travel", "slug": "gulmarg",
            "read_time": "5", "views": 15230, "created_at": "2024-04-05 10:22:11",
            "username": "mir", "avatar": "uploads/mir.png"
        }"#;
        let p: PostSummary = serde_json::from_str(raw).unwrap();
        assert_eq!(p.id, "42");
        assert_eq!(p.read_time_minutes, 5);
        assert_eq!(p.view_count, 15230);
        assert_eq!(p.tag_name, None);
    }

    #[test]
    fn null_text_columns_do_not_sink_the_page() {
        let body = r#"[
            {"id": 1, "title": "Pahalgam", "meta_description": null, "image": null,
             "category_slug": "travel", "slug": "pahalgam", "created_at": "2024-04-05 10:22:11",
             "username": "mir", "avatar": null},
            {"id": 2, "title": "Sonmarg", "category_slug": "travel", "slug": "sonmarg",
             "created_at": "2024-04-06 09:00:00", "username": null, "avatar": "a.png"}
        ]"#;
        let page = crate::feed::source::parse_page(body).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].author_avatar_url, "");
        assert_eq!(page[0].image_url, "");
        assert_eq!(page[0].meta_description, "");
        assert_eq!(page[1].author_username, "");
    }

    #[test]
    fn comment_with_null_id_and_avatar() {
        let raw = r#"{"id": null, "username": "aisha", "avatar": null,
                      "content": "Lovely", "created_at": "2024-04-05 10:00:00"}"#;
        let c: Comment = serde_json::from_str(raw).unwrap();
        assert_eq!(c.id, None);
        assert_eq!(c.avatar, "");

        let c: Comment = serde_json::from_str(
            r#"{"id": 12, "username": "a", "content": "x", "created_at": "y"}"#,
        )
        .unwrap();
        assert_eq!(c.id.as_deref(), Some("12"));
    }

    #[test]
    fn notification_read_flag_from_int() {
        let raw = r#"{"id": 7, "message": "liked your post", "url": "/travel/x",
                      "is_read": "0", "created_at": "2024-01-01 00:00:00"}"#;
        let n: Notification = serde_json::from_str(raw).unwrap();
        assert_eq!(n.id, "7");
        assert!(!n.is_read);
    }

    #[test]
    fn detail_tags_zip_csv_lists() {
        let d = PostDetail {
            summary: serde_json::from_str(
                r#"{"id":1,"title":"t","category_slug":"c","slug":"s","created_at":"x"}"#,
            )
            .unwrap(),
            content: String::new(),
            category_name: "Travel".into(),
            tag_slugs: Some("dal-lake, houseboats,winter".into()),
            tag_names: Some("Dal Lake,Houseboats".into()),
        };
        assert_eq!(
            d.tags(),
            vec![
                ("dal-lake".to_string(), "Dal Lake".to_string()),
                ("houseboats".to_string(), "Houseboats".to_string()),
                ("winter".to_string(), "winter".to_string()),
            ]
        );
    }
}
