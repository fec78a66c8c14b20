use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub body_markdown: String,
    pub body_html: String,
    pub category_id: Option<i64>,
    pub featured_image: Option<String>,
    pub view_count: i64,
    pub is_published: bool,
    pub published_at: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// A post joined with the name of its category, as rendered in listings.
#[derive(Debug, Clone, Serialize)]
pub struct PostWithCategory {
    #[serde(flatten)]
    pub post: Post,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub summary: Option<String>,
    pub body_markdown: String,
    pub category_id: Option<i64>,
    pub featured_image: Option<String>,
    pub is_published: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdatePost {
    pub title: String,
    pub summary: Option<String>,
    pub body_markdown: String,
    pub category_id: Option<i64>,
    /// `Some` replaces the stored path; `None` leaves it untouched.
    pub featured_image: Option<String>,
    pub is_published: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
}
