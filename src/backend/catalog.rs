//! Read-only catalog browsing calls

use crate::backend::client::BackendClient;
use crate::core::error::Result;
use crate::model::{Chapter, Manga};
use serde::{Deserialize, Serialize};

/// Sort key accepted by the manga list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    LastUpdated,
    PublishedDate,
    Title,
    Rating,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::LastUpdated => "last_updated",
            SortField::PublishedDate => "published_date",
            SortField::Title => "title",
            SortField::Rating => "rating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Query parameters for the manga list endpoint
///
/// Defaults mirror the backend's: ten items from the start, newest
/// publication first.
#[derive(Debug, Clone, Serialize)]
pub struct MangaQuery {
    pub limit: u32,
    pub offset: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for MangaQuery {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
            sort_by: SortField::PublishedDate,
            sort_order: SortOrder::Desc,
        }
    }
}

impl BackendClient {
    /// List manga via GET /manga
    pub async fn list_manga(&self, query: &MangaQuery) -> Result<Vec<Manga>> {
        let path = format!(
            "/manga?limit={}&offset={}&sort_by={}&sort_order={}",
            query.limit,
            query.offset,
            query.sort_by.as_str(),
            query.sort_order.as_str()
        );
        self.get_json(&path).await
    }

    /// Fetch one manga with its nested collections via GET /manga/{id}
    pub async fn manga_detail(&self, manga_id: i64) -> Result<Manga> {
        self.get_json(&format!("/manga/{}", manga_id)).await
    }

    /// Full-text search via GET /manga/search
    pub async fn search_manga(&self, term: &str) -> Result<Vec<Manga>> {
        let path = format!("/manga/search?search={}", urlencoding::encode(term));
        self.get_json(&path).await
    }

    /// List a manga's chapters via GET /manga/{id}/chapters
    pub async fn manga_chapters(&self, manga_id: i64) -> Result<Vec<Chapter>> {
        self.get_json(&format!("/manga/{}/chapters", manga_id))
            .await
    }

    /// Fetch one chapter with its pages via GET /manga/chapters/{id}
    pub async fn chapter_detail(&self, chapter_id: i64) -> Result<Chapter> {
        self.get_json(&format!("/manga/chapters/{}", chapter_id))
            .await
    }

    /// Fetch a chapter by its position within a manga via GET
    /// /manga/{manga_id}/chapters/{chapter_number}
    pub async fn chapter_by_number(&self, manga_id: i64, chapter_number: i64) -> Result<Chapter> {
        self.get_json(&format!("/manga/{}/chapters/{}", manga_id, chapter_number))
            .await
    }

    /// List a user's favorite manga via GET /favorites/user/{user_id}
    pub async fn user_favorites(&self, user_id: i64) -> Result<Vec<Manga>> {
        self.get_json(&format!("/favorites/user/{}", user_id))
            .await
    }
}
