use serde::{Deserialize, Serialize};

/// Publication status of a manga
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MangaStatus {
    Ongoing,
    Completed,
    Hiatus,
}

/// A manga as returned by the catalog endpoints
///
/// List responses omit nested collections; `genres` and `chapters` default to
/// empty when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manga {
    pub manga_id: i64,
    pub title: String,
    pub description: String,
    /// Cover image URL, served through the image proxy on the way out
    pub cover_image: String,
    pub status: MangaStatus,
    pub published_date: String,
    pub last_updated: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    pub author: Author,
    /// Average rating, absent until someone has rated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    // Legacy aliases some older responses still carry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub author_id: i64,
    pub name: String,
    pub bio: String,
}

/// Join row linking an author to a manga
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorManga {
    pub author_id: i64,
    pub manga_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter_id: i64,
    pub manga_id: i64,
    pub chapter_number: i64,
    pub title: String,
    pub release_date: String,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(rename = "nextChapter", default, skip_serializing_if = "Option::is_none")]
    pub next_chapter: Option<i64>,
    #[serde(rename = "prevChapter", default, skip_serializing_if = "Option::is_none")]
    pub prev_chapter: Option<i64>,
}

/// A single page image within a chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page_id: i64,
    pub chapter_id: i64,
    /// The backend column is `image_url`; both spellings are accepted
    #[serde(alias = "image_url")]
    pub url: String,
    pub page_number: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manga_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MangaStatus::Ongoing).unwrap(),
            r#""ongoing""#
        );
        let status: MangaStatus = serde_json::from_str(r#""hiatus""#).unwrap();
        assert_eq!(status, MangaStatus::Hiatus);
    }

    #[test]
    fn test_manga_list_item_without_nested_collections() {
        let json = r#"{
            "manga_id": 7,
            "title": "Berserk",
            "description": "Dark fantasy",
            "cover_image": "https://placehold.co/300x450",
            "status": "ongoing",
            "published_date": "1989-08-25",
            "last_updated": "2024-01-12T08:30:00Z",
            "author": {"author_id": 3, "name": "Kentaro Miura", "bio": ""}
        }"#;

        let manga: Manga = serde_json::from_str(json).unwrap();

        assert_eq!(manga.manga_id, 7);
        assert_eq!(manga.status, MangaStatus::Ongoing);
        assert!(manga.genres.is_empty());
        assert!(manga.chapters.is_empty());
        assert!(manga.rating.is_none());
        assert_eq!(manga.author.name, "Kentaro Miura");
    }

    #[test]
    fn test_chapter_link_field_names() {
        let json = r#"{
            "chapter_id": 12,
            "manga_id": 7,
            "chapter_number": 3,
            "title": "The Brand",
            "release_date": "1990-01-01",
            "pages": [
                {"page_id": 1, "chapter_id": 12, "image_url": "https://placehold.co/1", "page_number": 1}
            ],
            "nextChapter": 13
        }"#;

        let chapter: Chapter = serde_json::from_str(json).unwrap();

        assert_eq!(chapter.next_chapter, Some(13));
        assert_eq!(chapter.prev_chapter, None);
        assert_eq!(chapter.pages[0].url, "https://placehold.co/1");

        // Round trip keeps the camelCase link names and the canonical page url key
        let out = serde_json::to_value(&chapter).unwrap();
        assert_eq!(out["nextChapter"], serde_json::json!(13));
        assert!(out.get("prevChapter").is_none());
        assert_eq!(out["pages"][0]["url"], serde_json::json!("https://placehold.co/1"));
    }
}
