//! Wire types shared with the MangaM backend
//!
//! These mirror the JSON shapes the backend emits. They carry no behavior
//! beyond (de)serialization.

pub mod catalog;
pub mod user;

pub use catalog::{Author, AuthorManga, Chapter, Manga, MangaStatus, Page};
pub use user::User;
