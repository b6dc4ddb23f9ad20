//! Book, book detail and copy models

use serde::{Deserialize, Serialize};

/// Catalog row returned by the book list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub category: String,
    pub publish_year: i32,
    pub publisher: String,
    pub available_copies: i32,
    pub total_copies: i32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Available copies, clamped to the total count
    pub fn shown_available_copies(&self) -> i32 {
        self.available_copies.clamp(0, self.total_copies.max(0))
    }
}

/// Full book record with its physical copies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetail {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub category: String,
    pub publish_year: i32,
    pub publisher: String,
    pub available_copies: i32,
    pub total_copies: i32,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub book_copies: Vec<BookCopy>,
}

impl BookDetail {
    /// Copies that can be borrowed right now
    pub fn borrowable_copies(&self) -> impl Iterator<Item = &BookCopy> {
        self.book_copies.iter().filter(|c| c.status.is_borrowable())
    }

    pub fn can_borrow(&self) -> bool {
        self.available_copies > 0 && self.borrowable_copies().next().is_some()
    }
}

/// Copy status as described by the library
///
/// The server sends localized descriptions; unknown ones are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CopyStatus {
    Available,
    Loaned,
    Other(String),
}

impl CopyStatus {
    pub fn is_borrowable(&self) -> bool {
        matches!(self, CopyStatus::Available)
    }

    pub fn as_str(&self) -> &str {
        match self {
            CopyStatus::Available => "可借閱",
            CopyStatus::Loaned => "已借出",
            CopyStatus::Other(s) => s,
        }
    }
}

impl From<String> for CopyStatus {
    fn from(s: String) -> Self {
        match s.trim() {
            "可借閱" | "Available" | "AVAILABLE" => CopyStatus::Available,
            "已借出" | "Loaned" | "LOANED" | "Borrowed" => CopyStatus::Loaned,
            _ => CopyStatus::Other(s),
        }
    }
}

impl From<CopyStatus> for String {
    fn from(status: CopyStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single physical copy of a book
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCopy {
    pub id: i32,
    pub unique_code: String,
    #[serde(rename = "statusDescription")]
    pub status: CopyStatus,
    #[serde(default)]
    pub image_url: Option<String>,
}
