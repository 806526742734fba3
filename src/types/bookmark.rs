use serde::{Deserialize, Serialize};

/// A bookmark row as stored in the remote `bookmarks` table.
///
/// `id` is assigned by the store and is the reconciliation key for all
/// local list operations. Ordering (newest first) is applied server-side
/// on fetch; the record itself carries no timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub owner: String,
}

/// Insert payload for a new bookmark. The store assigns the `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookmark {
    pub owner: String,
    pub title: String,
    pub url: String,
}
