use crate::types::bookmark::Bookmark;

/// A row-level change in the remote `bookmarks` table, delivered over the
/// push-notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A row was inserted; carries the full record.
    Inserted(Bookmark),
    /// A row was deleted; only the id of the old row is delivered.
    Deleted { id: i64 },
}
