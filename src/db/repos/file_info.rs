use async_trait::async_trait;

use crate::db::error::DbResult;

/// A stored-file record that no longer has a referencing block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanedFile {
    pub id: String,
    /// Path relative to the file store root.
    pub path: String,
}

/// Repository over the platform's file-info table.
///
/// Boards attach uploaded files by recording the file ID in a block's
/// `fields` JSON. Once the referencing blocks are gone the file-info row
/// and the bytes on disk are orphans.
#[async_trait]
pub trait FileInfoRepo: Send + Sync {
    /// Select board-created file rows that no block references any more.
    async fn select_orphaned_board_files(&self) -> DbResult<Vec<OrphanedFile>>;

    /// Delete the given file-info rows.
    async fn delete_file_infos(&self, ids: &[String]) -> DbResult<u64>;
}
