//! Contracts of the host collaborators the engine consumes: the vault
//! facade, the daily-note index, and the async content reader. The engine
//! never reaches past these traits into the host.

use futures::future::BoxFuture;

/// File-type classification used by created-day buckets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileKind {
    /// Note-like content (markdown, canvas).
    Note,
    /// Anything else: attachments, images, data files.
    Other,
}

/// Metadata the engine needs about one vault file. Paths are vault-relative
/// strings, matching how the host addresses files.
#[derive(Clone, Debug, PartialEq)]
pub struct FileMeta {
    pub path: String,
    /// Creation timestamp in epoch milliseconds, when the host knows it.
    /// Files without one are skipped by the created-day index.
    pub created: Option<i64>,
    /// Modification timestamp in epoch milliseconds.
    pub modified: i64,
}

/// A change notification from the host vault.
#[derive(Clone, Debug)]
pub enum FileEvent {
    Created(FileMeta),
    Deleted {
        path: String,
        /// Creation time if the host still knows it. Without it the index
        /// falls back to scanning every bucket for the path.
        created: Option<i64>,
    },
    Renamed {
        file: FileMeta,
        old_path: String,
        old_created: Option<i64>,
    },
}

/// Enumerates the vault. Errors come back as readable messages in the shape
/// the host's other facades use.
pub trait Vault: Send + Sync {
    fn all_files(&self) -> Result<Vec<FileMeta>, String>;
}

/// The host's daily-note index: canonical `YYYY-MM-DD` date key to file.
/// May legitimately be empty, or error when the host's daily-notes feature
/// is unconfigured; callers treat an error as an empty index.
pub trait DailyNoteIndex: Send + Sync {
    fn entries(&self) -> Result<Vec<(String, FileMeta)>, String>;
}

/// Asynchronously reads a file's textual content. The returned future is
/// owned so in-flight reads can be shared between concurrent callers.
pub trait ContentReader: Send + Sync {
    fn read_content(&self, path: &str) -> BoxFuture<'static, Result<String, String>>;
}
