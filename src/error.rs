use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The failure kinds the pipeline distinguishes between.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A page failed to load, or a required structural selector never
    /// appeared within the bounded wait. Aborts the current enumeration or
    /// the current single-URL extraction; never retried internally.
    #[error("page load failed for {url}: {reason}")]
    PageLoadTimeout { url: String, reason: String },

    /// The feed document exists but its expected structure is absent.
    /// Aborts the merge without writing.
    #[error("malformed feed document: {0}")]
    MalformedDocument(String),

    /// The URL store or feed document could not be read or written.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn page_load(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::PageLoadTimeout {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
