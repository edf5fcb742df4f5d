use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, PageFileError>;

/// Result codes callers branch on. Several error variants may share one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FileNotFound,
    FileCreate,
    Write,
    ReadNonExistingPage,
    HandleNotInitialized,
    DeleteFailed,
    CorruptPageFile,
    InvalidPageLength,
}

#[derive(Debug, thiserror::Error)]
pub enum PageFileError {
    #[error("page file {path:?} not found")]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create page file {path:?}")]
    FileCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write of page {page} to {path:?} failed")]
    Write {
        path: PathBuf,
        page: u32,
        #[source]
        source: io::Error,
    },

    #[error("page {page} does not exist, file has {total_pages} pages")]
    ReadNonExistingPage { page: i64, total_pages: u32 },

    #[error("short read of page {page} from {path:?}")]
    ShortRead {
        path: PathBuf,
        page: u32,
        #[source]
        source: io::Error,
    },

    #[error("file handle is not initialized")]
    HandleNotInitialized,

    #[error("cannot delete page file {path:?}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("page file {path:?} is {len} bytes, not a whole number of pages")]
    CorruptPageFile { path: PathBuf, len: u64 },

    #[error("page buffer is {len} bytes, expected exactly one page")]
    InvalidPageLength { len: usize },
}

impl PageFileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. } => ErrorKind::FileNotFound,
            Self::FileCreate { .. } => ErrorKind::FileCreate,
            Self::Write { .. } => ErrorKind::Write,
            Self::ReadNonExistingPage { .. } | Self::ShortRead { .. } => {
                ErrorKind::ReadNonExistingPage
            }
            Self::HandleNotInitialized => ErrorKind::HandleNotInitialized,
            Self::DeleteFailed { .. } => ErrorKind::DeleteFailed,
            Self::CorruptPageFile { .. } => ErrorKind::CorruptPageFile,
            Self::InvalidPageLength { .. } => ErrorKind::InvalidPageLength,
        }
    }

    pub(crate) fn out_of_range(page: i64, total_pages: u32) -> Self {
        Self::ReadNonExistingPage { page, total_pages }
    }
}
