use crate::config::{PageCountPolicy, PageFileOptions};
use crate::disk::error::{PageFileError, Result};
use crate::disk::file_handle::FileHandle;
use crate::page::{constants::PAGE_SIZE_U64, page_file::Page};
use log::{debug, info, warn};
use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Creates, opens and destroys page files under a base directory.
pub struct PageFileManager {
    base: PathBuf,
    options: PageFileOptions,
}

impl PageFileManager {
    pub fn new<P: AsRef<Path>>(base: P) -> Result<Self> {
        Self::with_options(base, PageFileOptions::default())
    }

    pub fn with_options<P: AsRef<Path>>(base: P, options: PageFileOptions) -> Result<Self> {
        let base = base.as_ref();
        if options.create_base_dir {
            fs::create_dir_all(base).map_err(|source| PageFileError::FileCreate {
                path: base.to_path_buf(),
                source,
            })?;
        }
        info!("page file manager initialized at {:?}", base);
        Ok(Self {
            base: base.to_path_buf(),
            options,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn options(&self) -> &PageFileOptions {
        &self.options
    }

    /// Absolute names are used as-is.
    pub fn file_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.base.join(name)
    }

    /// Creates `name` holding exactly one zero page, truncating any previous
    /// content. A file whose first page could not be written is removed.
    pub fn create_page_file(&self, name: impl AsRef<Path>) -> Result<()> {
        let path = self.file_path(name);
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| PageFileError::FileCreate {
                path: path.clone(),
                source,
            })?;

        if let Err(source) = write_first_page(&mut file) {
            drop(file);
            if let Err(e) = fs::remove_file(&path) {
                warn!("could not remove half-written page file {:?}: {}", path, e);
            }
            return Err(PageFileError::Write {
                path,
                page: 0,
                source,
            });
        }

        info!("created page file {:?}", path);
        Ok(())
    }

    pub fn open_page_file(&self, name: impl AsRef<Path>) -> Result<FileHandle> {
        let path = self.file_path(name);
        let not_found = |source| PageFileError::FileNotFound {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(not_found)?;
        let len = file.metadata().map_err(not_found)?.len();

        let policy = self.options.page_count_policy;
        let remainder = len % PAGE_SIZE_U64;
        if remainder != 0 {
            if policy == PageCountPolicy::Strict {
                return Err(PageFileError::CorruptPageFile { path, len });
            }
            warn!(
                "page file {:?} has a {} byte partial page at its end",
                path, remainder
            );
        }

        let total_pages = u32::try_from(policy.page_count(len))
            .map_err(|_| PageFileError::CorruptPageFile {
                path: path.clone(),
                len,
            })?;

        debug!("opened page file {:?} with {} pages", path, total_pages);
        Ok(FileHandle::new(
            path,
            file,
            total_pages,
            len,
            self.options.sync_on_write,
        ))
    }

    /// Removes `name`. Handles still open on it are left alone.
    pub fn destroy_page_file(&self, name: impl AsRef<Path>) -> Result<()> {
        let path = self.file_path(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("destroyed page file {:?}", path);
                Ok(())
            }
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                Err(PageFileError::FileNotFound { path, source })
            }
            Err(source) => Err(PageFileError::DeleteFailed { path, source }),
        }
    }

    pub fn exists(&self, name: impl AsRef<Path>) -> bool {
        self.file_path(name).is_file()
    }
}

fn write_first_page(file: &mut File) -> io::Result<()> {
    file.write_all(&Page::zeroed().buf)?;
    file.sync_all()
}
