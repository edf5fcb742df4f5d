use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};

use crate::disk::error::{PageFileError, Result};
use crate::disk::page_store::PageStore;
use crate::page::constants::PAGE_SIZE_U64;
use crate::page::page_file::Page;

/// An open page file plus its extent and cursor.
///
/// Obtained from [`PageFileManager::open_page_file`]. The backing file is held
/// only while the handle is open; after [`FileHandle::close`] every operation
/// fails with [`PageFileError::HandleNotInitialized`]. Two handles on the same
/// file are not coordinated in any way.
///
/// [`PageFileManager::open_page_file`]: crate::disk::file_system::PageFileManager::open_page_file
#[derive(Debug, Default)]
pub struct FileHandle {
    state: Option<OpenFile>,
}

#[derive(Debug)]
struct OpenFile {
    path: PathBuf,
    file: File,
    total_pages: u32,
    cur_page_pos: u32,
    len: u64,
    sync_on_write: bool,
}

fn page_offset(page_num: u32) -> u64 {
    u64::from(page_num) * PAGE_SIZE_U64
}

impl FileHandle {
    pub(crate) fn new(
        path: PathBuf,
        file: File,
        total_pages: u32,
        len: u64,
        sync_on_write: bool,
    ) -> Self {
        Self {
            state: Some(OpenFile {
                path,
                file,
                total_pages,
                cur_page_pos: 0,
                len,
                sync_on_write,
            }),
        }
    }

    /// A handle that was never opened. Every operation on it fails.
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.state.as_ref().map(|s| s.path.as_path())
    }

    /// Bytes stored past the last counted page. Non-zero only for a file opened
    /// with a trailing partial page, until an append overwrites it.
    pub fn trailing_bytes(&self) -> u64 {
        self.state
            .as_ref()
            .map_or(0, |s| s.len.saturating_sub(page_offset(s.total_pages)))
    }

    fn open_state(&self) -> Result<&OpenFile> {
        self.state.as_ref().ok_or(PageFileError::HandleNotInitialized)
    }

    fn open_state_mut(&mut self) -> Result<&mut OpenFile> {
        self.state.as_mut().ok_or(PageFileError::HandleNotInitialized)
    }

    /// Syncs and releases the backing file. The file is released even when
    /// the sync fails.
    pub fn close(&mut self) -> Result<()> {
        let state = self.state.take().ok_or(PageFileError::HandleNotInitialized)?;
        debug!("closing page file {:?} ({} pages)", state.path, state.total_pages);

        let OpenFile {
            path,
            file,
            cur_page_pos,
            ..
        } = state;
        file.sync_all().map_err(|source| PageFileError::Write {
            path,
            page: cur_page_pos,
            source,
        })
    }

    pub fn sync(&mut self) -> Result<()> {
        let state = self.open_state_mut()?;
        state
            .file
            .sync_all()
            .map_err(|source| PageFileError::Write {
                path: state.path.clone(),
                page: state.cur_page_pos,
                source,
            })
    }
}

impl OpenFile {
    fn check_range(&self, page_num: u32) -> Result<()> {
        if page_num >= self.total_pages {
            return Err(PageFileError::out_of_range(
                i64::from(page_num),
                self.total_pages,
            ));
        }
        Ok(())
    }

    fn write_at(&mut self, page_num: u32, buf: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(page_offset(page_num)))?;
        self.file.write_all(buf)?;
        if self.sync_on_write {
            self.file.sync_data()?;
        }
        self.len = self.len.max(page_offset(page_num) + buf.len() as u64);
        Ok(())
    }

    fn write_error(&self, page: u32, source: io::Error) -> PageFileError {
        PageFileError::Write {
            path: self.path.clone(),
            page,
            source,
        }
    }
}

impl PageStore for FileHandle {
    fn total_pages(&self) -> Result<u32> {
        Ok(self.open_state()?.total_pages)
    }

    fn block_position(&self) -> Result<u32> {
        Ok(self.open_state()?.cur_page_pos)
    }

    fn read_block(&mut self, page_num: u32, page: &mut Page) -> Result<()> {
        let state = self.open_state_mut()?;
        state.check_range(page_num)?;
        trace!("read page {} from {:?}", page_num, state.path);

        let read = state
            .file
            .seek(SeekFrom::Start(page_offset(page_num)))
            .and_then(|_| state.file.read_exact(&mut page.buf));
        if let Err(source) = read {
            return Err(PageFileError::ShortRead {
                path: state.path.clone(),
                page: page_num,
                source,
            });
        }

        state.cur_page_pos = page_num;
        Ok(())
    }

    fn write_block(&mut self, page_num: u32, page: &Page) -> Result<()> {
        let state = self.open_state_mut()?;
        state.check_range(page_num)?;
        trace!("write page {} to {:?}", page_num, state.path);

        if let Err(source) = state.write_at(page_num, &page.buf) {
            return Err(state.write_error(page_num, source));
        }

        state.cur_page_pos = page_num;
        Ok(())
    }

    /// Writes a zero page right after the last whole page. A tolerated trailing
    /// partial page is overwritten. On failure the file is cut back to its
    /// previous length and the page count is left alone.
    fn append_empty_block(&mut self) -> Result<()> {
        let state = self.open_state_mut()?;
        let new_page = state.total_pages;
        let old_len = state.len;

        if let Err(source) = state.write_at(new_page, &Page::zeroed().buf) {
            if let Err(e) = state.file.set_len(old_len) {
                warn!(
                    "could not roll {:?} back to {} bytes after failed append: {}",
                    state.path, old_len, e
                );
            }
            return Err(state.write_error(new_page, source));
        }

        state.total_pages = new_page + 1;
        state.cur_page_pos = new_page;
        debug!("appended page {} to {:?}", new_page, state.path);
        Ok(())
    }

    fn ensure_capacity(&mut self, num_pages: u32) -> Result<()> {
        let state = self.open_state()?;
        let total = state.total_pages;
        if total >= num_pages {
            return Ok(());
        }
        debug!(
            "growing {:?} from {} to {} pages",
            state.path, total, num_pages
        );
        for _ in total..num_pages {
            self.append_empty_block()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::error::ErrorKind;
    use crate::disk::file_system::PageFileManager;
    use tempfile::TempDir;

    #[test]
    fn closed_handle_rejects_everything() {
        let mut fh = FileHandle::closed();
        let mut pg = Page::zeroed();

        assert!(!fh.is_open());
        assert!(fh.path().is_none());
        assert_eq!(fh.trailing_bytes(), 0);

        let results = [
            fh.close(),
            fh.sync(),
            fh.total_pages().map(|_| ()),
            fh.block_position().map(|_| ()),
            fh.read_block(0, &mut pg),
            fh.read_first_block(&mut pg),
            fh.read_last_block(&mut pg),
            fh.read_current_block(&mut pg),
            fh.read_next_block(&mut pg),
            fh.read_previous_block(&mut pg),
            fh.write_block(0, &pg),
            fh.write_current_block(&pg),
            fh.append_empty_block(),
            fh.ensure_capacity(3),
        ];
        for result in results {
            assert_eq!(
                result.unwrap_err().kind(),
                ErrorKind::HandleNotInitialized
            );
        }
    }

    #[test]
    fn page_offsets() {
        assert_eq!(page_offset(0), 0);
        assert_eq!(page_offset(3), 3 * PAGE_SIZE_U64);
        assert_eq!(page_offset(u32::MAX), u64::from(u32::MAX) * PAGE_SIZE_U64);
    }

    #[test]
    fn failed_read_keeps_position() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let pm = PageFileManager::new(temp_dir.path())?;
        pm.create_page_file("pos.db")?;
        let mut fh = pm.open_page_file("pos.db")?;
        fh.ensure_capacity(2)?;

        let mut pg = Page::zeroed();
        fh.read_block(0, &mut pg)?;
        assert!(fh.read_block(2, &mut pg).is_err());
        assert!(fh.write_block(7, &pg).is_err());
        assert_eq!(fh.block_position()?, 0);

        fh.close()?;
        Ok(())
    }

    #[test]
    fn append_sets_position_to_new_page() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let pm = PageFileManager::new(temp_dir.path())?;
        pm.create_page_file("grow.db")?;
        let mut fh = pm.open_page_file("grow.db")?;

        assert_eq!(fh.block_position()?, 0);
        fh.append_empty_block()?;
        assert_eq!(fh.total_pages()?, 2);
        assert_eq!(fh.block_position()?, 1);
        fh.append_empty_block()?;
        assert_eq!(fh.total_pages()?, 3);
        assert_eq!(fh.block_position()?, 2);

        let len = std::fs::metadata(temp_dir.path().join("grow.db"))?.len();
        assert_eq!(len, 3 * PAGE_SIZE_U64);
        Ok(())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_append_leaves_handle_unchanged() -> anyhow::Result<()> {
        let full = std::path::Path::new("/dev/full");
        if !full.exists() {
            return Ok(());
        }
        let temp_dir = TempDir::new()?;
        let pm = PageFileManager::new(temp_dir.path())?;
        let mut fh = pm.open_page_file(full)?;

        let total = fh.total_pages()?;
        let pos = fh.block_position()?;

        let err = fh.append_empty_block().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
        assert!(matches!(err, PageFileError::Write { page, .. } if page == total));
        assert_eq!(fh.total_pages()?, total);
        assert_eq!(fh.block_position()?, pos);

        let err = fh.ensure_capacity(total + 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
        assert_eq!(fh.total_pages()?, total);
        assert_eq!(fh.block_position()?, pos);
        assert_eq!(fh.trailing_bytes(), 0);

        drop(fh);
        assert!(full.exists());
        Ok(())
    }

    #[test]
    fn close_resets_handle() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let pm = PageFileManager::new(temp_dir.path())?;
        pm.create_page_file("close.db")?;
        let mut fh = pm.open_page_file("close.db")?;

        assert!(fh.is_open());
        assert_eq!(fh.path(), Some(temp_dir.path().join("close.db").as_path()));
        fh.close()?;

        assert!(!fh.is_open());
        assert!(fh.path().is_none());
        let err = fh.close().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HandleNotInitialized);
        Ok(())
    }
}
