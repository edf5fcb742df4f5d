use crate::disk::error::{PageFileError, Result};
use crate::page::page_file::Page;

/// Whole-page access to an open page file.
///
/// Higher layers (record managers, buffer pools) program against this trait.
/// The relative readers derive an index from the tracked position and then
/// delegate to [`PageStore::read_block`], so they fail exactly like it does.
pub trait PageStore {
    fn total_pages(&self) -> Result<u32>;
    fn block_position(&self) -> Result<u32>;
    fn read_block(&mut self, page_num: u32, page: &mut Page) -> Result<()>;
    fn write_block(&mut self, page_num: u32, page: &Page) -> Result<()>;
    fn append_empty_block(&mut self) -> Result<()>;

    fn read_first_block(&mut self, page: &mut Page) -> Result<()> {
        self.total_pages()?;
        self.read_block(0, page)
    }

    fn read_last_block(&mut self, page: &mut Page) -> Result<()> {
        let total = self.total_pages()?;
        read_derived(self, i64::from(total) - 1, page)
    }

    fn read_current_block(&mut self, page: &mut Page) -> Result<()> {
        let cur = self.block_position()?;
        self.read_block(cur, page)
    }

    fn read_next_block(&mut self, page: &mut Page) -> Result<()> {
        let cur = self.block_position()?;
        read_derived(self, i64::from(cur) + 1, page)
    }

    fn read_previous_block(&mut self, page: &mut Page) -> Result<()> {
        let cur = self.block_position()?;
        read_derived(self, i64::from(cur) - 1, page)
    }

    fn write_current_block(&mut self, page: &Page) -> Result<()> {
        let cur = self.block_position()?;
        self.write_block(cur, page)
    }

    /// Grows the store until it holds at least `num_pages` pages.
    fn ensure_capacity(&mut self, num_pages: u32) -> Result<()> {
        while self.total_pages()? < num_pages {
            self.append_empty_block()?;
        }
        Ok(())
    }
}

fn read_derived<S: PageStore + ?Sized>(
    store: &mut S,
    page_num: i64,
    page: &mut Page,
) -> Result<()> {
    match u32::try_from(page_num) {
        Ok(n) => store.read_block(n, page),
        Err(_) => Err(PageFileError::out_of_range(page_num, store.total_pages()?)),
    }
}
