use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use storage::config::PageCountPolicy;
use storage::disk::file_handle::FileHandle;
use storage::disk::page_store::PageStore;
use storage::page::constants::PAGE_SIZE;
use storage::page::page_file::Page;

const ROW: usize = 16;

#[derive(Debug, Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub total_pages: u32,
    pub file_len: u64,
    pub trailing_bytes: u64,
    pub page_size: usize,
    pub page_count_policy: PageCountPolicy,
}

impl FileInfo {
    pub fn gather(fh: &FileHandle, policy: PageCountPolicy) -> anyhow::Result<Self> {
        let Some(path) = fh.path() else {
            anyhow::bail!("no page file is open");
        };
        Ok(Self {
            path: path.to_path_buf(),
            total_pages: fh.total_pages()?,
            file_len: std::fs::metadata(path)?.len(),
            trailing_bytes: fh.trailing_bytes(),
            page_size: PAGE_SIZE,
            page_count_policy: policy,
        })
    }

    pub fn to_text(&self) -> String {
        format!(
            "file:           {}\n\
             pages:          {}\n\
             bytes:          {}\n\
             trailing bytes: {}\n\
             page size:      {}\n\
             policy:         {:?}",
            self.path.display(),
            self.total_pages,
            self.file_len,
            self.trailing_bytes,
            self.page_size,
            self.page_count_policy
        )
    }
}

/// Classic 16-bytes-per-row dump. Runs of rows identical to the previous one
/// are folded into a single `*` line.
pub fn hex_dump(page: &Page) -> String {
    let mut out = String::new();
    let mut prev: Option<&[u8]> = None;
    let mut folded = false;

    for (row_no, row) in page.as_bytes().chunks(ROW).enumerate() {
        if prev == Some(row) {
            if !folded {
                out.push_str("*\n");
                folded = true;
            }
            continue;
        }
        folded = false;
        prev = Some(row);

        let _ = write!(out, "{:08x} ", row_no * ROW);
        for (i, b) in row.iter().enumerate() {
            if i == ROW / 2 {
                out.push(' ');
            }
            let _ = write!(out, " {:02x}", b);
        }
        out.push_str("  |");
        out.extend(row.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    let _ = writeln!(out, "{:08x}", PAGE_SIZE);
    out
}

/// Places `text` at the start of an otherwise zero page.
pub fn page_from_text(text: &str) -> anyhow::Result<Page> {
    let bytes = text.as_bytes();
    if bytes.len() > PAGE_SIZE {
        anyhow::bail!(
            "text is {} bytes, a page holds at most {}",
            bytes.len(),
            PAGE_SIZE
        );
    }
    let mut pg = Page::zeroed();
    pg.as_bytes_mut()[..bytes.len()].copy_from_slice(bytes);
    Ok(pg)
}
