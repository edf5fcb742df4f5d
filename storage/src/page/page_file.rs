use crate::disk::error::{PageFileError, Result};
use crate::page::constants::PAGE_SIZE;

/// One page worth of bytes, the unit of every transfer to and from a page file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub buf: [u8; PAGE_SIZE],
}

impl Default for Page {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Page {
    pub fn zeroed() -> Self {
        Self {
            buf: [0u8; PAGE_SIZE],
        }
    }

    pub fn filled(byte: u8) -> Self {
        Self {
            buf: [byte; PAGE_SIZE],
        }
    }

    /// Copies `bytes` into a new page. Partial pages are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PAGE_SIZE {
            return Err(PageFileError::InvalidPageLength { len: bytes.len() });
        }
        let mut pg = Self::zeroed();
        pg.buf.copy_from_slice(bytes);
        Ok(pg)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    pub fn is_zeroed(&self) -> bool {
        self.buf.iter().all(|&b| b == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::error::ErrorKind;

    #[test]
    fn page_creation() {
        let pg = Page::zeroed();
        assert_eq!(pg.buf.len(), PAGE_SIZE);
        assert!(pg.is_zeroed());
        assert_eq!(Page::default(), pg);

        let filled = Page::filled(b'A');
        assert!(filled.as_bytes().iter().all(|&b| b == b'A'));
        assert!(!filled.is_zeroed());
    }

    #[test]
    fn page_from_bytes() {
        let raw = vec![7u8; PAGE_SIZE];
        let pg = Page::from_bytes(&raw).unwrap();
        assert_eq!(pg.as_bytes(), raw.as_slice());

        let short = Page::from_bytes(&raw[..PAGE_SIZE - 1]).unwrap_err();
        assert_eq!(short.kind(), ErrorKind::InvalidPageLength);

        let mut long = raw.clone();
        long.push(0);
        assert!(Page::from_bytes(&long).is_err());
        assert!(Page::from_bytes(&[]).is_err());
    }

    #[test]
    fn page_mutation_and_clone() {
        let mut original_pg = Page::filled(0x5A);
        original_pg.buf[100] = 42;

        let cloned_pg = original_pg.clone();
        assert_eq!(cloned_pg, original_pg);

        let mut modified_clone = cloned_pg;
        modified_clone.buf[200] = 99;
        assert_eq!(original_pg.buf[200], 0x5A);
        assert_eq!(modified_clone.buf[200], 99);

        original_pg.as_bytes_mut().fill(0);
        assert!(original_pg.is_zeroed());
        original_pg.as_bytes_mut()[3] = 1;
        assert_eq!(original_pg.buf[3], 1);
    }
}
