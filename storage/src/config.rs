use serde::{Deserialize, Serialize};

use crate::page::constants::PAGE_SIZE_U64;

/// How `open` turns a file length into a page count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCountPolicy {
    /// `len / PAGE_SIZE`; a trailing partial page is reported and ignored.
    #[default]
    Exact,
    /// Any trailing partial page makes the file unopenable.
    Strict,
    /// `(len + 1) / PAGE_SIZE`, kept for callers that depend on the old rounding.
    Legacy,
}

impl PageCountPolicy {
    pub fn page_count(self, len: u64) -> u64 {
        match self {
            Self::Exact | Self::Strict => len / PAGE_SIZE_U64,
            Self::Legacy => (len + 1) / PAGE_SIZE_U64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageFileOptions {
    pub page_count_policy: PageCountPolicy,
    /// fsync file data after every page write or append.
    pub sync_on_write: bool,
    pub create_base_dir: bool,
}

impl Default for PageFileOptions {
    fn default() -> Self {
        Self {
            page_count_policy: PageCountPolicy::Exact,
            sync_on_write: false,
            create_base_dir: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::constants::PAGE_SIZE;

    #[test]
    fn page_count_policies() {
        let ps = PAGE_SIZE as u64;

        assert_eq!(PageCountPolicy::Exact.page_count(0), 0);
        assert_eq!(PageCountPolicy::Exact.page_count(3 * ps), 3);
        assert_eq!(PageCountPolicy::Exact.page_count(3 * ps + 10), 3);
        assert_eq!(PageCountPolicy::Strict.page_count(2 * ps), 2);

        assert_eq!(PageCountPolicy::Legacy.page_count(3 * ps), 3);
        assert_eq!(PageCountPolicy::Legacy.page_count(ps - 1), 1);
        assert_eq!(PageCountPolicy::Legacy.page_count(ps - 2), 0);
    }

    #[test]
    fn options_from_json() -> anyhow::Result<()> {
        let opts: PageFileOptions = serde_json::from_str("{}")?;
        assert_eq!(opts, PageFileOptions::default());

        let opts: PageFileOptions =
            serde_json::from_str(r#"{"page_count_policy": "legacy", "sync_on_write": true}"#)?;
        assert_eq!(opts.page_count_policy, PageCountPolicy::Legacy);
        assert!(opts.sync_on_write);
        assert!(opts.create_base_dir);

        let text = serde_json::to_string(&opts)?;
        assert!(text.contains("\"legacy\""));

        let unknown = r#"{"page_count_policy": "round"}"#;
        assert!(serde_json::from_str::<PageFileOptions>(unknown).is_err());
        Ok(())
    }
}
