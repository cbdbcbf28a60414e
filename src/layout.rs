//! Destination directory naming.
//!
//! Layout: `{root}/{backend}/{name}` where `name` is the sanitized phrase,
//! `undefined` for uncategorized runs, or `{phrase}_similar_{id}` in
//! similarity mode.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

/// Default backend directory under the dataset root.
pub const DEFAULT_BACKEND: &str = "istock_dataset";

/// Directory name used when runs are not categorized by phrase.
pub const UNCATEGORIZED_DIR: &str = "undefined";

#[allow(clippy::expect_used)]
static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\\/:*?"<>|.\s]"#).expect("sanitize regex is valid")
});

/// Replaces path-hostile characters, whitespace and dots with `_`.
///
/// # Example
///
/// ```
/// use istock_miner::layout::sanitize_dir_name;
///
/// assert_eq!(sanitize_dir_name("red panda"), "red_panda");
/// assert_eq!(sanitize_dir_name("../etc"), "___etc");
/// ```
#[must_use]
pub fn sanitize_dir_name(name: &str) -> String {
    UNSAFE_CHARS.replace_all(name, "_").into_owned()
}

/// Where a run stores its images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    /// Dataset root directory.
    pub root: PathBuf,
    /// Backend directory under the root.
    pub backend: String,
    /// Store images under the phrase instead of [`UNCATEGORIZED_DIR`].
    pub categorized: bool,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            backend: DEFAULT_BACKEND.to_string(),
            categorized: true,
        }
    }
}

impl DatasetLayout {
    /// Layout rooted at `root` with default backend and categorization.
    #[must_use]
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    fn backend_dir(&self) -> PathBuf {
        self.root.join(sanitize_dir_name(&self.backend))
    }

    /// Destination for a phrase run.
    #[must_use]
    pub fn phrase_dir(&self, phrase: &str) -> PathBuf {
        let name = if self.categorized && !phrase.is_empty() {
            sanitize_dir_name(phrase)
        } else {
            UNCATEGORIZED_DIR.to_string()
        };
        self.backend_dir().join(name)
    }

    /// Destination for a similarity run seeded by `asset_id`.
    #[must_use]
    pub fn similar_dir(&self, phrase: &str, asset_id: &str) -> PathBuf {
        self.backend_dir()
            .join(sanitize_dir_name(&format!("{phrase}_similar_{asset_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_dir_name(r#"a\b/c:d*e?f"g<h>i|j.k l"#), "a_b_c_d_e_f_g_h_i_j_k_l");
        assert_eq!(sanitize_dir_name("dog"), "dog");
        assert_eq!(sanitize_dir_name("chat noir"), "chat_noir");
    }

    #[test]
    fn test_phrase_dir_categorized() {
        let layout = DatasetLayout::at("/data");
        assert_eq!(
            layout.phrase_dir("red panda"),
            PathBuf::from("/data/istock_dataset/red_panda")
        );
    }

    #[test]
    fn test_phrase_dir_uncategorized() {
        let layout = DatasetLayout {
            categorized: false,
            ..DatasetLayout::at("/data")
        };
        assert_eq!(
            layout.phrase_dir("dog"),
            PathBuf::from("/data/istock_dataset/undefined")
        );
    }

    #[test]
    fn test_empty_phrase_is_uncategorized() {
        let layout = DatasetLayout::at("/data");
        assert_eq!(
            layout.phrase_dir(""),
            PathBuf::from("/data/istock_dataset/undefined")
        );
    }

    #[test]
    fn test_similar_dir() {
        let layout = DatasetLayout {
            backend: "tmp".to_string(),
            ..DatasetLayout::at("/data")
        };
        assert_eq!(
            layout.similar_dir("horse", "1280951754"),
            PathBuf::from("/data/tmp/horse_similar_1280951754")
        );
    }
}
