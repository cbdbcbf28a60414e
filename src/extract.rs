//! HTML extraction of thumbnail URLs from search result pages.

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

/// Structural marker of the search result gallery.
pub const GALLERY_SELECTOR: &str = r#"div[data-testid="gallery-items-container"]"#;

/// Image elements inside the gallery.
const IMAGE_SELECTOR: &str = "img";

/// Result count shown next to the media filters.
const FILE_COUNT_SELECTOR: &str = r#"span[class*="DesktopMediaFilter-module__fileCount"]"#;

/// A selector failed to parse.
#[derive(Debug, Error)]
#[error("invalid selector `{selector}`: {reason}")]
pub struct ExtractError {
    /// The offending selector.
    pub selector: String,
    /// Parser message.
    pub reason: String,
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Extracts asset URLs and result counts from catalog markup.
///
/// # Example
///
/// ```
/// use istock_miner::extract::MarkupExtractor;
///
/// let extractor = MarkupExtractor::new().unwrap();
/// let html = r#"<div data-testid="gallery-items-container">
///     <img src="https://media.example.com/id/1/photo/a.jpg">
/// </div>"#;
/// assert_eq!(
///     extractor.extract_asset_urls(html),
///     vec!["https://media.example.com/id/1/photo/a.jpg".to_string()]
/// );
/// assert!(extractor.extract_asset_urls("<p>no results</p>").is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct MarkupExtractor {
    gallery: Selector,
    image: Selector,
    file_count: Selector,
}

impl MarkupExtractor {
    /// Creates an extractor for the catalog's gallery markup.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] if a built-in selector fails to parse.
    pub fn new() -> Result<Self, ExtractError> {
        Self::with_gallery_selector(GALLERY_SELECTOR)
    }

    /// Creates an extractor that looks for a different gallery container.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] if `gallery` is not a valid CSS selector.
    pub fn with_gallery_selector(gallery: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            gallery: parse_selector(gallery)?,
            image: parse_selector(IMAGE_SELECTOR)?,
            file_count: parse_selector(FILE_COUNT_SELECTOR)?,
        })
    }

    /// Returns the `src` of every image inside the first gallery container,
    /// in document order.
    ///
    /// A page without the container yields an empty list. Images without a
    /// `src` attribute are skipped; duplicates are kept.
    #[must_use]
    pub fn extract_asset_urls(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let Some(gallery) = document.select(&self.gallery).next() else {
            debug!("gallery container not found");
            return Vec::new();
        };

        gallery
            .select(&self.image)
            .filter_map(|img| img.value().attr("src"))
            .map(ToString::to_string)
            .collect()
    }

    /// Returns the result count text of a search page, if shown.
    #[must_use]
    pub fn extract_file_count(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let text = document
            .select(&self.file_count)
            .next()?
            .text()
            .collect::<String>();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}
