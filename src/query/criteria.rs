//! Search criteria and filter enums with lenient normalization.
//!
//! Invalid inputs are coerced to defaults rather than rejected: unknown
//! filter labels fall back to the filter's default, out-of-range page counts
//! fall back to [`DEFAULT_PAGES`], and an empty phrase disables the crawl by
//! forcing the page count to zero.

use serde::Serialize;
use tracing::warn;

/// Maximum number of index pages one run may walk.
pub const MAX_PAGES: u32 = 20;

/// Page count used when the requested value is out of range.
pub const DEFAULT_PAGES: u32 = 1;

/// Media type filter (`mediatype` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Photographs.
    #[default]
    Photo,
    /// Illustrations.
    Illustration,
    /// Vector illustrations (EPS assets).
    Vector,
    /// No filter.
    Undefined,
}

impl MediaType {
    /// Returns the query value, or `None` for the undefined sentinel.
    ///
    /// The vector value carries its own extra parameter.
    #[must_use]
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Self::Photo => Some("photography"),
            Self::Illustration => Some("illustration"),
            Self::Vector => Some("illustration&assetfiletype=eps"),
            Self::Undefined => None,
        }
    }

    /// Parses a friendly or wire label, coercing unknown labels to the default.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "photo" | "photos" | "photography" => Self::Photo,
            "illustration" | "illustrations" => Self::Illustration,
            "vector" | "vectors" | "illustration&assetfiletype=eps" => Self::Vector,
            "undefined" | "any" => Self::Undefined,
            other => {
                warn!(value = other, "unknown media type, using default");
                Self::default()
            }
        }
    }
}

/// Number-of-people filter (`numberofpeople` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeopleCount {
    /// No people.
    #[default]
    None,
    /// One person.
    One,
    /// Two people.
    Two,
    /// Group of people.
    Group,
    /// No filter.
    Undefined,
}

impl PeopleCount {
    /// Returns the query value, or `None` for the undefined sentinel.
    #[must_use]
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Self::None => Some("none"),
            Self::One => Some("one"),
            Self::Two => Some("two"),
            Self::Group => Some("group"),
            Self::Undefined => None,
        }
    }

    /// Parses a label, coercing unknown labels to the default.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "none" | "no" | "0" => Self::None,
            "one" | "1" => Self::One,
            "two" | "2" => Self::Two,
            "group" => Self::Group,
            "undefined" | "any" => Self::Undefined,
            other => {
                warn!(value = other, "unknown number of people, using default");
                Self::default()
            }
        }
    }
}

/// Orientation filter (`orientations` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Square.
    Square,
    /// Vertical.
    Vertical,
    /// Horizontal.
    Horizontal,
    /// Panoramic vertical.
    PanoramicVertical,
    /// Panoramic horizontal.
    PanoramicHorizontal,
    /// No filter.
    #[default]
    Undefined,
}

impl Orientation {
    /// Returns the query value, or `None` for the undefined sentinel.
    #[must_use]
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Self::Square => Some("square"),
            Self::Vertical => Some("vertical"),
            Self::Horizontal => Some("horizontal"),
            Self::PanoramicVertical => Some("panoramicvertical"),
            Self::PanoramicHorizontal => Some("panoramichorizontal"),
            Self::Undefined => None,
        }
    }

    /// Parses a friendly or wire label, coercing unknown labels to the default.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "square" => Self::Square,
            "vertical" => Self::Vertical,
            "horizontal" => Self::Horizontal,
            "panoramic-vertical" | "panoramic_vertical" | "panoramicvertical" => {
                Self::PanoramicVertical
            }
            "panoramic-horizontal" | "panoramic_horizontal" | "panoramichorizontal" => {
                Self::PanoramicHorizontal
            }
            "undefined" | "any" => Self::Undefined,
            other => {
                warn!(value = other, "unknown orientation, using default");
                Self::default()
            }
        }
    }
}

/// Immutable search parameters for one mining run.
///
/// # Example
///
/// ```
/// use istock_miner::query::{MediaType, SearchCriteria};
///
/// let criteria = SearchCriteria::new("  red panda ")
///     .with_media_type(MediaType::Illustration)
///     .with_page_count(3);
/// assert_eq!(criteria.phrase(), "red panda");
/// assert_eq!(criteria.page_count(), 3);
///
/// assert_eq!(SearchCriteria::new("dog").with_page_count(99).page_count(), 1);
/// assert_eq!(SearchCriteria::new("   ").with_page_count(5).page_count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchCriteria {
    phrase: String,
    media_type: MediaType,
    people_count: PeopleCount,
    orientation: Orientation,
    page_count: u32,
}

impl SearchCriteria {
    /// Creates criteria for `phrase` with default filters and one page.
    ///
    /// The phrase is trimmed; an empty phrase disables the run.
    #[must_use]
    pub fn new(phrase: &str) -> Self {
        let phrase = phrase.trim().to_string();
        if phrase.is_empty() {
            warn!("invalid phrase, crawl disabled");
        }
        let mut criteria = Self {
            phrase,
            media_type: MediaType::default(),
            people_count: PeopleCount::default(),
            orientation: Orientation::default(),
            page_count: DEFAULT_PAGES,
        };
        criteria.enforce_phrase();
        criteria
    }

    /// Sets the media type filter.
    #[must_use]
    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    /// Sets the number-of-people filter.
    #[must_use]
    pub fn with_people_count(mut self, people_count: PeopleCount) -> Self {
        self.people_count = people_count;
        self
    }

    /// Sets the orientation filter.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sets the page count, coercing values outside `1..=MAX_PAGES` to
    /// [`DEFAULT_PAGES`].
    #[must_use]
    pub fn with_page_count(mut self, pages: i64) -> Self {
        self.page_count = match u32::try_from(pages) {
            Ok(pages) if (1..=MAX_PAGES).contains(&pages) => pages,
            _ => {
                warn!(
                    pages,
                    max = MAX_PAGES,
                    "invalid page count, calibrated to default"
                );
                DEFAULT_PAGES
            }
        };
        self.enforce_phrase();
        self
    }

    fn enforce_phrase(&mut self) {
        if self.phrase.is_empty() {
            self.page_count = 0;
        }
    }

    /// The trimmed search phrase (may be empty when the run is disabled).
    #[must_use]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// The media type filter.
    #[must_use]
    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// The number-of-people filter.
    #[must_use]
    pub fn people_count(&self) -> PeopleCount {
        self.people_count
    }

    /// The orientation filter.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of index pages to walk; zero when the run is disabled.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Returns true when the phrase is empty and nothing will be crawled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.page_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let criteria = SearchCriteria::new("dog");
        assert_eq!(criteria.media_type(), MediaType::Photo);
        assert_eq!(criteria.people_count(), PeopleCount::None);
        assert_eq!(criteria.orientation(), Orientation::Undefined);
        assert_eq!(criteria.page_count(), 1);
        assert!(!criteria.is_disabled());
    }

    #[test]
    fn test_page_count_out_of_range_uses_default() {
        for pages in [-5, 0, 21, 100, i64::MAX] {
            assert_eq!(
                SearchCriteria::new("dog").with_page_count(pages).page_count(),
                DEFAULT_PAGES,
                "pages={pages}"
            );
        }
    }

    #[test]
    fn test_page_count_in_range_is_kept() {
        for pages in 1..=20 {
            assert_eq!(
                SearchCriteria::new("dog").with_page_count(pages).page_count(),
                u32::try_from(pages).unwrap_or_default()
            );
        }
    }

    #[test]
    fn test_blank_phrase_disables_run() {
        for phrase in ["", "   ", "\t\n"] {
            let criteria = SearchCriteria::new(phrase).with_page_count(7);
            assert_eq!(criteria.page_count(), 0);
            assert!(criteria.is_disabled());
            assert_eq!(criteria.phrase(), "");
        }
    }

    #[test]
    fn test_phrase_is_trimmed() {
        assert_eq!(SearchCriteria::new("  cat ").phrase(), "cat");
    }

    #[test]
    fn test_unknown_labels_coerce_to_defaults() {
        assert_eq!(MediaType::from_label("sculpture"), MediaType::Photo);
        assert_eq!(PeopleCount::from_label("crowd"), PeopleCount::None);
        assert_eq!(Orientation::from_label("diagonal"), Orientation::Undefined);
    }

    #[test]
    fn test_labels_accept_wire_values() {
        assert_eq!(MediaType::from_label("photography"), MediaType::Photo);
        assert_eq!(
            MediaType::from_label("illustration&assetfiletype=eps"),
            MediaType::Vector
        );
        assert_eq!(PeopleCount::from_label("GROUP"), PeopleCount::Group);
        assert_eq!(
            Orientation::from_label("panoramichorizontal"),
            Orientation::PanoramicHorizontal
        );
        assert_eq!(
            Orientation::from_label("panoramic-vertical"),
            Orientation::PanoramicVertical
        );
    }

    #[test]
    fn test_undefined_has_no_query_value() {
        assert_eq!(MediaType::Undefined.query_value(), None);
        assert_eq!(PeopleCount::Undefined.query_value(), None);
        assert_eq!(Orientation::Undefined.query_value(), None);
        assert_eq!(PeopleCount::Two.query_value(), Some("two"));
    }
}
