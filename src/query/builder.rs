//! Index page URL construction for phrase and similarity searches.

use serde::Serialize;

use super::criteria::SearchCriteria;

/// Default catalog origin.
pub const DEFAULT_ORIGIN: &str = "https://www.istockphoto.com";

/// Path of the phrase search endpoint.
const PHRASE_SEARCH_PATH: &str = "/search/2/image";

/// Path prefix of the content similarity endpoint.
const MORE_LIKE_THIS_PATH: &str = "/search/more-like-this";

/// What a similarity search matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityKind {
    /// Visually or contentually related images.
    #[default]
    Content,
    /// Images with a similar color palette.
    Color,
}

impl SimilarityKind {
    /// Parses `content` or `color`; anything else yields `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "content" => Some(Self::Content),
            "color" | "colour" => Some(Self::Color),
            _ => None,
        }
    }
}

/// The endpoint index pages are requested from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEndpoint {
    /// Plain phrase search.
    Phrase,
    /// Content similarity to an asset.
    MoreLikeThis(String),
    /// Color similarity to an asset.
    ColorSimilarity(String),
}

/// Builds index page URLs. Pure string construction, no network access.
///
/// # Example
///
/// ```
/// use istock_miner::query::{QueryBuilder, SearchCriteria};
///
/// let builder = QueryBuilder::default();
/// let criteria = SearchCriteria::new("dog").with_page_count(2);
/// assert_eq!(
///     builder.index_url(&criteria, 2),
///     "https://www.istockphoto.com/search/2/image?phrase=dog&mediatype=photography&numberofpeople=none&page=2"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    origin: String,
    endpoint: SearchEndpoint,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN)
    }
}

impl QueryBuilder {
    /// Creates a phrase-mode builder for `origin` (scheme and host, no path).
    #[must_use]
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            endpoint: SearchEndpoint::Phrase,
        }
    }

    /// Switches to a similarity endpoint for the rest of the run.
    pub fn similar_to(&mut self, asset_id: &str, kind: SimilarityKind) {
        self.endpoint = match kind {
            SimilarityKind::Content => SearchEndpoint::MoreLikeThis(asset_id.to_string()),
            SimilarityKind::Color => SearchEndpoint::ColorSimilarity(asset_id.to_string()),
        };
    }

    /// The active endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &SearchEndpoint {
        &self.endpoint
    }

    /// URL of the active endpoint without phrase, filters or page.
    ///
    /// The asset id is percent-encoded so it stays a single path segment
    /// or query value.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            SearchEndpoint::Phrase => format!("{}{PHRASE_SEARCH_PATH}", self.origin),
            SearchEndpoint::MoreLikeThis(id) => format!(
                "{}{MORE_LIKE_THIS_PATH}/{}",
                self.origin,
                urlencoding::encode(id)
            ),
            SearchEndpoint::ColorSimilarity(id) => format!(
                "{}{PHRASE_SEARCH_PATH}?colorsimilarityassetid={}",
                self.origin,
                urlencoding::encode(id)
            ),
        }
    }

    /// URL of index page `page` for `criteria`.
    ///
    /// Filters equal to their undefined sentinel are omitted.
    #[must_use]
    pub fn index_url(&self, criteria: &SearchCriteria, page: u32) -> String {
        let base = self.endpoint_url();
        let separator = if base.contains('?') { '&' } else { '?' };
        let mut url = format!(
            "{base}{separator}phrase={}",
            urlencoding::encode(criteria.phrase())
        );

        if let Some(value) = criteria.media_type().query_value() {
            url.push_str("&mediatype=");
            url.push_str(value);
        }
        if let Some(value) = criteria.people_count().query_value() {
            url.push_str("&numberofpeople=");
            url.push_str(value);
        }
        if let Some(value) = criteria.orientation().query_value() {
            url.push_str("&orientations=");
            url.push_str(value);
        }

        url.push_str(&format!("&page={page}"));
        url
    }

    /// URLs of pages `1..=criteria.page_count()`, empty for a disabled run.
    #[must_use]
    pub fn index_urls(&self, criteria: &SearchCriteria) -> Vec<String> {
        (1..=criteria.page_count())
            .map(|page| self.index_url(criteria, page))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{MediaType, Orientation, PeopleCount};

    fn unfiltered(phrase: &str) -> SearchCriteria {
        SearchCriteria::new(phrase)
            .with_media_type(MediaType::Undefined)
            .with_people_count(PeopleCount::Undefined)
    }

    #[test]
    fn test_phrase_url_without_filters() {
        let builder = QueryBuilder::new("https://example.com/");
        assert_eq!(
            builder.index_url(&unfiltered("cat"), 1),
            "https://example.com/search/2/image?phrase=cat&page=1"
        );
    }

    #[test]
    fn test_phrase_url_with_all_filters() {
        let criteria = SearchCriteria::new("cat")
            .with_media_type(MediaType::Vector)
            .with_people_count(PeopleCount::Group)
            .with_orientation(Orientation::PanoramicVertical);
        let url = QueryBuilder::new("https://example.com").index_url(&criteria, 3);
        assert_eq!(
            url,
            "https://example.com/search/2/image?phrase=cat\
             &mediatype=illustration&assetfiletype=eps\
             &numberofpeople=group&orientations=panoramicvertical&page=3"
        );
    }

    #[test]
    fn test_phrase_is_percent_encoded() {
        let url = QueryBuilder::new("https://example.com").index_url(&unfiltered("red panda"), 1);
        assert!(url.contains("phrase=red%20panda"), "url: {url}");
    }

    #[test]
    fn test_more_like_this_endpoint() {
        let mut builder = QueryBuilder::new("https://example.com");
        builder.similar_to("889083114", SimilarityKind::Content);
        assert_eq!(
            builder.index_url(&unfiltered("horse"), 1),
            "https://example.com/search/more-like-this/889083114?phrase=horse&page=1"
        );
    }

    #[test]
    fn test_color_endpoint_appends_phrase_to_existing_query() {
        let mut builder = QueryBuilder::new("https://example.com");
        builder.similar_to("91781059", SimilarityKind::Color);
        assert_eq!(
            builder.index_url(&unfiltered("panda"), 2),
            "https://example.com/search/2/image?colorsimilarityassetid=91781059&phrase=panda&page=2"
        );
    }

    #[test]
    fn test_index_urls_cover_every_page() {
        let builder = QueryBuilder::default();
        let urls = builder.index_urls(&SearchCriteria::new("dog").with_page_count(4));
        assert_eq!(urls.len(), 4);
        assert!(urls[0].ends_with("&page=1"));
        assert!(urls[3].ends_with("&page=4"));
    }

    #[test]
    fn test_disabled_run_has_no_urls() {
        let builder = QueryBuilder::default();
        assert!(builder.index_urls(&SearchCriteria::new(" ")).is_empty());
    }

    #[test]
    fn test_similarity_kind_labels() {
        assert_eq!(
            SimilarityKind::from_label("color"),
            Some(SimilarityKind::Color)
        );
        assert_eq!(
            SimilarityKind::from_label("Content"),
            Some(SimilarityKind::Content)
        );
        assert_eq!(SimilarityKind::from_label("shape"), None);
    }

    #[test]
    fn test_similarity_id_is_percent_encoded() {
        let mut builder = QueryBuilder::new("https://example.com");
        builder.similar_to("12?x=1#y", SimilarityKind::Content);
        assert_eq!(
            builder.index_url(&unfiltered("horse"), 1),
            "https://example.com/search/more-like-this/12%3Fx%3D1%23y?phrase=horse&page=1"
        );

        builder.similar_to("12?x=1#y", SimilarityKind::Color);
        assert_eq!(
            builder.index_url(&unfiltered("horse"), 1),
            "https://example.com/search/2/image?colorsimilarityassetid=12%3Fx%3D1%23y\
             &phrase=horse&page=1"
        );
    }
}
