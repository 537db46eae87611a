//! HTML extraction of recorded attributes and candidate links
//!
//! This module handles parsing HTML content to extract:
//! - Attribute values of the recorded tags (e.g. every `img[src]`)
//! - `href` values of anchors, optionally restricted to anchors that contain
//!   one of the configured tags

use crate::config::{RecordOptions, SearchConstraints};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};

/// Everything the crawl needs from one parsed page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtract {
    /// Values of the recorded attribute, in document order
    pub values: Vec<String>,

    /// Raw `href` values of the anchors that passed the containment filter
    pub links: Vec<String>,
}

/// Compiled selectors for one crawl configuration
#[derive(Debug, Clone)]
pub struct Extractor {
    anchors: Selector,
    containment: Option<Selector>,
    record: Option<(Selector, String)>,
}

impl Extractor {
    /// Compiles the selectors described by the search and record options
    pub fn new(search: &SearchConstraints, record: &RecordOptions) -> Result<Self, ConfigError> {
        let anchors = compile_tags(&["a".to_string()])?;

        let containment = if search.contains_tags.is_empty() {
            None
        } else {
            Some(compile_tags(&search.contains_tags)?)
        };

        let record = if record.tags.is_empty() || record.attr.is_empty() {
            None
        } else {
            Some((compile_tags(&record.tags)?, record.attr.clone()))
        };

        Ok(Self {
            anchors,
            containment,
            record,
        })
    }

    /// Parses `html` and extracts recorded values and candidate links
    ///
    /// # Example
    ///
    /// ```
    /// use linkwade::config::{RecordOptions, SearchConstraints};
    /// use linkwade::crawler::Extractor;
    ///
    /// let search = SearchConstraints {
    ///     max_depth: 1,
    ///     same_host: false,
    ///     contains_tags: vec![],
    ///     max_concurrent_fetches: None,
    /// };
    /// let record = RecordOptions {
    ///     tags: vec!["img".to_string()],
    ///     attr: "src".to_string(),
    ///     ..Default::default()
    /// };
    /// let extractor = Extractor::new(&search, &record).unwrap();
    ///
    /// let page = extractor.extract(r#"<a href="/next"><img src="cat.png"></a>"#);
    /// assert_eq!(page.values, vec!["cat.png"]);
    /// assert_eq!(page.links, vec!["/next"]);
    /// ```
    pub fn extract(&self, html: &str) -> PageExtract {
        let document = Html::parse_document(html);

        PageExtract {
            values: self.find_attribute_values(&document),
            links: self.find_links(&document),
        }
    }

    /// Collects the recorded attribute from every element of the recorded tags
    pub fn find_attribute_values(&self, document: &Html) -> Vec<String> {
        let Some((selector, attr)) = &self.record else {
            return Vec::new();
        };

        document
            .select(selector)
            .filter_map(|element| element.value().attr(attr))
            .map(str::to_string)
            .collect()
    }

    /// Returns every anchor element in the document
    pub fn find_all_anchors<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.anchors).collect()
    }

    /// Returns true if the anchor passes the containment filter
    ///
    /// With no containment tags configured every anchor passes. Otherwise the
    /// anchor must have at least one descendant element with one of the tags.
    pub fn passes_containment(&self, anchor: &ElementRef<'_>) -> bool {
        match &self.containment {
            None => true,
            Some(selector) => anchor.select(selector).next().is_some(),
        }
    }

    /// Collects `href` values of anchors that pass the containment filter
    pub fn find_links(&self, document: &Html) -> Vec<String> {
        self.find_all_anchors(document)
            .into_iter()
            .filter(|anchor| self.passes_containment(anchor))
            .filter_map(|anchor| anchor.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}

/// Builds a selector list matching any of the given tag names
fn compile_tags(tags: &[String]) -> Result<Selector, ConfigError> {
    let list = tags.join(", ");
    Selector::parse(&list)
        .map_err(|e| ConfigError::Validation(format!("Invalid tag list '{}': {:?}", list, e)))
}
