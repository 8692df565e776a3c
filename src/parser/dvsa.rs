// DVSA-specific HTML parsing
use scraper::{ElementRef, Html, Selector};

use crate::model::{FetchRequest, InstructorRecord, ParserError};
use crate::utils::now_iso;

/// Title used when a results page carries no usable `<title>`.
pub const FALLBACK_TITLE: &str = "DVSA results page";

pub trait Parser {
    fn parse(&self, html: &str, req: &FetchRequest) -> Result<Vec<InstructorRecord>, ParserError>;
}

pub struct DvsaParser;

impl DvsaParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for DvsaParser {
    /// Extracts one record per instructor entry. The selectors below are
    /// a guess (real DVSA result markup has not been captured yet), so
    /// until they match, every page yields a single page-level row, which
    /// keeps data visibly arriving in the table.
    // TODO: replace the guessed selectors once real DVSA markup is captured.
    fn parse(&self, html: &str, req: &FetchRequest) -> Result<Vec<InstructorRecord>, ParserError> {
        let document = Html::parse_document(html);

        let entry_selector = selector("div.instructor-result")?;
        let name_selector = selector(".instructor-name")?;
        let phone_selector = selector(".instructor-phone")?;
        let website_selector = selector("a.instructor-website")?;

        let page_title = extract_title(html).unwrap_or_else(|| FALLBACK_TITLE.to_string());
        let fetched_at = now_iso();
        let postcode = (!req.postcode.is_empty()).then(|| req.postcode.clone());

        let mut records = Vec::new();
        for entry in document.select(&entry_selector) {
            let website = entry
                .select(&website_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string);
            records.push(InstructorRecord {
                name: first_text(&entry, &name_selector),
                postcode: postcode.clone(),
                phone: first_text(&entry, &phone_selector),
                website,
                source_url: req.url.clone(),
                title: page_title.clone(),
                fetched_at: fetched_at.clone(),
            });
        }

        if records.is_empty() {
            records.push(InstructorRecord {
                name: None,
                postcode: None,
                phone: None,
                website: None,
                source_url: req.url.clone(),
                title: page_title,
                fetched_at,
            });
        }

        Ok(records)
    }
}

/// Trimmed `<title>` text, or `None` when the tag is absent or empty.
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title = Selector::parse("title").ok()?;
    document
        .select(&title)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn selector(css: &str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|e| ParserError::Selector(e.to_string()))
}

fn first_text(entry: &ElementRef, sel: &Selector) -> Option<String> {
    entry
        .select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}
