//! HTML parser for quote search result pages
//!
//! This module extracts from one search result page:
//! - Every quote block (text, author, source title, tags, likes)
//! - The number of result pages advertised by the pagination bar
//!
//! # Markup
//!
//! ```text
//! .quoteDetails
//!   .quoteText        “text” <br> ― <span class="authorOrTitle">Author,</span>
//!                                    <a class="authorOrTitle">Title</a>
//!   .quoteFooter
//!     .left a         tag, tag, ...
//!     .right a        "1234 likes"
//! ... <em class="current">1</em> <a>2</a> ... <a class="next_page">next</a>
//! ```

use crate::crawler::fetcher::FetchedPage;
use crate::quote::Quote;
use scraper::{ElementRef, Html, Node, Selector};

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector '{}': {:?}", css, e))
}

/// Parses a search result page into quotes and a page count
///
/// # Page Count Rules
///
/// | Page contents | total_pages |
/// |---------------|-------------|
/// | Pagination bar present | largest page number in the bar |
/// | Quotes but no pagination | 1 |
/// | Neither | 0 |
///
/// # Returns
///
/// * `Ok(FetchedPage)` - Successfully parsed page
/// * `Err(String)` - A quote block did not have the expected shape
///
/// # Example
///
/// ```
/// use wordtrail::crawler::parse_search_page;
///
/// let html = r#"<div class="quoteDetails"><div class="quoteText">“Hi.”<br>
///   ― <span class="authorOrTitle">Me</span></div></div>"#;
/// let page = parse_search_page(html).unwrap();
/// assert_eq!(page.quotes[0].text, "Hi.");
/// assert_eq!(page.total_pages, 1);
/// ```
pub fn parse_search_page(html: &str) -> Result<FetchedPage, String> {
    let document = Html::parse_document(html);

    let details = selector(".quoteDetails")?;
    let mut quotes = Vec::new();
    for (index, element) in document.select(&details).enumerate() {
        let quote = parse_quote(element).map_err(|e| format!("quote #{}: {}", index + 1, e))?;
        quotes.push(quote);
    }

    let total_pages = match extract_page_count(&document)? {
        Some(count) => count,
        None if quotes.is_empty() => 0,
        None => 1,
    };

    Ok(FetchedPage {
        quotes,
        total_pages,
    })
}

/// Parses one `.quoteDetails` block
fn parse_quote(details: ElementRef<'_>) -> Result<Quote, String> {
    let text_selector = selector(".quoteText")?;
    let attribution_selector = selector(".authorOrTitle")?;
    let tag_selector = selector(".quoteFooter .left a")?;
    let likes_selector = selector(".quoteFooter .right a")?;

    let quote_text = details
        .select(&text_selector)
        .next()
        .ok_or_else(|| "missing .quoteText".to_string())?;

    let mut attribution = quote_text
        .select(&attribution_selector)
        .map(|el| clean_attribution(&el.text().collect::<String>()));
    let author = attribution.next().unwrap_or_default();
    let title = attribution.next().unwrap_or_default();

    let tags = details
        .select(&tag_selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    let likes = details
        .select(&likes_selector)
        .next()
        .map(|el| leading_number(&el.text().collect::<String>()))
        .unwrap_or(0);

    Ok(Quote {
        text: text_before_break(quote_text),
        author,
        title,
        tags,
        likes,
    })
}

/// Collects the text of `.quoteText` up to its first `<br>`
///
/// Surrounding whitespace and curly quotation marks are removed.
fn text_before_break(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for child in element.children() {
        match child.value() {
            Node::Text(t) => text.push_str(&t.text),
            Node::Element(e) if e.name() == "br" => break,
            Node::Element(_) => {
                if let Some(inner) = ElementRef::wrap(child) {
                    text.extend(inner.text());
                }
            }
            _ => {}
        }
    }

    text.trim()
        .trim_matches(|c: char| c == '“' || c == '”')
        .trim()
        .to_string()
}

fn clean_attribution(raw: &str) -> String {
    raw.trim().trim_end_matches(',').trim().to_string()
}

/// Parses the leading integer of strings like "1,234 likes"
fn leading_number(raw: &str) -> u64 {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Finds the largest page number in the pagination bar holding `.next_page`
fn extract_page_count(document: &Html) -> Result<Option<u32>, String> {
    let next_selector = selector(".next_page")?;

    let Some(next) = document.select(&next_selector).next() else {
        return Ok(None);
    };
    let Some(bar) = next.parent().and_then(ElementRef::wrap) else {
        return Ok(None);
    };

    let max = bar
        .children()
        .filter_map(ElementRef::wrap)
        .filter_map(|el| el.text().collect::<String>().trim().parse::<u32>().ok())
        .max();
    Ok(max)
}
