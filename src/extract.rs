//! Selector-driven field extraction.
//!
//! A page layout is described as a table of [`FieldRule`]s: which
//! [`Field`] of a [`NewsItem`] to fill, the CSS selector of the element that
//! carries it, and how to read that element. Rules are evaluated
//! independently, so a missing element only leaves its own field at the
//! default (empty string, or `None` for the timestamp).

use crate::error::{Error, Result};
use crate::models::NewsItem;
use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// `HH:MM DD.MM.YYYY`, 24-hour clock.
static DATETIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2})\s(\d{2})\.(\d{2})\.(\d{4})").expect("valid datetime pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Abstract,
    ImageSrc,
    Content,
    PublishedAt,
}

/// How the matched element(s) are turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Text of the first match.
    Text,
    /// Text of every match, one per line.
    AllText,
    /// Attribute of the first match.
    Attribute(&'static str),
    /// Timestamp found in the text of the first match.
    Timestamp,
}

impl Extraction {
    fn fits(self, field: Field) -> bool {
        match field {
            Field::PublishedAt => self == Extraction::Timestamp,
            _ => self != Extraction::Timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub selector: &'static str,
    pub extraction: Extraction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldValue {
    Text(String),
    Timestamp(Option<NaiveDateTime>),
}

#[derive(Debug)]
struct CompiledRule {
    field: Field,
    selector: Selector,
    extraction: Extraction,
}

impl CompiledRule {
    fn evaluate(&self, document: &Html) -> FieldValue {
        let mut matches = document.select(&self.selector);
        match self.extraction {
            Extraction::Text => FieldValue::Text(matches.next().map(element_text).unwrap_or_default()),
            Extraction::AllText => FieldValue::Text(
                matches.map(element_text).join("\n").trim().to_string(),
            ),
            Extraction::Attribute(name) => FieldValue::Text(
                matches
                    .next()
                    .and_then(|el| el.value().attr(name))
                    .unwrap_or_default()
                    .to_string(),
            ),
            Extraction::Timestamp => FieldValue::Timestamp(
                matches
                    .next()
                    .and_then(|el| parse_datetime(&el.text().collect::<String>())),
            ),
        }
    }
}

/// A compiled set of [`FieldRule`]s.
#[derive(Debug)]
pub struct FieldTable {
    rules: Vec<CompiledRule>,
}

impl FieldTable {
    /// Parse every selector up front; a bad selector or an extraction that
    /// cannot fill its field is a configuration error.
    pub fn compile(rules: &[FieldRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                if !rule.extraction.fits(rule.field) {
                    return Err(Error::Selector {
                        selector: rule.selector.to_string(),
                        reason: format!("{:?} cannot fill {:?}", rule.extraction, rule.field),
                    });
                }
                Ok(CompiledRule {
                    field: rule.field,
                    selector: compile_selector(rule.selector)?,
                    extraction: rule.extraction,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Build the record for `url`. Never fails; absent markup keeps defaults.
    pub fn extract(&self, document: &Html, url: &str) -> NewsItem {
        let mut item = NewsItem::empty(url);
        for rule in &self.rules {
            match (rule.field, rule.evaluate(document)) {
                (Field::Title, FieldValue::Text(text)) => item.title = text,
                (Field::Abstract, FieldValue::Text(text)) => item.abstract_text = text,
                (Field::ImageSrc, FieldValue::Text(text)) => item.image_src = text,
                (Field::Content, FieldValue::Text(text)) => item.content = text,
                (Field::PublishedAt, FieldValue::Timestamp(ts)) => item.published_at = ts,
                // Mismatched pairs are rejected by `compile`.
                _ => {}
            }
        }
        item
    }
}

pub fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Visible text of an element with whitespace runs collapsed to one space.
///
/// Text nodes are concatenated as-is, so inline markup inside a word or
/// before punctuation adds no separator.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().join(" ")
}

/// First `HH:MM DD.MM.YYYY` in `text` as a naive local timestamp.
///
/// Out-of-range components (`25:00`, `31.02`) yield `None`.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let caps = DATETIME_PATTERN.captures(text)?;
    let number = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();

    let year = caps.get(5)?.as_str().parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, number(4)?, number(3)?)?.and_hms_opt(number(1)?, number(2)?, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &[FieldRule] = &[
        FieldRule {
            field: Field::Title,
            selector: "h1.title",
            extraction: Extraction::Text,
        },
        FieldRule {
            field: Field::ImageSrc,
            selector: "figure img",
            extraction: Extraction::Attribute("src"),
        },
        FieldRule {
            field: Field::Content,
            selector: "p.block",
            extraction: Extraction::AllText,
        },
        FieldRule {
            field: Field::PublishedAt,
            selector: "span.date",
            extraction: Extraction::Timestamp,
        },
    ];

    #[test]
    fn test_parse_datetime_finds_pattern_inside_text() {
        let ts = parse_datetime("Обновлено: 14:32 11.05.2022 (МСК)").unwrap();
        assert_eq!(ts.to_string(), "2022-05-11 14:32:00");
    }

    #[test]
    fn test_parse_datetime_rejects_missing_or_invalid() {
        assert_eq!(parse_datetime("11.05.2022"), None);
        assert_eq!(parse_datetime("14:32 2022-05-11"), None);
        assert_eq!(parse_datetime("25:61 11.05.2022"), None);
        assert_eq!(parse_datetime("10:00 31.02.2022"), None);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn test_element_text_collapses_nested_nodes() {
        let html = Html::parse_fragment("<div>  Hello <b>big</b>\n world </div>");
        let selector = compile_selector("div").unwrap();
        let div = html.select(&selector).next().unwrap();
        assert_eq!(element_text(div), "Hello big world");
    }

    #[test]
    fn test_element_text_keeps_words_split_by_inline_tags() {
        let html = Html::parse_fragment(
            "<div>Hel<b>lo</b> world. <a href=\"/\">РИА Новости</a>, сообщает</div>",
        );
        let selector = compile_selector("div").unwrap();
        let div = html.select(&selector).next().unwrap();
        assert_eq!(element_text(div), "Hello world. РИА Новости, сообщает");
    }

    #[test]
    fn test_table_extracts_each_field() {
        let table = FieldTable::compile(RULES).unwrap();
        let html = Html::parse_document(
            r#"<html><body>
                <h1 class="title"> Title </h1>
                <figure><img src="https://img/x.jpg"></figure>
                <p class="block">One</p>
                <p class="block">Two</p>
                <span class="date">08:05 01.02.2023</span>
            </body></html>"#,
        );
        let item = table.extract(&html, "https://ria.ru/x");
        assert_eq!(item.title, "Title");
        assert_eq!(item.image_src, "https://img/x.jpg");
        assert_eq!(item.content, "One\nTwo");
        assert_eq!(item.published_at.unwrap().to_string(), "2023-02-01 08:05:00");
        // No rule for the abstract.
        assert_eq!(item.abstract_text, "");
    }

    #[test]
    fn test_table_defaults_every_field_on_empty_document() {
        let table = FieldTable::compile(RULES).unwrap();
        let item = table.extract(&Html::parse_document(""), "https://ria.ru/x");
        assert_eq!(item, NewsItem::empty("https://ria.ru/x"));
    }

    #[test]
    fn test_compile_rejects_bad_selector() {
        let rules = [FieldRule {
            field: Field::Title,
            selector: "div[",
            extraction: Extraction::Text,
        }];
        assert!(matches!(FieldTable::compile(&rules), Err(Error::Selector { .. })));
    }

    #[test]
    fn test_compile_rejects_extraction_that_does_not_fit_field() {
        let rules = [FieldRule {
            field: Field::Title,
            selector: "div",
            extraction: Extraction::Timestamp,
        }];
        assert!(FieldTable::compile(&rules).is_err());

        let rules = [FieldRule {
            field: Field::PublishedAt,
            selector: "div",
            extraction: Extraction::Text,
        }];
        assert!(FieldTable::compile(&rules).is_err());
    }
}
