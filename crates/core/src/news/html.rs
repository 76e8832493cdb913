use anyhow::Result;
use scraper::{Html, Selector};

use crate::news::HeadlineExtractor;

/// Pulls headline text out of an HTML page with a CSS selector.
#[derive(Debug, Clone)]
pub struct SelectorHeadlineExtractor {
    selector: Selector,
}

impl SelectorHeadlineExtractor {
    pub fn new(selector: &str) -> Result<Self> {
        let selector = Selector::parse(selector)
            .map_err(|e| anyhow::anyhow!("invalid headline selector {selector:?}: {e:?}"))?;
        Ok(Self { selector })
    }
}

impl HeadlineExtractor for SelectorHeadlineExtractor {
    fn extract(&self, page: &str) -> Vec<String> {
        let document = Html::parse_document(page);
        document
            .select(&self.selector)
            .map(|el| {
                el.text()
                    .flat_map(|t| t.split_whitespace())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|s| !s.is_empty())
            .collect()
    }
}
