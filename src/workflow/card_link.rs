//! Card (ticket) links inferred from branch names and PR text

use crate::config::CardLinkConfig;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static DATED_BRANCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+/(\d{4})-(\d{2})-(\d{2})").expect("valid dated branch regex")
});

const CARD_ID_PLACEHOLDER: &str = "{cardId}";

/// Compiled card link settings
#[derive(Debug, Clone, Default)]
pub struct CardLinker {
    card_id: Option<Regex>,
    link_template: Option<String>,
    website_links: Option<Regex>,
}

impl CardLinker {
    /// Compile the configured patterns
    pub fn new(config: &CardLinkConfig) -> Result<Self> {
        let card_id = config
            .branch_card_id_pattern
            .as_deref()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    Error::Config(format!("invalid branch_card_id_pattern '{p}': {e}"))
                })
            })
            .transpose()?;

        let website = config
            .website
            .as_deref()
            .map(|w| w.trim_end_matches('/'))
            .filter(|w| !w.is_empty());

        let link_template = website.zip(config.path_template.as_deref()).map(|(w, path)| {
            format!("{w}/{}", path.trim_start_matches('/'))
        });

        let website_links = website
            .map(|w| Regex::new(&format!(r"{}/[^\s)]+", regex::escape(w))))
            .transpose()
            .map_err(|e| Error::Config(format!("invalid card website: {e}")))?;

        Ok(Self {
            card_id,
            link_template,
            website_links,
        })
    }

    /// Card link for `branch`, if one can be inferred
    ///
    /// Release-style branches carrying a date (`release/2024-05-01`) never map
    /// to a card.
    pub fn infer(&self, branch: &str) -> Option<String> {
        let (pattern, template) = self.card_id.as_ref().zip(self.link_template.as_ref())?;
        if is_dated_branch(branch) {
            return None;
        }
        let caps = pattern.captures(branch)?;
        let id = caps.get(1).or_else(|| caps.get(0))?.as_str();
        if id.is_empty() {
            return None;
        }
        Some(template.replace(CARD_ID_PLACEHOLDER, id))
    }

    /// Card links found in free text, in order of appearance
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.website_links
            .as_ref()
            .map(|re| re.find_iter(text).map(|m| m.as_str().to_string()).collect())
            .unwrap_or_default()
    }
}

/// Whether `branch` embeds a real calendar date after its type prefix
pub fn is_dated_branch(branch: &str) -> bool {
    DATED_BRANCH.captures(branch).is_some_and(|c| {
        let part = |i: usize| c.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        match (part(1), part(2), part(3)) {
            (Some(y), Some(m), Some(d)) => i32::try_from(y)
                .ok()
                .and_then(|y| NaiveDate::from_ymd_opt(y, m, d))
                .is_some(),
            _ => false,
        }
    })
}

/// Append `link` unless already present
pub fn push_unique(links: &mut Vec<String>, link: String) {
    if !link.is_empty() && !links.contains(&link) {
        links.push(link);
    }
}
