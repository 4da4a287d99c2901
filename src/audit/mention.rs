//! Mention extraction from rendered comment HTML.
//!
//! Bitbucket renders `@{account_id}` mentions as
//! `<span class="ap-mention" data-atlassian-id="...">@Name</span>`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};

const MENTION_SELECTOR: &str = ".ap-mention";
const MENTION_ID_ATTR: &str = "data-atlassian-id";

static SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse(MENTION_SELECTOR).ok());

/// Extract `user id -> display name` for every mention in `html`.
///
/// Malformed markup never fails: the HTML5 parser recovers, and mention
/// elements without an account id are skipped. When a user is mentioned more
/// than once, the last occurrence's text wins.
pub fn extract_mentions(html: &str) -> BTreeMap<String, String> {
    let mut mentions = BTreeMap::new();
    if html.trim().is_empty() {
        return mentions;
    }

    let Some(selector) = SELECTOR.as_ref() else {
        tracing::warn!(selector = MENTION_SELECTOR, "invalid mention selector");
        return mentions;
    };

    let fragment = Html::parse_fragment(html);
    for element in fragment.select(selector) {
        let Some(user_id) = element
            .value()
            .attr(MENTION_ID_ATTR)
            .filter(|id| !id.is_empty())
        else {
            tracing::debug!("mention element without account id, skipping");
            continue;
        };

        let text: String = element.text().collect();
        let display_name = text.trim().trim_start_matches('@').to_string();
        mentions.insert(user_id.to_string(), display_name);
    }

    mentions
}
