// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

//! Extraction of hashtags, @mentions and $TICKER symbols from post bodies.
//!
//! Parsing is total: any body yields three lists, each ordered by first
//! occurrence and de-duplicated. Mention resolution against the user
//! directory happens in the post lifecycle, not here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\w+)").expect("hashtag regex"));
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("mention regex"));
// 1-5 uppercase letters, not followed by another word character.
static TICKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([A-Z]{1,5})\b").expect("ticker regex"));

/// Raw parse result. Hashtags are lower-cased, tickers are upper-case by
/// construction, mentions keep the handle exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTags {
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub tickers: Vec<String>,
}

/// Parse a post body into its tag lists.
pub fn parse(body: &str) -> ParsedTags {
    let mut hashtags = Vec::new();
    for capture in HASHTAG_RE.captures_iter(body) {
        let tag = capture[1].to_lowercase();
        if !hashtags.contains(&tag) {
            hashtags.push(tag);
        }
    }

    let mut mentions: Vec<String> = Vec::new();
    for capture in MENTION_RE.captures_iter(body) {
        let handle = &capture[1];
        if !mentions.iter().any(|m| m.eq_ignore_ascii_case(handle)) {
            mentions.push(handle.to_string());
        }
    }

    let mut tickers: Vec<String> = Vec::new();
    for capture in TICKER_RE.captures_iter(body) {
        let symbol = &capture[1];
        if !tickers.iter().any(|t| t == symbol) {
            tickers.push(symbol.to_string());
        }
    }

    ParsedTags {
        hashtags,
        mentions,
        tickers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_tag_kinds() {
        let parsed = parse("Bullish on $AAPL! #Earnings #Q1 cc @sarah");
        assert_eq!(parsed.hashtags, vec!["earnings", "q1"]);
        assert_eq!(parsed.tickers, vec!["AAPL"]);
        assert_eq!(parsed.mentions, vec!["sarah"]);
    }

    #[test]
    fn hashtags_are_lowercased_and_deduplicated() {
        let parsed = parse("#Rust #rust #RUST #tokio");
        assert_eq!(parsed.hashtags, vec!["rust", "tokio"]);
    }

    #[test]
    fn mentions_deduplicate_case_insensitively() {
        let parsed = parse("@Alice hi @alice and @bob");
        assert_eq!(parsed.mentions, vec!["Alice", "bob"]);
    }

    #[test]
    fn tickers_require_one_to_five_uppercase_letters() {
        let parsed = parse("$AAPL $msft $TOOLONG $X and $5 dollars");
        assert_eq!(parsed.tickers, vec!["AAPL", "X"]);
    }

    #[test]
    fn no_matches_yields_empty_lists() {
        let parsed = parse("plain text without any tags");
        assert_eq!(parsed, ParsedTags::default());
    }

    #[test]
    fn preserves_first_occurrence_order() {
        let parsed = parse("#beta #alpha #beta #gamma");
        assert_eq!(parsed.hashtags, vec!["beta", "alpha", "gamma"]);
    }
}
