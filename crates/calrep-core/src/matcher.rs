//! Keyword matching for event exclusion.

use regex::{Regex, RegexBuilder};

use crate::options::ExcludeMode;

/// A keyword prepared for repeated matching under one mode.
///
/// Patterns for `word` and `regex` are compiled once here. An invalid
/// `regex` pattern is logged and the keyword then matches nothing.
#[derive(Debug, Clone)]
pub struct CompiledKeyword {
    keyword: String,
    rule: Rule,
}

#[derive(Debug, Clone)]
enum Rule {
    Contains,
    Exact,
    Pattern(Regex),
    AnyToken(Vec<String>),
    AllTokens(Vec<String>),
    Never,
}

impl CompiledKeyword {
    pub fn new(keyword: &str, mode: ExcludeMode) -> Self {
        let rule = if keyword.is_empty() {
            Rule::Never
        } else {
            match mode {
                ExcludeMode::Contains => Rule::Contains,
                ExcludeMode::Exact => Rule::Exact,
                ExcludeMode::Word => {
                    compile(&format!(r"\b{}\b", regex::escape(keyword)), keyword, mode)
                }
                ExcludeMode::Any => tokens(keyword).map_or(Rule::Never, Rule::AnyToken),
                ExcludeMode::All => tokens(keyword).map_or(Rule::Never, Rule::AllTokens),
                ExcludeMode::Regex => compile(keyword, keyword, mode),
            }
        };
        Self {
            keyword: keyword.to_string(),
            rule,
        }
    }

    /// The keyword as given.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Whether `text` matches. Empty text never matches.
    pub fn matches(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        match &self.rule {
            Rule::Contains => text.contains(self.keyword.as_str()),
            Rule::Exact => text == self.keyword,
            Rule::Pattern(re) => re.is_match(text),
            Rule::AnyToken(tokens) => tokens.iter().any(|t| text.contains(t.as_str())),
            Rule::AllTokens(tokens) => tokens.iter().all(|t| text.contains(t.as_str())),
            Rule::Never => false,
        }
    }
}

/// One-shot match of `keyword` against `text` under `mode`.
pub fn matches(text: &str, keyword: &str, mode: ExcludeMode) -> bool {
    CompiledKeyword::new(keyword, mode).matches(text)
}

fn tokens(keyword: &str) -> Option<Vec<String>> {
    let tokens: Vec<String> = keyword.split_whitespace().map(str::to_string).collect();
    (!tokens.is_empty()).then_some(tokens)
}

fn compile(pattern: &str, keyword: &str, mode: ExcludeMode) -> Rule {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => Rule::Pattern(re),
        Err(err) => {
            tracing::warn!(keyword, %mode, error = %err, "invalid keyword pattern, ignoring it");
            Rule::Never
        }
    }
}
