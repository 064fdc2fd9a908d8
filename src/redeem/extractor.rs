//! Gift code extraction from free-form text.

use crate::env;
use crate::redeem::types::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

static DEFAULT_EXTRACTOR: LazyLock<CodeExtractor> = LazyLock::new(CodeExtractor::default);

/// Find gift codes using the built-in link prefixes.
pub fn find_codes(text: &str) -> Vec<String> {
    DEFAULT_EXTRACTOR.find_codes(text)
}

/// Recognises `<prefix>/<code>` links and returns the bare codes.
#[derive(Debug, Clone)]
pub struct CodeExtractor {
    prefixes: Vec<String>,
    pattern: Regex,
}

impl CodeExtractor {
    pub fn new<I, S>(prefixes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes: Vec<String> = prefixes
            .into_iter()
            .map(|p| p.as_ref().trim_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if prefixes.is_empty() {
            return Err(ConfigError::InvalidLinkPrefixes(
                "at least one non-empty link prefix is required".to_string(),
            ));
        }

        let alternation = prefixes
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let source = format!(
            r"(?:{})/(\w{{{},{}}})",
            alternation,
            env::gift::MIN_CODE_LEN,
            env::gift::MAX_CODE_LEN
        );

        let pattern = Regex::new(&source)
            .map_err(|e| ConfigError::InvalidLinkPrefixes(e.to_string()))?;

        Ok(Self { prefixes, pattern })
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Codes in order of appearance. Repeats are kept.
    pub fn find_codes(&self, text: &str) -> Vec<String> {
        self.pattern
            .captures_iter(text)
            .filter_map(|captures| captures.get(1))
            .map(|code| code.as_str().to_string())
            .collect()
    }
}

impl Default for CodeExtractor {
    fn default() -> Self {
        Self::new(env::gift::LINK_PREFIXES).unwrap_or_else(|e| {
            panic!("Built-in gift link prefixes failed to compile: {}", e)
        })
    }
}
