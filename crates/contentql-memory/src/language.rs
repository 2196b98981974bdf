//! Languages and culture fallback chains.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A configured language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    /// Culture code, e.g. `en-US`.
    pub iso_code: String,
    /// Culture to try when this one has no value.
    #[serde(default)]
    pub fallback: Option<String>,
}

impl Language {
    /// Creates a language without fallback.
    #[must_use]
    pub fn new(iso_code: impl Into<String>) -> Self {
        Self {
            iso_code: iso_code.into(),
            fallback: None,
        }
    }

    /// Sets the fallback culture.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }
}

/// Looks up a culture-keyed entry, ignoring case.
pub(crate) fn culture_entry<'a, V>(map: &'a HashMap<String, V>, culture: &str) -> Option<&'a V> {
    map.get(culture).or_else(|| {
        map.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(culture))
            .map(|(_, value)| value)
    })
}

/// Follows fallback links starting at `culture`.
///
/// The returned chain starts with `culture` itself and stops at the first
/// language without a fallback or at the first repeated culture.
pub(crate) fn fallback_chain(
    culture: &str,
    lookup: impl Fn(&str) -> Option<Language>,
) -> Vec<String> {
    let mut chain = vec![culture.to_string()];
    let mut current = culture.to_string();
    while let Some(next) = lookup(&current).and_then(|language| language.fallback) {
        if chain.iter().any(|seen| seen.eq_ignore_ascii_case(&next)) {
            break;
        }
        chain.push(next.clone());
        current = next;
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn languages() -> HashMap<String, Language> {
        [
            Language::new("en-US"),
            Language::new("da-DK").with_fallback("en-US"),
            Language::new("fo-FO").with_fallback("da-DK"),
            Language::new("x-a").with_fallback("x-b"),
            Language::new("x-b").with_fallback("x-a"),
        ]
        .into_iter()
        .map(|language| (language.iso_code.clone(), language))
        .collect()
    }

    #[test]
    fn test_fallback_chain() {
        let languages = languages();
        let chain = fallback_chain("fo-FO", |c| culture_entry(&languages, c).cloned());
        assert_eq!(chain, ["fo-FO", "da-DK", "en-US"]);
    }

    #[test]
    fn test_fallback_chain_stops_on_cycle() {
        let languages = languages();
        let chain = fallback_chain("x-a", |c| culture_entry(&languages, c).cloned());
        assert_eq!(chain, ["x-a", "x-b"]);
    }

    #[test]
    fn test_culture_entry_ignores_case() {
        let languages = languages();
        assert!(culture_entry(&languages, "EN-us").is_some());
        assert!(culture_entry(&languages, "de-DE").is_none());
    }
}
