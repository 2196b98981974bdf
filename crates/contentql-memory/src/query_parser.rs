//! Parser for the native query syntax of the in-memory index.
//!
//! The syntax is a small Lucene subset:
//!
//! | Form              | Meaning                                         |
//! |-------------------|-------------------------------------------------|
//! | `term`            | term in any field                               |
//! | `field:term`      | term in one field                               |
//! | `term*`           | prefix match                                    |
//! | `"two words"`     | phrase match                                    |
//! | `field:*`         | field has any value                             |
//! | `*`               | every document                                  |
//! | `+clause`         | clause must match                               |
//! | `-clause`         | clause must not match                           |
//! | `a AND b`, `a OR b`, `NOT a` | explicit operators                   |
//!
//! Clauses without an operator follow the query's default operation.

use contentql_search::{BooleanOperation, SearchError};

/// How a clause contributes to a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Occur {
    Must,
    Should,
    MustNot,
}

/// What a clause matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Matcher {
    Term(String),
    Prefix(String),
    Phrase(Vec<String>),
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Clause {
    pub occur: Occur,
    pub field: Option<String>,
    pub matcher: Matcher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Explicit {
    Default,
    Must,
    Should,
    MustNot,
}

/// Parses native query text into clauses.
pub(crate) fn parse(text: &str, default: BooleanOperation) -> Result<Vec<Clause>, SearchError> {
    let words = split(text)?;
    if words.is_empty() {
        return Err(SearchError::invalid_query("query is empty"));
    }

    let mut parsed: Vec<(Explicit, Option<String>, Matcher)> = Vec::new();
    let mut pending_not = false;
    let mut pending_and = false;
    let mut pending_or = false;

    for word in &words {
        match word.as_str() {
            "AND" | "&&" => {
                let Some(previous) = parsed.last_mut() else {
                    return Err(SearchError::invalid_query("AND without a left operand"));
                };
                if previous.0 == Explicit::Default {
                    previous.0 = Explicit::Must;
                }
                pending_and = true;
                continue;
            }
            "OR" | "||" => {
                let Some(previous) = parsed.last_mut() else {
                    return Err(SearchError::invalid_query("OR without a left operand"));
                };
                if previous.0 == Explicit::Default {
                    previous.0 = Explicit::Should;
                }
                pending_or = true;
                continue;
            }
            "NOT" | "!" => {
                pending_not = true;
                continue;
            }
            _ => {}
        }

        let (mut explicit, rest) = match word.as_bytes().first() {
            Some(b'+') => (Explicit::Must, &word[1..]),
            Some(b'-') => (Explicit::MustNot, &word[1..]),
            _ => (Explicit::Default, word.as_str()),
        };
        if rest.is_empty() {
            return Err(SearchError::invalid_query(format!(
                "operator '{word}' has no clause"
            )));
        }
        if pending_not {
            explicit = Explicit::MustNot;
        } else if explicit == Explicit::Default && pending_and {
            explicit = Explicit::Must;
        } else if explicit == Explicit::Default && pending_or {
            explicit = Explicit::Should;
        }
        pending_not = false;
        pending_and = false;
        pending_or = false;

        let (field, value) = split_field(rest)?;
        parsed.push((explicit, field, matcher(value)?));
    }

    if pending_not || pending_and || pending_or {
        return Err(SearchError::invalid_query("query ends with an operator"));
    }

    let default_occur = match default {
        BooleanOperation::And => Occur::Must,
        BooleanOperation::Or => Occur::Should,
    };
    Ok(parsed
        .into_iter()
        .map(|(explicit, field, matcher)| Clause {
            occur: match explicit {
                Explicit::Default => default_occur,
                Explicit::Must => Occur::Must,
                Explicit::Should => Occur::Should,
                Explicit::MustNot => Occur::MustNot,
            },
            field,
            matcher,
        })
        .collect())
}

/// Splits on whitespace, keeping quoted phrases together.
fn split(text: &str) -> Result<Vec<String>, SearchError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in text.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if in_quotes {
        return Err(SearchError::invalid_query("unbalanced quote"));
    }
    if !current.is_empty() {
        words.push(current);
    }
    Ok(words)
}

fn split_field(clause: &str) -> Result<(Option<String>, &str), SearchError> {
    if clause.starts_with('"') {
        return Ok((None, clause));
    }
    match clause.split_once(':') {
        Some((field, value)) => {
            if field.is_empty() || value.is_empty() {
                return Err(SearchError::invalid_query(format!(
                    "malformed field clause '{clause}'"
                )));
            }
            Ok((Some(field.to_string()), value))
        }
        None => Ok((None, clause)),
    }
}

fn matcher(value: &str) -> Result<Matcher, SearchError> {
    if value == "*" {
        return Ok(Matcher::Any);
    }
    if let Some(phrase) = value.strip_prefix('"') {
        let phrase = phrase
            .strip_suffix('"')
            .ok_or_else(|| SearchError::invalid_query(format!("malformed phrase '{value}'")))?;
        let tokens = tokenize(phrase);
        if tokens.is_empty() {
            return Err(SearchError::invalid_query("empty phrase"));
        }
        return Ok(Matcher::Phrase(tokens));
    }
    if let Some(prefix) = value.strip_suffix('*') {
        return Ok(Matcher::Prefix(prefix.to_lowercase()));
    }
    Ok(Matcher::Term(value.to_lowercase()))
}

/// Lowercased alphanumeric tokens of a text.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(occur: Occur, field: Option<&str>, matcher: Matcher) -> Clause {
        Clause {
            occur,
            field: field.map(str::to_string),
            matcher,
        }
    }

    #[test]
    fn test_default_operation() {
        let clauses = parse("hello world", BooleanOperation::And).unwrap();
        assert!(clauses.iter().all(|c| c.occur == Occur::Must));

        let clauses = parse("hello world", BooleanOperation::Or).unwrap();
        assert!(clauses.iter().all(|c| c.occur == Occur::Should));
    }

    #[test]
    fn test_prefixes_and_fields() {
        let clauses = parse("+title:Hello -draft bod*", BooleanOperation::Or).unwrap();
        assert_eq!(
            clauses,
            [
                clause(Occur::Must, Some("title"), Matcher::Term("hello".into())),
                clause(Occur::MustNot, None, Matcher::Term("draft".into())),
                clause(Occur::Should, None, Matcher::Prefix("bod".into())),
            ]
        );
    }

    #[test]
    fn test_phrases() {
        let clauses = parse("body:\"Hello  World\"", BooleanOperation::And).unwrap();
        assert_eq!(
            clauses[0].matcher,
            Matcher::Phrase(vec!["hello".into(), "world".into()])
        );
    }

    #[test]
    fn test_explicit_operators() {
        let clauses = parse("a OR b NOT c", BooleanOperation::And).unwrap();
        let occurs: Vec<Occur> = clauses.iter().map(|c| c.occur).collect();
        assert_eq!(occurs, [Occur::Should, Occur::Should, Occur::MustNot]);

        let clauses = parse("a AND b", BooleanOperation::Or).unwrap();
        assert!(clauses.iter().all(|c| c.occur == Occur::Must));
    }

    #[test]
    fn test_match_all() {
        let clauses = parse("*", BooleanOperation::And).unwrap();
        assert_eq!(clauses[0].matcher, Matcher::Any);
    }

    #[test]
    fn test_malformed_queries() {
        for text in ["", "   ", "\"open", "title:", ":value", "+", "a AND", "OR b"] {
            assert!(
                matches!(
                    parse(text, BooleanOperation::And),
                    Err(SearchError::InvalidQuery { .. })
                ),
                "expected '{text}' to be rejected"
            );
        }
    }
}
