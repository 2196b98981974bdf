//! Name conversion from content-model aliases to GraphQL names.

/// Converts a property alias to a camel-cased field name.
///
/// Separators (anything that is not an ASCII letter or digit) are dropped
/// and start a new word. A leading run of capitals is lower-cased as an
/// acronym, keeping the capital that starts the next word:
///
/// - `bodyText` -> `bodyText`
/// - `Title` -> `title`
/// - `URLPath` -> `urlPath`
/// - `hero_image` -> `heroImage`
#[must_use]
pub fn to_camel_case(alias: &str) -> String {
    let mut out = String::with_capacity(alias.len());
    for (i, word) in words(alias).enumerate() {
        if i == 0 {
            out.push_str(&lower_leading(word));
        } else {
            out.push_str(&capitalize_first(word));
        }
    }
    out
}

/// Converts a content type or index alias to a Pascal-cased type name.
#[must_use]
pub fn to_type_name(alias: &str) -> String {
    words(alias).map(capitalize_first).collect()
}

/// Checks if a name is valid for GraphQL.
///
/// GraphQL names must match `[_a-zA-Z][_a-zA-Z0-9]*`, and names starting
/// with `__` are reserved for introspection.
#[must_use]
pub fn is_valid_graphql_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Makes an arbitrary index field name usable as a GraphQL field name.
///
/// Invalid characters become `_`, a leading digit gets a `_` prefix, and a
/// leading `__` is collapsed to `_`.
#[must_use]
pub fn sanitize_field_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    if out.starts_with(|ch: char| ch.is_ascii_digit()) {
        out.insert(0, '_');
    }
    while out.starts_with("__") {
        out.remove(0);
    }
    out
}

fn words(alias: &str) -> impl Iterator<Item = &str> {
    alias
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

fn lower_leading(word: &str) -> String {
    let upper_run = word.chars().take_while(char::is_ascii_uppercase).count();
    let total = word.chars().count();
    let lower = match upper_run {
        0 | 1 => upper_run,
        n if n == total => n,
        n => n - 1,
    };
    word.chars()
        .enumerate()
        .map(|(i, ch)| if i < lower { ch.to_ascii_lowercase() } else { ch })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("bodyText"), "bodyText");
        assert_eq!(to_camel_case("Title"), "title");
        assert_eq!(to_camel_case("URLPath"), "urlPath");
        assert_eq!(to_camel_case("ID"), "id");
        assert_eq!(to_camel_case("hero_image"), "heroImage");
        assert_eq!(to_camel_case("meta-description"), "metaDescription");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_type_name() {
        assert_eq!(to_type_name("blogPost"), "BlogPost");
        assert_eq!(to_type_name("blog-post"), "BlogPost");
        assert_eq!(to_type_name("External"), "External");
    }

    #[test]
    fn test_valid_graphql_names() {
        assert!(is_valid_graphql_name("Patient"));
        assert!(is_valid_graphql_name("_id"));
        assert!(is_valid_graphql_name("heroImage2"));
        assert!(!is_valid_graphql_name(""));
        assert!(!is_valid_graphql_name("2col"));
        assert!(!is_valid_graphql_name("us-core"));
        assert!(!is_valid_graphql_name("__typename"));
    }

    #[test]
    fn test_sanitize_field_name() {
        assert_eq!(sanitize_field_name("nodeName"), "nodeName");
        assert_eq!(sanitize_field_name("__NodeId"), "_NodeId");
        assert_eq!(sanitize_field_name("umb.path"), "umb_path");
        assert_eq!(sanitize_field_name("1st"), "_1st");
    }
}
