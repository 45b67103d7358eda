//! Media type identifier handling.
//!
//! Identifiers are usually MIME-style strings such as
//! `application/vnd.example+json`, but any non-empty string is accepted.
//! The registry keys media types by their *canonical* form, which drops the
//! structured syntax suffix (`+json`) and the `view` parameter, so that
//! `application/vnd.example` and `application/vnd.example+json; view=tiny`
//! name the same media type.
//!
//! ## Examples
//!
//! ```
//! use apidsl_define::identifier::{canonical_identifier, type_name_from_identifier};
//!
//! assert_eq!(
//!     canonical_identifier("Application/Vnd.Example+JSON; view=tiny"),
//!     "application/vnd.example"
//! );
//! assert_eq!(type_name_from_identifier("application/vnd.example.parent+json"), "ExampleParent");
//! ```

/// Parameter appended to an element identifier to name its collection.
pub const COLLECTION_PARAM: (&str, &str) = ("type", "collection");

/// Suffix appended to an element type name to name its collection.
pub const COLLECTION_SUFFIX: &str = "Collection";

/// A parsed media type identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIdentifier {
    /// Lowercased `type/subtype`, suffix included.
    pub base: String,
    /// Parameters in declaration order, keys lowercased.
    pub params: Vec<(String, String)>,
}

impl ParsedIdentifier {
    /// Formats the identifier back into `base; key=value` form.
    pub fn format(&self) -> String {
        let mut out = self.base.clone();
        for (key, value) in &self.params {
            out.push_str("; ");
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }
        out
    }

    fn set_param(&mut self, key: &str, value: &str) {
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some(param) => param.1 = value.to_string(),
            None => self.params.push((key.to_string(), value.to_string())),
        }
    }
}

/// Parses a media type identifier.
///
/// ## Errors
///
/// Returns a description of the problem when the base is not of the form
/// `type/subtype` or a parameter is not of the form `key=value`.
///
/// ## Examples
///
/// ```
/// use apidsl_define::identifier::parse_media_type;
///
/// let parsed = parse_media_type("application/json; charset=\"utf-8\"").unwrap();
/// assert_eq!(parsed.base, "application/json");
/// assert_eq!(parsed.params, vec![("charset".to_string(), "utf-8".to_string())]);
///
/// assert!(parse_media_type("json").is_err());
/// ```
pub fn parse_media_type(identifier: &str) -> Result<ParsedIdentifier, String> {
    let mut parts = identifier.split(';');
    let base = parts.next().unwrap_or_default().trim().to_lowercase();

    let mut halves = base.splitn(2, '/');
    let kind = halves.next().unwrap_or_default();
    let subtype = halves.next().unwrap_or_default();
    if kind.is_empty() || subtype.is_empty() || subtype.contains('/') {
        return Err(format!("{identifier:?} is not of the form type/subtype"));
    }
    if base.chars().any(char::is_whitespace) {
        return Err(format!("{identifier:?} contains whitespace in its type"));
    }

    let mut params = Vec::new();
    for raw in parts {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let Some((key, value)) = raw.split_once('=') else {
            return Err(format!("parameter {raw:?} is not of the form key=value"));
        };
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return Err(format!("parameter {raw:?} has an empty name"));
        }
        let value = value.trim().trim_matches('"').to_string();
        params.push((key, value));
    }

    Ok(ParsedIdentifier { base, params })
}

/// Returns the registry key for an identifier.
///
/// Identifiers that fail to parse are trimmed and lowercased so that they
/// still collide with themselves.
pub fn canonical_identifier(identifier: &str) -> String {
    let Ok(mut parsed) = parse_media_type(identifier) else {
        return identifier.trim().to_lowercase();
    };
    if let Some(plus) = parsed.base.find('+') {
        parsed.base.truncate(plus);
    }
    parsed.params.retain(|(k, _)| k != "view");
    parsed.format()
}

/// Derives a type name from an identifier.
///
/// Takes the subtype, strips the `+suffix` and the `vnd.` prefix, then
/// title-cases the remaining dot, dash or underscore separated words. The
/// result is empty when nothing usable remains.
///
/// ## Examples
///
/// ```
/// use apidsl_define::identifier::type_name_from_identifier;
///
/// assert_eq!(type_name_from_identifier("application/vnd.parent+json"), "Parent");
/// assert_eq!(type_name_from_identifier("application/vnd.goa.error"), "GoaError");
/// assert_eq!(type_name_from_identifier("text/plain"), "Plain");
/// assert_eq!(type_name_from_identifier(""), "");
/// ```
pub fn type_name_from_identifier(identifier: &str) -> String {
    let base = identifier.split(';').next().unwrap_or_default().trim();
    let last = base.rsplit('/').next().unwrap_or_default();
    let last = match last.find('+') {
        Some(plus) if plus > 0 => &last[..plus],
        _ => last,
    };
    let last = last.strip_prefix("vnd.").unwrap_or(last);

    last.split(['.', '-', '_'])
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect()
}

/// Identifier of the collection wrapping the given element identifier.
///
/// ## Examples
///
/// ```
/// use apidsl_define::identifier::collection_identifier;
///
/// assert_eq!(
///     collection_identifier("application/vnd.example+json"),
///     "application/vnd.example+json; type=collection"
/// );
/// ```
pub fn collection_identifier(element_identifier: &str) -> String {
    let (key, value) = COLLECTION_PARAM;
    match parse_media_type(element_identifier) {
        Ok(mut parsed) => {
            parsed.params.retain(|(k, _)| k != "view");
            parsed.set_param(key, value);
            parsed.format()
        }
        Err(_) => format!("{element_identifier}; {key}={value}"),
    }
}

/// Type name of the collection wrapping an element type name.
pub fn collection_type_name(element_type_name: &str) -> String {
    format!("{element_type_name}{COLLECTION_SUFFIX}")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
