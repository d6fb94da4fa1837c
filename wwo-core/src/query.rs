//! Query-string assembly for the API endpoints.

use url::form_urlencoded;

/// Add a query string to a base URL.
///
/// `parameters` is a flat list of name/value strings; names and values are
/// form-urlencoded independently and joined in the order given. An empty
/// list returns the base unchanged.
///
/// # Panics
///
/// Panics when the list length is odd. Parameters come in pairs; anything
/// else is a bug at the call site, not a recoverable condition.
pub fn assemble_url(base: &str, parameters: &[&str]) -> String {
    assert!(parameters.len() % 2 == 0, "parameters must come in (name, value) pairs");
    if parameters.is_empty() {
        return base.to_string();
    }
    let mut query = form_urlencoded::Serializer::new(String::new());
    for pair in parameters.chunks_exact(2) {
        query.append_pair(pair[0], pair[1]);
    }
    format!("{base}?{}", query.finish())
}

/// Turn an ordered pair list into the flat form `assemble_url` takes.
pub fn flatten<'a>(pairs: &'a [(&'a str, String)]) -> Vec<&'a str> {
    let mut flat = Vec::with_capacity(pairs.len() * 2);
    for (name, value) in pairs {
        flat.push(*name);
        flat.push(value.as_str());
    }
    flat
}

/// Replace the value of the `name` pair, leaving everything else untouched.
///
/// Credential substitution happens here, on the pair list, so the same
/// parameter set renders once with a placeholder for logging and once with
/// the real key, without the encoder knowing about either.
pub(crate) fn with_credential(
    mut pairs: Vec<(&'static str, String)>,
    name: &str,
    value: &str,
) -> Vec<(&'static str, String)> {
    for pair in &mut pairs {
        if pair.0 == name {
            pair.1 = value.to_string();
        }
    }
    pairs
}
