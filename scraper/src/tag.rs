//! The modem renders most labels through an `i18n("...")` call in an inline script instead of
//! shipping the text itself. These helpers unwrap such a call and translate the handful of codes
//! whose meaning matters for the channel tables.

/// Tag code emitted inside the heading of the login page.
pub const LOGIN_AREA_CODE: &str = "LOGIN_AREA_LABEL2=";

const KNOWN_CODES: [(&str, &str); 3] = [
    ("TAG_UPC_T37", "N/A"),
    ("TAG_UPC_T38", "Locked"),
    ("TAG_UPC_T39", "Unlocked"),
];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("not an i18n placeholder: {0:?}")]
pub struct MalformedTag(pub String);

/// Strips the `i18n("...")` framing and returns the code inside.
pub fn bare_code(script: &str) -> Result<&str, MalformedTag> {
    let malformed = || MalformedTag(script.trim().to_string());
    let call = script.trim().trim_end_matches(';').trim_end();
    let argument = call
        .strip_prefix("i18n(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map(str::trim)
        .ok_or_else(malformed)?;
    ['"', '\'']
        .into_iter()
        .find_map(|quote| argument.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)))
        .ok_or_else(malformed)
}

/// Maps a known code to its meaning; anything else is returned as is.
pub fn resolve(code: &str) -> &str {
    KNOWN_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map_or(code, |(_, value)| *value)
}

/// [`bare_code`] followed by [`resolve`].
pub fn decode(script: &str) -> Result<&str, MalformedTag> {
    bare_code(script).map(resolve)
}
