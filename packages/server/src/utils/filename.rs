/// Reduce a client-supplied filename to something safe to store and echo back.
///
/// Directory components are dropped, whitespace becomes `_`, anything outside
/// ASCII letters, digits, `.`, `-` and `_` is removed, and leading dots are
/// stripped so the result can never be hidden or traverse upwards. Returns
/// `fallback` when nothing survives.
pub fn secure_filename(raw: &str, fallback: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('_'),
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '-' | '_' => Some(c),
            _ => None,
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').trim_matches('_');
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Build an inline `Content-Disposition` header value.
///
/// The plain `filename` parameter carries an ASCII-only rendition; the
/// original name goes into the RFC 5987 `filename*` parameter.
pub fn content_disposition_value(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download"
    } else {
        ascii_safe.as_str()
    };

    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => String::from(b as char),
            _ => format!("%{b:02X}"),
        })
        .collect();

    format!("inline; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}")
}
