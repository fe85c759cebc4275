const RESERVED: &[char] = &[
    '\\', '"', '\'', '=', '+', '-', '*', '?', ':', '{', '}', '[', ']', '(', ')', '^', '~', '!',
    '|', '&', '/',
];

/// Backslash-escapes every CQL reserved character in one left-to-right pass.
pub fn escape_cql_term(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 8);
    for ch in term.chars() {
        if RESERVED.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Percent-decodes a raw term. Invalid UTF-8 is replaced lossily.
pub fn decode_term(raw: &str) -> String {
    let bytes = urlencoding::decode_binary(raw.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// `text ~ "<escaped>"` for an already decoded term.
pub fn text_match_query(decoded_term: &str) -> String {
    format!("text ~ \"{}\"", escape_cql_term(decoded_term))
}
