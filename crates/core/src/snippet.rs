use crate::models::NO_EXTRACTED_INFO;

/// Byte range of the first case-insensitive occurrence of `needle`.
///
/// Matching compares full lowercase expansions char by char, so the
/// range always lies on char boundaries of `haystack` even when case
/// folding changes the byte length.
pub fn find_case_insensitive(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return Some((0, 0));
    }

    haystack.char_indices().find_map(|(start, _)| {
        match_len(&haystack[start..], &needle).map(|len| (start, start + len))
    })
}

fn match_len(candidate: &str, needle: &[char]) -> Option<usize> {
    let mut matched = 0;
    for (offset, ch) in candidate.char_indices() {
        for lower in ch.to_lowercase() {
            if needle.get(matched) != Some(&lower) {
                return None;
            }
            matched += 1;
        }
        if matched == needle.len() {
            return Some(offset + ch.len_utf8());
        }
    }
    None
}

/// The `window` characters right after the first match of `term`, trimmed.
///
/// Returns `not_found` when the term does not occur and
/// [`NO_EXTRACTED_INFO`] when the window is blank.
pub fn extract_snippet(text: &str, term: &str, window: usize, not_found: &str) -> String {
    let Some((_, end)) = find_case_insensitive(text, term) else {
        return not_found.to_string();
    };

    let following: String = text[end..].chars().take(window).collect();
    let trimmed = following.trim();
    if trimmed.is_empty() {
        NO_EXTRACTED_INFO.to_string()
    } else {
        trimmed.to_string()
    }
}
