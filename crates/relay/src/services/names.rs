/// Used in the greeting when the payload carries no usable name.
pub const FIRST_NAME_PLACEHOLDER: &str = "there";
/// Used in subjects and review bodies when the payload carries no name.
pub const DISPLAY_NAME_PLACEHOLDER: &str = "Unknown Contact";

fn sanitize(token: &str) -> String {
    // Keep letters, digits and the punctuation that shows up in real names.
    token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '\'')
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derives a first name from a display name: the first whitespace-separated
/// token, stripped of stray punctuation. Falls back to [`FIRST_NAME_PLACEHOLDER`].
pub fn derive_first_name(name: Option<&str>) -> String {
    name.and_then(|n| n.split_whitespace().next())
        // An address is not a name.
        .filter(|token| !token.contains('@'))
        .map(sanitize)
        .filter(|token| !token.is_empty())
        .map(|token| capitalize(&token))
        .unwrap_or_else(|| FIRST_NAME_PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_token_of_full_name() {
        assert_eq!(derive_first_name(Some("Jane Doe")), "Jane");
        assert_eq!(derive_first_name(Some("  Mary-Kate   O'Neil ")), "Mary-Kate");
    }

    #[test]
    fn strips_punctuation_and_capitalizes() {
        assert_eq!(derive_first_name(Some("jane, doe")), "Jane");
        assert_eq!(derive_first_name(Some("\"zoë\"")), "Zoë");
    }

    #[test]
    fn falls_back_to_placeholder() {
        assert_eq!(derive_first_name(None), "there");
        assert_eq!(derive_first_name(Some("")), "there");
        assert_eq!(derive_first_name(Some("   ")), "there");
        assert_eq!(derive_first_name(Some("!!!")), "there");
        assert_eq!(derive_first_name(Some("jane@x.com")), "there");
    }
}
