//! Casing helpers for resource names.

/// Plural form used in collection paths: `+s`, or `y → ies` after a consonant.
pub fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        let before_y = stem.chars().last();
        if matches!(before_y, Some(c) if !is_vowel(c)) {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}

/// Inverse of [`pluralize`]: strips `ies → y`, otherwise a trailing `s`.
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

/// First letter upper-cased, the rest lower-cased.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Collection segment for a resource: `Category` → `categories`.
pub fn collection_segment(resource_name: &str) -> String {
    pluralize(&resource_name.to_lowercase())
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}
