//! Small text helpers shared by the catalogs.

/// Title-case a string word by word: a letter is uppercased when it follows
/// a non-letter, lowercased otherwise (`"côte d'ivoire"` → `"Côte D'Ivoire"`).
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

/// Key used for case and whitespace insensitive name matching.
pub fn normalize_key(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercased, accent-free form used by the fuzzy country search.
pub fn fold_ascii(s: &str) -> String {
    unidecode::unidecode(s).trim().to_lowercase()
}

/// Accent, case, space and hyphen insensitive key for subregion names.
pub fn squash_key(s: &str) -> String {
    fold_ascii(s)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_follows_word_boundaries() {
        assert_eq!(title_case("united states"), "United States");
        assert_eq!(title_case("KOREA, SOUTH"), "Korea, South");
        assert_eq!(title_case("guinea-bissau"), "Guinea-Bissau");
        assert_eq!(title_case("owid_wrl"), "Owid_Wrl");
    }

    #[test]
    fn normalize_key_ignores_case_and_spacing() {
        assert_eq!(normalize_key("  Western   EUROPE "), "western europe");
    }

    #[test]
    fn fold_ascii_strips_accents() {
        assert_eq!(fold_ascii(" Côte d'Ivoire "), "cote d'ivoire");
        assert_eq!(fold_ascii("Türkiye"), "turkiye");
    }

    #[test]
    fn squash_key_drops_separators() {
        assert_eq!(squash_key("Île-de-France"), "iledefrance");
        assert_eq!(squash_key("Val d'Oise"), "vald'oise");
    }
}
