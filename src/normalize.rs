//! Title normalization for catalog searches
//!
//! Anime titles as returned by the recommendation service often carry
//! punctuation, season markers, and media-type suffixes that hurt fuzzy
//! search recall. This module produces a canonical form of a title plus the
//! ordered list of search variations the resolver tries against the catalog.

/// Characters replaced with a space before token cleanup
const PUNCTUATION: &[char] = &[
    ':', '-', '～', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '_', '+', '=',
];

/// Trailing standalone tokens stripped from titles (case-insensitive)
const MEDIA_TYPE_TOKENS: &[&str] = &["tv", "movie", "ova", "special"];

/// Produces the canonical form of an anime title.
///
/// Replaces punctuation with spaces, strips trailing media-type tokens
/// (`TV`, `Movie`, `OVA`, `Special`) and trailing `Season <n>` / `Part <n>`
/// fragments, and collapses whitespace. The suffix stripping repeats until
/// nothing more can be removed, so the function is idempotent:
/// `clean_title(clean_title(x)) == clean_title(x)` for any input.
pub fn clean_title(name: &str) -> String {
    let despecialed: String = name
        .chars()
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();

    let mut tokens: Vec<&str> = despecialed.split_whitespace().collect();

    loop {
        let before = tokens.len();

        if let Some(last) = tokens.last() {
            if MEDIA_TYPE_TOKENS.contains(&last.to_ascii_lowercase().as_str()) {
                tokens.pop();
            }
        }

        // Trailing "Season 2" / "Part 3" style fragments
        if tokens.len() >= 2 {
            let n = tokens.len();
            let keyword = tokens[n - 2].to_ascii_lowercase();
            let is_number = !tokens[n - 1].is_empty()
                && tokens[n - 1].chars().all(|c| c.is_ascii_digit());
            if (keyword == "season" || keyword == "part") && is_number {
                tokens.truncate(n - 2);
            }
        }

        if tokens.len() == before {
            break;
        }
    }

    tokens.join(" ")
}

/// Returns the ordered list of search strings tried for a title.
///
/// Always four entries, in priority order:
/// 1. the original name, unchanged
/// 2. the cleaned name
/// 3. the substring before the first colon (the whole name if none)
/// 4. the first word of the cleaned name
///
/// Duplicates are permitted; the resolver stops at the first variation that
/// yields a verified image rather than filtering the list up front.
pub fn search_variations(name: &str) -> Vec<String> {
    let cleaned = clean_title(name);
    let before_colon = name.split(':').next().unwrap_or(name).to_string();
    let first_word = cleaned.split(' ').next().unwrap_or("").to_string();

    vec![name.to_string(), cleaned, before_colon, first_word]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_title_replaces_punctuation_with_spaces() {
        assert_eq!(clean_title("Fate/stay night: Heaven's Feel"), "Fate/stay night Heaven's Feel");
        assert_eq!(clean_title("Re:Zero"), "Re Zero");
        assert_eq!(clean_title("K-On!"), "K On");
    }

    #[test]
    fn test_clean_title_collapses_whitespace() {
        assert_eq!(clean_title("One    Piece"), "One Piece");
        assert_eq!(clean_title("  Bleach  "), "Bleach");
    }

    #[test]
    fn test_clean_title_strips_media_type_suffix() {
        assert_eq!(clean_title("Naruto TV"), "Naruto");
        assert_eq!(clean_title("Koe no Katachi Movie"), "Koe no Katachi");
        assert_eq!(clean_title("Hellsing Ultimate OVA"), "Hellsing Ultimate");
        assert_eq!(clean_title("Gintama special"), "Gintama");
    }

    #[test]
    fn test_clean_title_keeps_media_type_word_mid_title() {
        // Only a trailing standalone token is stripped
        assert_eq!(clean_title("Movie Battle Arc"), "Movie Battle Arc");
    }

    #[test]
    fn test_clean_title_strips_season_and_part_fragments() {
        assert_eq!(clean_title("Attack on Titan Season 3"), "Attack on Titan");
        assert_eq!(clean_title("Mob Psycho 100 Part 2"), "Mob Psycho 100");
        // Both, stacked
        assert_eq!(clean_title("X Season 2 Part 1"), "X");
    }

    #[test]
    fn test_clean_title_keeps_bare_season_word() {
        // "Season" without a number is part of the title
        assert_eq!(clean_title("A Certain Season"), "A Certain Season");
    }

    #[test]
    fn test_clean_title_is_idempotent() {
        let inputs = [
            "Naruto: Shippuuden",
            "Code Geass - Hangyaku no Lelouch",
            "Mobile Suit Gundam OVA Special",
            "Shingeki no Kyojin Season 3 Part 2 TV",
            "～Aria～",
            "",
            "TV",
        ];
        for input in inputs {
            let once = clean_title(input);
            assert_eq!(clean_title(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_clean_title_can_strip_everything() {
        assert_eq!(clean_title("TV"), "");
        assert_eq!(clean_title("Season 2"), "");
    }

    #[test]
    fn test_variations_always_has_four_entries() {
        for name in ["Naruto", "Re:Zero Season 2", "", "One Piece Movie"] {
            assert_eq!(search_variations(name).len(), 4);
        }
    }

    #[test]
    fn test_variations_first_entry_is_original_name() {
        let name = "Code Geass: Hangyaku no Lelouch R2";
        assert_eq!(search_variations(name)[0], name);
    }

    #[test]
    fn test_variations_third_entry_is_prefix_before_colon() {
        let variations = search_variations("Naruto: Shippuuden");
        assert_eq!(variations[2], "Naruto");
    }

    #[test]
    fn test_variations_third_entry_equals_name_without_colon() {
        let variations = search_variations("One Piece");
        assert_eq!(variations[2], "One Piece");
    }

    #[test]
    fn test_variations_fourth_entry_is_first_cleaned_word() {
        let variations = search_variations("Shingeki no Kyojin Season 3");
        assert_eq!(variations[3], "Shingeki");
    }

    #[test]
    fn test_variations_duplicates_are_kept() {
        // A single-word title collapses every variation to the same string
        let variations = search_variations("Bleach");
        assert_eq!(variations, vec!["Bleach", "Bleach", "Bleach", "Bleach"]);
    }
}
