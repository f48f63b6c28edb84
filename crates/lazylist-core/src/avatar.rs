//! Placeholder avatars for items without media.
//!
//! Placeholders are a pure function of the display name: the same name
//! always yields the same initials and colors, so rows do not flicker
//! between renders.

use crate::item::Placeholder;

/// Background/text color pairs.
const PALETTE: &[(&str, &str)] = &[
    ("#1e88e5", "#ffffff"),
    ("#43a047", "#ffffff"),
    ("#e53935", "#ffffff"),
    ("#8e24aa", "#ffffff"),
    ("#00897b", "#ffffff"),
    ("#f4511e", "#ffffff"),
    ("#3949ab", "#ffffff"),
    ("#6d4c41", "#ffffff"),
    ("#fdd835", "#212121"),
    ("#c0ca33", "#212121"),
    ("#4fc3f7", "#0d2a3a"),
    ("#ffb74d", "#3e2200"),
];

/// Honorifics that do not count as significant words.
const HONORIFICS: &[&str] = &["dr", "mr", "mrs", "ms", "miss", "prof", "er", "sri", "smt"];

/// Generates deterministic placeholder avatars.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvatarFallbackGenerator;

impl AvatarFallbackGenerator {
    /// Generate the placeholder for a display name.
    ///
    /// Initials are the first letters of the first two significant words;
    /// a blank name yields `"?"`.
    ///
    /// # Example
    ///
    /// ```
    /// use lazylist_core::AvatarFallbackGenerator;
    ///
    /// let a = AvatarFallbackGenerator.generate("Dr. Asha Menon");
    /// assert_eq!(a.initials, "AM");
    /// assert_eq!(a, AvatarFallbackGenerator.generate("Dr. Asha Menon"));
    /// ```
    pub fn generate(&self, display_name: &str) -> Placeholder {
        let initials = initials(display_name);
        let (background, text) = PALETTE[palette_index(display_name)];

        Placeholder {
            initials,
            background_color: background.to_string(),
            text_color: text.to_string(),
        }
    }
}

fn initials(name: &str) -> String {
    let significant: Vec<&str> = name
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .filter(|w| !HONORIFICS.contains(&w.to_lowercase().as_str()))
        .collect();

    // A name made only of honorifics still deserves a letter.
    let words: Vec<&str> = if significant.is_empty() {
        name.split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| !w.is_empty())
            .collect()
    } else {
        significant
    };

    let letters: String = words
        .iter()
        .take(2)
        .filter_map(|w| w.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

/// FNV-1a over the normalized name, so the mapping is stable across runs.
fn palette_index(name: &str) -> usize {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.trim().to_lowercase().bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash as usize % PALETTE.len()
}
