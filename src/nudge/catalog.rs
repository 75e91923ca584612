//! Canned response phrases per (language, emotion).

use std::collections::HashMap;

use super::emotion::Emotion;

pub const FALLBACK_LANGUAGE: &str = "en";

/// Phrase table keyed by language code, then emotion.
///
/// English always carries an entry for every [`Emotion`]; entries are only
/// ever appended to, so that holds for the lifetime of the catalog.
#[derive(Debug, Clone)]
pub struct ResponseCatalog {
    languages: HashMap<String, HashMap<Emotion, Vec<String>>>,
}

impl Default for ResponseCatalog {
    fn default() -> Self {
        let mut catalog = Self {
            languages: HashMap::new(),
        };
        catalog.add_language(FALLBACK_LANGUAGE, owned(ENGLISH));
        catalog.add_language("kn", owned(KANNADA));
        catalog.add_language("hi", owned(HINDI));
        catalog
    }
}

impl ResponseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alternatives for `emotion` in `language`.
    ///
    /// Lookup order: language[emotion], en[emotion], language[neutral],
    /// en[neutral]. Empty entries count as missing.
    pub fn phrases_for(&self, language: &str, emotion: Emotion) -> &[String] {
        let language = normalize_language(language);
        let found = [
            (language.as_str(), emotion),
            (FALLBACK_LANGUAGE, emotion),
            (language.as_str(), Emotion::Neutral),
            (FALLBACK_LANGUAGE, Emotion::Neutral),
        ]
        .into_iter()
        .find_map(|(lang, emotion)| self.lookup(lang, emotion))
        .unwrap_or(&[]);
        found
    }

    /// Whether `language` itself (not the English fallback) has phrases for
    /// `emotion`.
    pub fn has_phrases(&self, language: &str, emotion: Emotion) -> bool {
        self.lookup(&normalize_language(language), emotion).is_some()
    }

    /// Append an English alternative for `emotion`.
    pub fn add_phrase(&mut self, emotion: Emotion, phrase: impl Into<String>) {
        self.languages
            .entry(FALLBACK_LANGUAGE.to_string())
            .or_default()
            .entry(emotion)
            .or_default()
            .push(phrase.into());
    }

    /// Merge phrases into `language`, emotion by emotion. Existing phrases
    /// are kept; new ones are appended.
    pub fn add_language<I, P, S>(&mut self, language: &str, responses: I)
    where
        I: IntoIterator<Item = (Emotion, P)>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = self
            .languages
            .entry(normalize_language(language))
            .or_default();
        for (emotion, phrases) in responses {
            table
                .entry(emotion)
                .or_default()
                .extend(phrases.into_iter().map(Into::into));
        }
    }

    /// Known language codes, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.languages.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    fn lookup(&self, language: &str, emotion: Emotion) -> Option<&[String]> {
        self.languages
            .get(language)
            .and_then(|table| table.get(&emotion))
            .filter(|phrases| !phrases.is_empty())
            .map(Vec::as_slice)
    }
}

pub fn normalize_language(language: &str) -> String {
    language.trim().to_ascii_lowercase()
}

fn owned(table: &[(Emotion, &[&str])]) -> Vec<(Emotion, Vec<String>)> {
    table
        .iter()
        .map(|(emotion, phrases)| (*emotion, phrases.iter().map(|p| p.to_string()).collect()))
        .collect()
}

// ── Built-in phrases ───────────────────────────────────────

const ENGLISH: &[(Emotion, &[&str])] = &[
    (
        Emotion::Happy,
        &[
            "Keep smiling!",
            "Your joy is contagious!",
            "Your happiness brightens the room!",
        ],
    ),
    (
        Emotion::Sad,
        &[
            "This will pass.",
            "I'm here for you.",
            "Would you like to talk about it?",
        ],
    ),
    (
        Emotion::Angry,
        &[
            "Take a deep breath.",
            "Count to ten slowly.",
            "Try to find your calm center.",
        ],
    ),
    (
        Emotion::Surprised,
        &[
            "Life is full of surprises!",
            "Wow! That's unexpected!",
            "Interesting development!",
        ],
    ),
    (
        Emotion::Fear,
        &[
            "You're safe now.",
            "Focus on the present moment.",
            "This feeling will fade.",
        ],
    ),
    (
        Emotion::Disgust,
        &[
            "Let it go.",
            "Change your focus.",
            "Don't let it bother you.",
        ],
    ),
    (
        Emotion::Neutral,
        &[
            "How are you really feeling?",
            "Take a moment to reflect.",
            "What's on your mind?",
        ],
    ),
];

const KANNADA: &[(Emotion, &[&str])] = &[
    (
        Emotion::Happy,
        &[
            "ಮುಗುಳು ನಗು!",
            "ನಿಮ್ಮ ಸಂತೋಷ ಸಾಂಕ್ರಾಮಿಕ!",
            "ನೀವು ಬಹಳ ಸಂತೋಷದಿಂದ ಕಾಣುತ್ತೀರಿ!",
        ],
    ),
    (
        Emotion::Sad,
        &[
            "ಇದು ಕಳೆದು ಹೋಗುತ್ತದೆ.",
            "ನಾನು ನಿಮ್ಮ ಜೊತೆ ಇದ್ದೇನೆ.",
            "ನೀವು ದುಃಖಿತರಾಗಿರಬಹುದು.",
        ],
    ),
    (
        Emotion::Angry,
        &["ನೀವು ಕೋಪಗೊಂಡಿರುವಂತೆ ಕಾಣುತ್ತೀರಿ. ಗಾಳಿ ಉಚ್ಛ್ವಾಸ ಮಾಡಿ."],
    ),
    (Emotion::Surprised, &["ನೀವು ಆಶ್ಚರ್ಯಚಕಿತರಾಗಿದ್ದೀರಿ!"]),
    (Emotion::Neutral, &["ನೀವು ಶಾಂತವಾಗಿ ಕಾಣುತ್ತೀರಿ."]),
];

const HINDI: &[(Emotion, &[&str])] = &[
    (
        Emotion::Happy,
        &[
            "मुस्कुराते रहो!",
            "आपकी खुशी संक्रामक है!",
            "आप बहुत खुश लग रहे हैं!",
        ],
    ),
    (
        Emotion::Sad,
        &["यह बीत जाएगा।", "मैं आपके साथ हूं।", "आप उदास लग रहे हैं।"],
    ),
    (Emotion::Angry, &["आप क्रोधित लग रहे हैं। गहरी सांस लें।"]),
    (Emotion::Surprised, &["आप हैरान लग रहे हैं!"]),
    (Emotion::Neutral, &["आप शांत लग रहे हैं।"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_covers_every_emotion() {
        let catalog = ResponseCatalog::new();
        for emotion in Emotion::ALL {
            assert!(
                catalog.has_phrases("en", emotion),
                "English is missing {}",
                emotion
            );
        }
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let catalog = ResponseCatalog::new();
        assert_eq!(
            catalog.phrases_for("xx", Emotion::Happy),
            catalog.phrases_for("en", Emotion::Happy)
        );
    }

    #[test]
    fn missing_emotion_in_language_falls_back_to_english_emotion() {
        let catalog = ResponseCatalog::new();
        // Hindi has no fear entry.
        assert_eq!(
            catalog.phrases_for("hi", Emotion::Fear),
            catalog.phrases_for("en", Emotion::Fear)
        );
    }

    #[test]
    fn language_code_is_normalized_before_lookup() {
        let catalog = ResponseCatalog::new();
        let phrases = catalog.phrases_for("  HI ", Emotion::Happy);
        assert!(!phrases.is_empty());
        assert_eq!(phrases, catalog.phrases_for("hi", Emotion::Happy));
    }

    #[test]
    fn language_neutral_precedes_english_neutral() {
        let mut catalog = ResponseCatalog::new();
        catalog.add_language("de", [(Emotion::Neutral, vec!["Alles gut?"])]);
        assert_eq!(catalog.phrases_for("de", Emotion::Neutral), ["Alles gut?"]);
    }

    #[test]
    fn language_codes_are_normalized() {
        let catalog = ResponseCatalog::new();
        assert_eq!(
            catalog.phrases_for(" HI ", Emotion::Happy),
            catalog.phrases_for("hi", Emotion::Happy)
        );
    }

    #[test]
    fn add_phrase_appends_to_english() {
        let mut catalog = ResponseCatalog::new();
        let before = catalog.phrases_for("en", Emotion::Happy).len();
        catalog.add_phrase(Emotion::Happy, "You're doing great!");
        let phrases = catalog.phrases_for("en", Emotion::Happy);
        assert_eq!(phrases.len(), before + 1);
        assert_eq!(phrases.last().map(String::as_str), Some("You're doing great!"));
    }

    #[test]
    fn add_language_merges_instead_of_overwriting() {
        let mut catalog = ResponseCatalog::new();
        catalog.add_language("de", [(Emotion::Happy, vec!["Weiter so!"])]);
        catalog.add_language(
            "de",
            [
                (Emotion::Happy, vec!["Deine Freude ist ansteckend!"]),
                (Emotion::Sad, vec!["Das wird vorübergehen."]),
            ],
        );
        assert_eq!(
            catalog.phrases_for("de", Emotion::Happy),
            ["Weiter so!", "Deine Freude ist ansteckend!"]
        );
        assert_eq!(catalog.phrases_for("de", Emotion::Sad), ["Das wird vorübergehen."]);
        assert_eq!(catalog.languages(), vec!["de", "en", "hi", "kn"]);
    }

    #[test]
    fn empty_entry_counts_as_missing() {
        let mut catalog = ResponseCatalog::new();
        catalog.add_language("de", [(Emotion::Angry, Vec::<String>::new())]);
        assert!(!catalog.has_phrases("de", Emotion::Angry));
        assert_eq!(
            catalog.phrases_for("de", Emotion::Angry),
            catalog.phrases_for("en", Emotion::Angry)
        );
    }
}
