//! Script- and keyword-based language detection.
//!
//! Detection walks [`RULES`] top to bottom and returns the language of the
//! first rule whose predicate matches, falling back to generic English.
//! The order is significant: Bengali is checked before Devanagari, kana-heavy
//! CJK text before plain CJK, and the Latin-script heuristics last.
//!
//! The Portuguese and Finnish rules fire on a single accented character, so
//! short English text containing a borrowed name such as "José" is reported
//! as Portuguese.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Language tags understood by the synthesis backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LanguageCode {
    /// Generic English, the backend default (`a`).
    #[serde(rename = "a")]
    GenericEnglish,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "bn")]
    Bengali,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "id")]
    Indonesian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "fi")]
    Finnish,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 9] = [
        LanguageCode::GenericEnglish,
        LanguageCode::English,
        LanguageCode::Hindi,
        LanguageCode::Bengali,
        LanguageCode::Japanese,
        LanguageCode::Chinese,
        LanguageCode::Indonesian,
        LanguageCode::Portuguese,
        LanguageCode::Finnish,
    ];

    pub fn code(self) -> &'static str {
        match self {
            LanguageCode::GenericEnglish => "a",
            LanguageCode::English => "en",
            LanguageCode::Hindi => "hi",
            LanguageCode::Bengali => "bn",
            LanguageCode::Japanese => "ja",
            LanguageCode::Chinese => "zh",
            LanguageCode::Indonesian => "id",
            LanguageCode::Portuguese => "pt",
            LanguageCode::Finnish => "fi",
        }
    }

    pub fn is_english(self) -> bool {
        matches!(self, LanguageCode::GenericEnglish | LanguageCode::English)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Unknown language code '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for LanguageCode {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageCode::ALL
            .into_iter()
            .find(|lang| lang.code() == s)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// Character statistics gathered once per segment and shared by all rules.
#[derive(Debug, Clone)]
pub struct ScriptProfile<'a> {
    pub text: &'a str,
    pub lowercase: String,
    pub bengali: usize,
    pub devanagari: usize,
    pub han: usize,
    pub kana: usize,
}

impl<'a> ScriptProfile<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut profile = Self {
            text,
            lowercase: text.to_lowercase(),
            bengali: 0,
            devanagari: 0,
            han: 0,
            kana: 0,
        };
        for ch in text.chars() {
            match ch {
                '\u{0980}'..='\u{09FF}' => profile.bengali += 1,
                '\u{0900}'..='\u{097F}' => profile.devanagari += 1,
                '\u{4E00}'..='\u{9FFF}' => profile.han += 1,
                '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' => profile.kana += 1,
                _ => {}
            }
        }
        profile
    }

    /// Count of CJK ideographs plus hiragana/katakana.
    pub fn cjk(&self) -> usize {
        self.han + self.kana
    }
}

/// Share of kana among CJK characters above which text is treated as Japanese.
pub const KANA_SHARE_THRESHOLD: f64 = 0.3;

const PORTUGUESE_CHARS: &[char] = &['à', 'á', 'é', 'í', 'ó', 'ú', 'ã', 'õ', 'ç'];
const FINNISH_CHARS: &[char] = &['ä', 'ö'];

static INDONESIAN_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(saya|anda|dia|mereka)\b").expect("valid regex"));

/// One detection rule: when `matches` holds, the segment is `language`.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub language: LanguageCode,
    pub matches: fn(&ScriptProfile<'_>) -> bool,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("language", &self.language)
            .finish()
    }
}

fn has_bengali(p: &ScriptProfile<'_>) -> bool {
    p.bengali > 0
}

fn has_devanagari(p: &ScriptProfile<'_>) -> bool {
    p.devanagari > 0
}

fn kana_heavy_cjk(p: &ScriptProfile<'_>) -> bool {
    p.cjk() > 0 && p.kana as f64 > p.cjk() as f64 * KANA_SHARE_THRESHOLD
}

fn has_cjk(p: &ScriptProfile<'_>) -> bool {
    p.cjk() > 0
}

fn has_kana(p: &ScriptProfile<'_>) -> bool {
    p.kana > 0
}

fn indonesian_keywords(p: &ScriptProfile<'_>) -> bool {
    p.lowercase.contains("indonesia") || INDONESIAN_WORDS.is_match(&p.lowercase)
}

fn portuguese_accents(p: &ScriptProfile<'_>) -> bool {
    p.text.contains(PORTUGUESE_CHARS)
}

fn finnish_umlauts(p: &ScriptProfile<'_>) -> bool {
    p.text.contains(FINNISH_CHARS)
}

/// Detection rules in precedence order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "bengali-script",
        language: LanguageCode::Bengali,
        matches: has_bengali,
    },
    Rule {
        name: "devanagari-script",
        language: LanguageCode::Hindi,
        matches: has_devanagari,
    },
    Rule {
        name: "kana-heavy-cjk",
        language: LanguageCode::Japanese,
        matches: kana_heavy_cjk,
    },
    Rule {
        name: "cjk-ideographs",
        language: LanguageCode::Chinese,
        matches: has_cjk,
    },
    // Unreachable while kana also counts towards CJK; kept so the table stays
    // correct if the CJK rules are narrowed.
    Rule {
        name: "kana",
        language: LanguageCode::Japanese,
        matches: has_kana,
    },
    Rule {
        name: "indonesian-keywords",
        language: LanguageCode::Indonesian,
        matches: indonesian_keywords,
    },
    Rule {
        name: "portuguese-accents",
        language: LanguageCode::Portuguese,
        matches: portuguese_accents,
    },
    Rule {
        name: "finnish-umlauts",
        language: LanguageCode::Finnish,
        matches: finnish_umlauts,
    },
];

/// Detect the dominant language of a text segment.
pub fn detect(text: &str) -> LanguageCode {
    detect_with(RULES, text)
}

/// Detect using an explicit rule list; the first matching rule wins.
pub fn detect_with(rules: &[Rule], text: &str) -> LanguageCode {
    let profile = ScriptProfile::new(text);
    rules
        .iter()
        .find(|rule| (rule.matches)(&profile))
        .map(|rule| rule.language)
        .unwrap_or(LanguageCode::GenericEnglish)
}
