//! The fixed voice catalog and voice/language reconciliation.
//!
//! Voices follow the pattern `{locale}{gender}_{name}`; the three-character
//! prefix (e.g. `af_`, `hm_`) identifies the voice family.

use serde::Serialize;

use crate::language::LanguageCode;

/// A catalog voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Voice {
    pub id: &'static str,
    pub display_name: &'static str,
}

impl Voice {
    pub fn family(&self) -> &'static str {
        family_prefix(self.id)
    }
}

/// Voice used when English text meets a voice that cannot speak it.
pub const DEFAULT_ENGLISH_VOICE: &str = "af_heart";

/// Voice substituted for Bengali text unless a Hindi voice was requested.
pub const DEFAULT_HINDI_VOICE: &str = "hm_omega";

const fn voice(id: &'static str, display_name: &'static str) -> Voice {
    Voice { id, display_name }
}

pub const CATALOG: &[Voice] = &[
    voice("af_alloy", "Alloy (American Female)"),
    voice("af_aoede", "Aoede (American Female)"),
    voice("af_bella", "Bella (American Female)"),
    voice("af_heart", "Heart (American Female)"),
    voice("af_jessica", "Jessica (American Female)"),
    voice("af_kore", "Kore (American Female)"),
    voice("af_nicole", "Nicole (American Female)"),
    voice("af_nova", "Nova (American Female)"),
    voice("af_river", "River (American Female)"),
    voice("af_sarah", "Sarah (American Female)"),
    voice("af_sky", "Sky (American Female)"),
    voice("am_adam", "Adam (American Male)"),
    voice("am_echo", "Echo (American Male)"),
    voice("am_eric", "Eric (American Male)"),
    voice("am_fenrir", "Fenrir (American Male)"),
    voice("am_liam", "Liam (American Male)"),
    voice("am_michael", "Michael (American Male)"),
    voice("am_onyx", "Onyx (American Male)"),
    voice("am_puck", "Puck (American Male)"),
    voice("am_santa", "Santa (American Male)"),
    voice("bf_alice", "Alice (British Female)"),
    voice("bf_emma", "Emma (British Female)"),
    voice("bf_isabella", "Isabella (British Female)"),
    voice("bf_lily", "Lily (British Female)"),
    voice("bm_daniel", "Daniel (British Male)"),
    voice("bm_fable", "Fable (British Male)"),
    voice("bm_george", "George (British Male)"),
    voice("bm_lewis", "Lewis (British Male)"),
    voice("ef_dora", "Dora (European Female)"),
    voice("em_alex", "Alex (European Male)"),
    voice("em_santa", "Santa (European Male)"),
    voice("ff_siwis", "Siwis (Finnish Female)"),
    voice("hf_alpha", "Alpha (Hindi Female, Bangla)"),
    voice("hf_beta", "Beta (Hindi Female, Bangla)"),
    voice("hm_omega", "Omega (Hindi Male, Bangla)"),
    voice("hm_psi", "Psi (Hindi Male, Bangla)"),
    voice("if_sara", "Sara (Indonesian Female)"),
    voice("im_nicola", "Nicola (Indonesian Male)"),
    voice("jf_alpha", "Alpha (Japanese Female)"),
    voice("jf_gongitsune", "Gongitsune (Japanese Female)"),
    voice("jf_nezumi", "Nezumi (Japanese Female)"),
    voice("jf_tebukuro", "Tebukuro (Japanese Female)"),
    voice("jm_kumo", "Kumo (Japanese Male)"),
    voice("pf_dora", "Dora (Portuguese Female)"),
    voice("pm_alex", "Alex (Portuguese Male)"),
    voice("pm_santa", "Santa (Portuguese Male)"),
    voice("zf_xiaobei", "Xiaobei (Chinese Female)"),
    voice("zf_xiaoni", "Xiaoni (Chinese Female)"),
    voice("zf_xiaoxiao", "Xiaoxiao (Chinese Female)"),
    voice("zf_xiaoyi", "Xiaoyi (Chinese Female)"),
];

use LanguageCode::*;

/// Languages each voice family can speak.
const FAMILY_LANGUAGES: &[(&str, &[LanguageCode])] = &[
    ("af_", &[GenericEnglish, English]),
    ("am_", &[GenericEnglish, English]),
    ("bf_", &[GenericEnglish, English]),
    ("bm_", &[GenericEnglish, English]),
    ("ef_", &[GenericEnglish, English]),
    ("em_", &[GenericEnglish, English]),
    ("ff_", &[Finnish]),
    ("hf_", &[Hindi]),
    ("hm_", &[Hindi]),
    ("if_", &[Indonesian]),
    ("im_", &[Indonesian]),
    ("jf_", &[Japanese]),
    ("jm_", &[Japanese]),
    ("pf_", &[Portuguese]),
    ("pm_", &[Portuguese]),
    ("zf_", &[Chinese]),
];

const HINDI_FAMILIES: &[&str] = &["hf_", "hm_"];

/// Fallback voice per detected language.
const DEFAULT_VOICE_BY_LANGUAGE: &[(LanguageCode, &str)] = &[
    (GenericEnglish, DEFAULT_ENGLISH_VOICE),
    (English, DEFAULT_ENGLISH_VOICE),
    (Hindi, DEFAULT_HINDI_VOICE),
    (Bengali, DEFAULT_HINDI_VOICE),
    (Japanese, "jf_alpha"),
    (Chinese, "zf_xiaoxiao"),
    (Indonesian, "if_sara"),
    (Portuguese, "pf_dora"),
    (Finnish, "ff_siwis"),
];

/// The voice and backend language chosen for one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAssignment {
    pub voice: String,
    pub backend_language: LanguageCode,
}

impl ResolvedAssignment {
    fn new(voice: &str, backend_language: LanguageCode) -> Self {
        Self {
            voice: voice.to_string(),
            backend_language,
        }
    }
}

/// First three characters of a voice id (fewer for very short ids).
pub fn family_prefix(voice: &str) -> &str {
    match voice.char_indices().nth(3) {
        Some((end, _)) => &voice[..end],
        None => voice,
    }
}

/// Languages the family of `voice` supports; empty for unknown families.
pub fn supported_languages(voice: &str) -> &'static [LanguageCode] {
    let prefix = family_prefix(voice);
    FAMILY_LANGUAGES
        .iter()
        .find(|(family, _)| *family == prefix)
        .map(|(_, languages)| *languages)
        .unwrap_or(&[])
}

pub fn default_voice_for(language: LanguageCode) -> &'static str {
    DEFAULT_VOICE_BY_LANGUAGE
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, voice)| *voice)
        .unwrap_or(DEFAULT_ENGLISH_VOICE)
}

/// Reconcile the requested voice with the detected language of a segment.
///
/// Total over all inputs: unknown voices and languages fall back to the
/// English default rather than failing.
pub fn resolve(requested: &str, detected: LanguageCode) -> ResolvedAssignment {
    // Bengali is spoken through the Hindi backend.
    if detected == Bengali {
        let voice = if HINDI_FAMILIES.contains(&family_prefix(requested)) {
            requested
        } else {
            DEFAULT_HINDI_VOICE
        };
        return ResolvedAssignment::new(voice, Hindi);
    }

    if supported_languages(requested).contains(&detected) {
        return ResolvedAssignment::new(requested, detected);
    }

    if detected.is_english() {
        return ResolvedAssignment::new(DEFAULT_ENGLISH_VOICE, GenericEnglish);
    }

    ResolvedAssignment::new(default_voice_for(detected), detected)
}

pub fn find(id: &str) -> Option<&'static Voice> {
    CATALOG.iter().find(|v| v.id == id)
}

/// Turn a catalog id or display name into a voice id.
///
/// Matching is case-insensitive and tries, in order: an exact id, an exact
/// display name, then a display name containing the input. Anything else is
/// returned trimmed and lowercased so the resolver can still fall back.
pub fn lookup_voice(input: &str) -> String {
    let needle = input.trim().to_lowercase();
    if let Some(voice) = find(&needle) {
        return voice.id.to_string();
    }
    CATALOG
        .iter()
        .find(|v| v.display_name.to_lowercase() == needle)
        .or_else(|| {
            CATALOG
                .iter()
                .find(|v| !needle.is_empty() && v.display_name.to_lowercase().contains(&needle))
        })
        .map(|v| v.id.to_string())
        .unwrap_or(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_voice_that_supports_detected_language() {
        assert_eq!(
            resolve("bf_emma", English),
            ResolvedAssignment::new("bf_emma", English)
        );
        assert_eq!(
            resolve("jm_kumo", Japanese),
            ResolvedAssignment::new("jm_kumo", Japanese)
        );
    }

    #[test]
    fn english_text_with_foreign_voice_falls_back_to_default_english() {
        assert_eq!(
            resolve("jf_alpha", GenericEnglish),
            ResolvedAssignment::new(DEFAULT_ENGLISH_VOICE, GenericEnglish)
        );
        assert_eq!(
            resolve("zf_xiaoyi", English),
            ResolvedAssignment::new(DEFAULT_ENGLISH_VOICE, GenericEnglish)
        );
    }

    #[test]
    fn foreign_text_uses_language_default_voice() {
        assert_eq!(
            resolve("af_heart", Japanese),
            ResolvedAssignment::new("jf_alpha", Japanese)
        );
        assert_eq!(
            resolve("am_adam", Portuguese),
            ResolvedAssignment::new("pf_dora", Portuguese)
        );
    }

    #[test]
    fn bengali_routes_to_hindi_backend() {
        assert_eq!(
            resolve("hf_beta", Bengali),
            ResolvedAssignment::new("hf_beta", Hindi)
        );
        assert_eq!(
            resolve("af_heart", Bengali),
            ResolvedAssignment::new(DEFAULT_HINDI_VOICE, Hindi)
        );
    }

    #[test]
    fn unknown_voice_is_still_resolved() {
        assert_eq!(
            resolve("xx_nobody", GenericEnglish),
            ResolvedAssignment::new(DEFAULT_ENGLISH_VOICE, GenericEnglish)
        );
        assert_eq!(resolve("", Finnish), ResolvedAssignment::new("ff_siwis", Finnish));
    }

    #[test]
    fn resolution_is_total_over_catalog_and_languages() {
        for voice in CATALOG {
            for lang in LanguageCode::ALL {
                let assignment = resolve(voice.id, lang);
                assert_ne!(assignment.backend_language, Bengali);
                assert!(
                    FAMILY_LANGUAGES
                        .iter()
                        .any(|(_, langs)| langs.contains(&assignment.backend_language)),
                    "{} / {lang} resolved to unsupported {}",
                    voice.id,
                    assignment.backend_language
                );
                assert!(
                    supported_languages(&assignment.voice).contains(&assignment.backend_language),
                    "{} cannot speak {}",
                    assignment.voice,
                    assignment.backend_language
                );
            }
        }
    }

    #[test]
    fn family_prefix_handles_short_and_multibyte_ids() {
        assert_eq!(family_prefix("af_heart"), "af_");
        assert_eq!(family_prefix("af"), "af");
        assert_eq!(family_prefix("ñé_x"), "ñé_");
    }

    #[test]
    fn every_catalog_voice_has_a_known_family() {
        for voice in CATALOG {
            assert!(!supported_languages(voice.id).is_empty(), "{}", voice.id);
            assert_eq!(voice.family().len(), 3);
        }
    }

    #[test]
    fn lookup_accepts_ids_and_display_names() {
        assert_eq!(lookup_voice("  BF_EMMA "), "bf_emma");
        assert_eq!(lookup_voice("Heart (American Female)"), "af_heart");
        assert_eq!(lookup_voice("kumo"), "jm_kumo");
        assert_eq!(lookup_voice("Someone Else"), "someone else");
        assert_eq!(lookup_voice("  MyCustom_Voice "), "mycustom_voice");
    }
}
