use crate::types::Language;

/// One entry in a language's voice catalog: the friendly label offered to
/// the model during character creation, and the technical identifier the
/// downstream speech synthesizer expects.
#[derive(Debug, Clone, Copy)]
pub struct VoiceEntry {
    pub label: &'static str,
    pub technical_id: &'static str,
    pub gender: &'static str,
}

const ENGLISH_VOICES: &[VoiceEntry] = &[
    VoiceEntry {
        label: "Zephyr",
        technical_id: "en-US-JennyNeural",
        gender: "Female",
    },
    VoiceEntry {
        label: "Puck",
        technical_id: "en-US-GuyNeural",
        gender: "Male",
    },
    VoiceEntry {
        label: "Charon",
        technical_id: "en-US-ChristopherNeural",
        gender: "Male",
    },
    VoiceEntry {
        label: "Kore",
        technical_id: "en-US-MichelleNeural",
        gender: "Female",
    },
    VoiceEntry {
        label: "Fenrir",
        technical_id: "en-US-BrianNeural",
        gender: "Male",
    },
];

// Vietnamese labels carry the gender marker the catalog encodes, so the
// profile prompt can demand gender-consistent casting.
const VIETNAMESE_VOICES: &[VoiceEntry] = &[
    VoiceEntry {
        label: "Hoài My (Nữ)",
        technical_id: "vi-VN-HoaiMyNeural",
        gender: "Female",
    },
    VoiceEntry {
        label: "Nam Minh (Nam)",
        technical_id: "vi-VN-NamMinhNeural",
        gender: "Male",
    },
];

pub fn catalog(language: Language) -> &'static [VoiceEntry] {
    match language {
        Language::English => ENGLISH_VOICES,
        Language::Vietnamese => VIETNAMESE_VOICES,
    }
}

pub fn available_labels(language: Language) -> Vec<&'static str> {
    catalog(language).iter().map(|v| v.label).collect()
}

/// Maps a friendly voice label to its technical identifier. Unknown labels
/// pass through unchanged so a surprising profile degrades to a readable
/// storyboard instead of an aborted run.
pub fn resolve(label: &str, language: Language) -> String {
    let wanted = label.trim();
    for entry in catalog(language) {
        if entry.label.eq_ignore_ascii_case(wanted) {
            return entry.technical_id.to_string();
        }
    }
    log::debug!(
        "no technical voice for label '{}' in {:?} catalog, passing through",
        wanted,
        language
    );
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_english_labels() {
        assert_eq!(resolve("Puck", Language::English), "en-US-GuyNeural");
        assert_eq!(resolve("Zephyr", Language::English), "en-US-JennyNeural");
    }

    #[test]
    fn resolution_ignores_case_and_padding() {
        assert_eq!(resolve(" kore ", Language::English), "en-US-MichelleNeural");
    }

    #[test]
    fn resolves_vietnamese_labels() {
        assert_eq!(
            resolve("Hoài My (Nữ)", Language::Vietnamese),
            "vi-VN-HoaiMyNeural"
        );
    }

    #[test]
    fn unknown_label_passes_through_unchanged() {
        assert_eq!(resolve("Banshee", Language::English), "Banshee");
        assert_eq!(resolve("Puck", Language::Vietnamese), "Puck");
    }

    #[test]
    fn every_catalog_entry_has_gender_and_distinct_label() {
        for language in [Language::English, Language::Vietnamese] {
            let entries = catalog(language);
            for entry in entries {
                assert!(matches!(entry.gender, "Male" | "Female"));
            }
            let mut labels: Vec<_> = entries.iter().map(|e| e.label).collect();
            labels.sort();
            labels.dedup();
            assert_eq!(labels.len(), entries.len());
        }
    }
}
