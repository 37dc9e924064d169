//! Response-shape contracts sent alongside structured calls.
//!
//! These mirror the serde types in [`crate::types`]; the remote service
//! steers its output with them, and the client re-validates by
//! deserializing, so a drifting response surfaces as a malformed-response
//! failure instead of leaking untyped data into later stages.

use serde_json::{json, Value};

pub fn character_profile_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "characters": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Character's name." },
                        "description": {
                            "type": "STRING",
                            "description": "Detailed visual and personality description, including specific visual anchors."
                        },
                        "voice": {
                            "type": "STRING",
                            "description": "The assigned voice label from the available list."
                        }
                    },
                    "required": ["name", "description", "voice"]
                }
            },
            "setting": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING", "description": "Name of the setting." },
                    "description": { "type": "STRING", "description": "Detailed description of the setting." }
                },
                "required": ["name", "description"]
            },
            "narratorVoice": {
                "type": "STRING",
                "description": "The assigned voice label for the narrator from the available list."
            }
        },
        "required": ["characters", "setting", "narratorVoice"]
    })
}

fn scene_prompt_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "scene_context": {
                "type": "OBJECT",
                "properties": {
                    "scene_number": { "type": "INTEGER", "description": "Placeholder sequence number." },
                    "total_scenes": { "type": "INTEGER", "description": "Placeholder total number of scenes." }
                },
                "required": ["scene_number", "total_scenes"]
            },
            "character_name": {
                "type": "STRING",
                "description": "Main character in this scene, or the setting name if none."
            },
            "master_description": {
                "type": "STRING",
                "description": "The full, unchanged description of the character (or setting) from the profile."
            },
            "scene_description": {
                "type": "STRING",
                "description": "Visual description of the action in this scene."
            },
            "dialogue_line": {
                "type": "STRING",
                "description": "Line of dialogue or narration, copied exactly from the script. Can be empty."
            },
            "dialogue_character": {
                "type": "STRING",
                "description": "Name of the character speaking, or 'Narrator'. Can be empty."
            },
            "voice_model": {
                "type": "STRING",
                "description": "Voice assigned to the speaking character or narrator in the profile."
            },
            "camera_shot": {
                "type": "STRING",
                "description": "Professional camera shot suggestion."
            },
            "audio_description": {
                "type": "STRING",
                "description": "Narrative description of the scene's soundscape."
            },
            "style_notes": {
                "type": "STRING",
                "description": "Visual style of the video and image, identical across scenes."
            }
        },
        "required": [
            "scene_context", "character_name", "master_description", "scene_description",
            "audio_description", "style_notes", "camera_shot", "voice_model"
        ]
    })
}

/// Shape of one breakdown call's answer: the scenes for one script chunk.
pub fn chunk_scenes_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "scenes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "scene_number": { "type": "INTEGER" },
                        "act": { "type": "INTEGER", "description": "Act 1, 2 or 3." },
                        "scene_prompt_json": scene_prompt_schema()
                    },
                    "required": ["scene_number", "act", "scene_prompt_json"]
                }
            }
        },
        "required": ["scenes"]
    })
}

pub fn promotional_content_schema() -> Value {
    let platform = json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "description": { "type": "STRING" },
            "hashtags": { "type": "STRING" }
        },
        "required": ["title", "description", "hashtags"]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "thumbnail_prompt": { "type": "STRING" },
            "youtube": platform,
            "facebook": platform,
            "tiktok": {
                "type": "OBJECT",
                "properties": {
                    "caption": { "type": "STRING" },
                    "hashtags": { "type": "STRING" }
                },
                "required": ["caption", "hashtags"]
            }
        },
        "required": ["thumbnail_prompt", "youtube", "facebook", "tiktok"]
    })
}

pub fn style_suggestion_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "imageStyle": { "type": "STRING" },
            "writingStyle": { "type": "STRING" }
        },
        "required": ["imageStyle", "writingStyle"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_schema_requires_the_scene_prompt_fields() {
        let schema = chunk_scenes_schema();
        let required = &schema["properties"]["scenes"]["items"]["properties"]["scene_prompt_json"]
            ["required"];
        let names: Vec<&str> = required
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        for field in [
            "scene_context",
            "master_description",
            "voice_model",
            "camera_shot",
            "style_notes",
        ] {
            assert!(names.contains(&field), "missing required field {field}");
        }
    }

    #[test]
    fn profile_schema_sample_deserializes_into_the_profile_type() {
        // A response obeying the schema must land in CharacterProfile.
        let sample = serde_json::json!({
            "characters": [
                { "name": "A", "description": "desc", "voice": "Puck" }
            ],
            "setting": { "name": "S", "description": "d" },
            "narratorVoice": "Charon"
        });
        let profile: crate::types::CharacterProfile =
            serde_json::from_value(sample).unwrap();
        assert_eq!(profile.narrator_voice, "Charon");
    }

    #[test]
    fn promo_schema_lists_all_platforms() {
        let schema = promotional_content_schema();
        let props = schema["properties"].as_object().unwrap();
        assert!(props.contains_key("youtube"));
        assert!(props.contains_key("facebook"));
        assert!(props.contains_key("tiktok"));
        assert!(props.contains_key("thumbnail_prompt"));
    }
}
