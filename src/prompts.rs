use crate::types::{CharacterProfile, Language, UserInput};
use crate::voices;

/// Pacing constant: roughly 13 spoken words per 8-second scene.
pub const WORDS_PER_SECOND: f64 = 1.625;

/// Slack around the requested duration when deriving the word window.
pub const DURATION_TOLERANCE_SECONDS: u32 = 30;

/// Word window embedded in the master-script prompt. The window is an
/// instruction to the model, not something the pipeline re-validates after
/// the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordBudget {
    pub target: u32,
    pub min: u32,
    pub max: u32,
}

pub fn word_budget(duration_seconds: u32) -> WordBudget {
    let seconds = duration_seconds as f64;
    let tolerance = DURATION_TOLERANCE_SECONDS as f64;
    let target = (seconds * WORDS_PER_SECOND).round() as u32;
    let min = ((seconds - tolerance) * WORDS_PER_SECOND).round().max(30.0) as u32;
    let max = ((seconds + tolerance) * WORDS_PER_SECOND).round() as u32;
    WordBudget { target, min, max }
}

/// Localized instruction fragments. Prompts are rendered from the English
/// scaffold with these fragments switched per language; the model is told
/// separately to answer in the user's language, so unlisted languages still
/// work through the English set (see [`Language::for_name`]).
struct PromptStrings {
    profile_task: &'static str,
    voice_rule: &'static str,
    narrator_voice_rule: &'static str,
    fragment_reminder: &'static str,
    promo_task: &'static str,
}

const EN_STRINGS: PromptStrings = PromptStrings {
    profile_task: "Create a character profile for a short video based on the following user input. \
The profile must include 2-3 main characters and one primary setting.",
    voice_rule: "Assign each character a voice from the available list below; keep the voices \
distinct unless the list is smaller than the cast.",
    narrator_voice_rule: "Finally, assign a voice for the Narrator as well. It may repeat a \
character's voice, but a unique one is better.",
    fragment_reminder: "The text below is ONE FRAGMENT of a longer master script. Other fragments \
are being storyboarded separately and the scenes will be merged afterwards, so break down ONLY \
this fragment and do not invent an opening or an ending for it.",
    promo_task: "Read the full master script below and generate promotional materials for the \
video: a thumbnail image prompt, YouTube and Facebook title/description/hashtags, and a TikTok \
caption with hashtags.",
};

const VI_STRINGS: PromptStrings = PromptStrings {
    profile_task: "Tạo hồ sơ nhân vật cho một video ngắn dựa trên thông tin người dùng cung cấp \
dưới đây. Hồ sơ phải gồm 2-3 nhân vật chính và một bối cảnh chính.",
    voice_rule: "Gán cho mỗi nhân vật một giọng đọc từ danh sách có sẵn bên dưới; nhãn giọng có \
ghi giới tính (Nam/Nữ), giọng được chọn phải khớp với giới tính của nhân vật.",
    narrator_voice_rule: "Cuối cùng, gán một giọng đọc cho Người dẫn chuyện (Narrator). Có thể \
trùng với giọng của nhân vật, nhưng nên chọn giọng riêng.",
    fragment_reminder: "Đoạn văn bên dưới chỉ là MỘT PHẦN của kịch bản gốc dài hơn. Các phần khác \
đang được dựng cảnh riêng và sẽ được ghép lại sau, vì vậy chỉ dựng cảnh cho đúng phần này, không \
tự thêm mở đầu hay kết thúc.",
    promo_task: "Đọc toàn bộ kịch bản gốc bên dưới và tạo nội dung quảng bá cho video: một câu \
lệnh tạo ảnh thumbnail, tiêu đề/mô tả/hashtag cho YouTube và Facebook, cùng caption kèm hashtag \
cho TikTok.",
};

fn strings(language: Language) -> &'static PromptStrings {
    match language {
        Language::English => &EN_STRINGS,
        Language::Vietnamese => &VI_STRINGS,
    }
}

/// Stage 1: invent the cast and setting that every later prompt will quote.
pub fn character_profile_prompt(input: &UserInput) -> String {
    let language = Language::for_name(&input.language);
    let l10n = strings(language);
    let available_voices = voices::available_labels(language).join(", ");

    format!(
        "{profile_task}\n\
For each character, provide a name and a detailed, visually-rich description focusing on \
specific, non-negotiable \"visual anchors\": facial features, hair style/color, signature \
wardrobe, and body type. This description is CRITICAL for generating consistent character \
images later.\n\
{voice_rule}\n\
Available voices: {available_voices}.\n\
{narrator_voice_rule}\n\
\n\
User Input:\n\
- Topic: {topic}\n\
- Channel Type: {channel}\n\
- Video Style: {style}\n\
- Language: {lang}\n\
\n\
Respond in {lang}. Return ONLY a single, valid JSON object matching the specified schema.",
        profile_task = l10n.profile_task,
        voice_rule = l10n.voice_rule,
        available_voices = available_voices,
        narrator_voice_rule = l10n.narrator_voice_rule,
        topic = input.topic,
        channel = input.channel_type,
        style = input.video_style,
        lang = input.language,
    )
}

/// Stage 2: the duration-constrained master script. The word window is a
/// hard instruction inside the prompt text.
pub fn master_script_prompt(
    input: &UserInput,
    profile: &CharacterProfile,
    budget: &WordBudget,
) -> String {
    let character_names = profile
        .characters
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an expert AI scriptwriter for short-form video. Write a complete, compelling \
script based on the request below, following a professional, structured format.\n\
\n\
Core Concept:\n\
- Topic: {topic}\n\
- Channel Type: {channel}\n\
- Style: {video_style} video, with a {writing_style} tone.\n\
- Characters: {characters}\n\
- Setting: {setting}\n\
- Language: {lang}\n\
\n\
ABSOLUTELY CRITICAL DURATION REQUIREMENT:\n\
The script's total word count (all narration and dialogue) must match a video duration of \
{duration} seconds.\n\
- TARGET WORD COUNT: {target} words (based on {wps} words per second).\n\
- ACCEPTABLE RANGE: between {min} and {max} words.\n\
- This is a hard constraint, not a suggestion. Before you output the final script, perform an \
internal word count; if it falls outside {min} to {max} words, rewrite until it complies.\n\
\n\
CRITICAL SCRIPT STRUCTURE:\n\
Structure the script in five parts, flowing as one seamless piece:\n\
1. Opening Hook (5-10% of the time): a dramatic, attention-grabbing statement or question.\n\
2. Context/Background (15-20%): set the stage, introduce the key players or timeline.\n\
3. Main Body (50-60%): the core story or analysis, broken into logical beats.\n\
4. Conclusion & Teaser (5-10%): a concluding thought plus a hook for a follow-up video.\n\
5. Call to Action: ask the audience to like, subscribe, and comment.\n\
The CTA is non-negotiable: it must be the final lines of the script and must be present even \
under word-count pressure.\n\
\n\
SCRIPT FORMATTING:\n\
- Integrate a classic three-act structure within the format above.\n\
- Label character names in ALL CAPS before their dialogue; use \"(NARRATOR)\" for voiceover.\n\
- Describe actions and settings concisely inside [SCENE START] and [SCENE END] tags.\n\
\n\
Now write the entire script in {lang}. The output must be the script alone, no commentary.",
        topic = input.topic,
        channel = input.channel_type,
        video_style = input.video_style,
        writing_style = input.writing_style,
        characters = character_names,
        setting = profile.setting.name,
        lang = input.language,
        duration = input.duration_in_seconds,
        target = budget.target,
        wps = WORDS_PER_SECOND,
        min = budget.min,
        max = budget.max,
    )
}

/// Consistency context rendered once per run and prepended to every
/// breakdown and promo prompt, so independently generated chunks agree on
/// style, cast, and voices.
#[derive(Debug, Clone)]
pub struct DirectorsBible {
    text: String,
}

impl DirectorsBible {
    pub fn render(input: &UserInput, profile: &CharacterProfile) -> Self {
        let profile_json = serde_json::to_string_pretty(profile)
            .unwrap_or_else(|_| "{}".to_string());

        let text = format!(
            "DIRECTOR'S BIBLE (applies to every scene you produce):\n\
- Style lock: {video_style} video, {image_style} visuals, {writing_style} tone. Every scene's \
'style_notes' must restate this exact combination.\n\
- Aspect ratio: {aspect}. Language: {lang}.\n\
- Characters, Setting & Voices Profile (source of truth, quote descriptions verbatim, never \
paraphrase):\n{profile_json}\n\
- Voice rule: the 'voice_model' of a scene is the voice assigned above to its \
'dialogue_character'; when the speaker is \"Narrator\", use the profile's narratorVoice. \
Never invent a voice.\n\
- When one long line is split across consecutive scenes, vary the camera framing between those \
scenes instead of repeating the same shot.",
            video_style = input.video_style,
            image_style = input.image_style,
            writing_style = input.writing_style,
            aspect = input.aspect_ratio.as_str(),
            lang = input.language,
            profile_json = profile_json,
        );
        DirectorsBible { text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The bible is consumed by string concatenation in front of a stage
    /// prompt body.
    pub fn prefix(&self, body: &str) -> String {
        format!("{}\n\n{}", self.text, body)
    }
}

/// Stage 3 (per chunk): translate one script fragment into scenes.
pub fn breakdown_chunk_prompt(chunk: &str, language_name: &str) -> String {
    let language = Language::for_name(language_name);
    let l10n = strings(language);

    format!(
        "You are an expert AI Video Director. {fragment_reminder}\n\
\n\
Instructions:\n\
1. Translate every key action, line of dialogue, and piece of narration of this fragment into \
its own distinct scene, preserving the fragment's flow exactly.\n\
2. For the 'master_description' field, insert the FULL, UNCHANGED description of the character \
speaking or acting in the scene from the profile above; if no specific character is active, use \
the Setting's description.\n\
3. The 'scene_description' must be a VISUAL description of the action in that part of the \
fragment.\n\
4. 'dialogue_line' and 'dialogue_character' must be COPIED EXACTLY from the fragment; use \
\"Narrator\" for narration.\n\
5. A single scene's 'dialogue_line' must not exceed 13 words. Split longer lines into \
consecutive scenes, each carrying at most 13 words, with consistent visuals showing one \
continuous action.\n\
6. For 'camera_shot', suggest a professional shot (e.g. \"Close-up on the character's \
reaction\", \"Wide establishing shot\", \"Dynamic tracking shot\", \"POV shot\").\n\
7. For 'audio_description', write a brief narrative description of the scene's soundscape.\n\
8. 'style_notes' must be populated on EVERY scene per the style lock above.\n\
9. Leave 'scene_context' numbers at 0; they are assigned after merging.\n\
\n\
Script fragment:\n\
---\n\
{chunk}\n\
---\n\
\n\
Return ONLY a single, valid JSON object that strictly follows the provided schema. Ensure all \
text is in {lang}.",
        fragment_reminder = l10n.fragment_reminder,
        chunk = chunk,
        lang = language_name,
    )
}

/// Stage 3 (promo branch): per-platform promotional copy from the full
/// script.
pub fn promo_content_prompt(master_script: &str, language_name: &str) -> String {
    let language = Language::for_name(language_name);
    let l10n = strings(language);

    format!(
        "{promo_task}\n\
The thumbnail prompt must describe one striking, family-friendly image that captures the story, \
consistent with the style lock and character profile above.\n\
\n\
Master Script:\n\
---\n\
{script}\n\
---\n\
\n\
Return ONLY a single, valid JSON object that strictly follows the provided schema. Ensure all \
text is in {lang}.",
        promo_task = l10n.promo_task,
        script = master_script,
        lang = language_name,
    )
}

/// Pre-flight helper: given the chosen video style, pick matching image and
/// writing styles from the catalogs.
pub fn style_suggestion_prompt(
    video_style: &str,
    image_style_options: &[&str],
    writing_style_options: &[&str],
) -> String {
    format!(
        "Given the video style \"{video_style}\", suggest the most appropriate image style and \
writing style from the provided lists.\n\
- The image style should visually complement the video style.\n\
- The writing style (tone) should match the overall mood of the video style.\n\
\n\
Available Image Styles: {image_options}\n\
Available Writing Styles: {writing_options}\n\
\n\
Return ONLY a single, valid JSON object with two keys, \"imageStyle\" and \"writingStyle\", \
using the exact string values from the lists provided.",
        video_style = video_style,
        image_options = image_style_options.join(", "),
        writing_options = writing_style_options.join(", "),
    )
}
