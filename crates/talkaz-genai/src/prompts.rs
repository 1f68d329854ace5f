//! Prompt templates for stylization, video generation and section authoring.
//!
//! Every image and video template ends with the same green-screen rules. The
//! compositor keys out exactly `#00FF00`, so changing the colour here means
//! changing the chroma key in the media crate too.

use talkaz_models::{CharacterStyle, PromptSections};

/// Background rules shared by all image and video templates.
pub const GREEN_SCREEN_RULES: &str = "\
Background:
- SOLID PURE GREEN BACKGROUND (GREEN SCREEN)
- flat, even green color (#00FF00)
- no gradients, no shadows, no lighting variation on the background
- no environment, no props
- no text, no symbols, no overlays";

const FULL_BODY_RULES: &str = "\
This must be a FULL BODY character render with the whole body visible from head to shoes.
Do NOT crop the body. Do NOT cut off the legs, knees, feet or shoes.

Keep the real person's identity:
- same face shape, jawline, eyes, nose and mouth
- same hairstyle and hairline
- same body proportions, clothing and outfit
- same pose, stance, camera angle and perspective";

const PS2_STYLE: &str = "\
Create an authentic early 2000s PlayStation 2 video game character in the style of
GTA San Andreas (2004), based EXACTLY on the person in the reference image.

Style conversion only:
- PS2 era low-poly 3D character with simple facial geometry
- GTA San Andreas NPC / cutscene look, slightly stiff pose
- low resolution, blurry textures (128x128 or 256x256)
- flat baked lighting, no modern rendering
- slight green/brown PS2 color cast
- character centered, like a raw in-game model export prepared for chroma keying";

const ANIME_STYLE: &str = "\
Create an authentic early 2000s anime-style character with a gritty, sharp street-samurai
edge, based EXACTLY on the person in the reference image.

Style conversion only:
- sharp, angular character design with spiky, edgy linework
- strong jawlines and defined facial features, no cute or moe features
- hip-hop influenced, limited color palette
- high-contrast cel shading with visible ink lines
- cinematic early-2000s anime look, not modern glossy anime
- character centered, like a raw anime render prepared for chroma keying";

/// Things the video model must never draw.
pub const NEGATIVE_PROMPT: &str = "text, words, letters, typography, subtitles, captions, \
speech bubbles, on-screen text, overlay text, logos, signs, labels, symbols, watermark, \
watermark text, UI elements, interface, numbers, characters, random text, floating text, \
any written content of any kind";

pub const DEFAULT_ANIMATION_INSTRUCTIONS: &str = "\
- The character keeps the same main pose and body position.
- The camera is static and centered.
- The character is looking directly into the camera at all times.";

pub const DEFAULT_HAND_ARM_GESTURES: &str = "\
- Expressive hand gestures that follow the emphasis of the line.
- Stronger, punchy gestures on emphasized words.
- Smaller gestures during calm parts.
- No chaotic or cartoonish movement.";

/// Full stylization prompt for a built-in style.
pub fn style_prompt(style: CharacterStyle) -> String {
    let body = match style {
        CharacterStyle::Ps2 => PS2_STYLE,
        CharacterStyle::Anime => ANIME_STYLE,
    };
    format!("{}\n\n{}\n\n{}", body, FULL_BODY_RULES, GREEN_SCREEN_RULES)
}

/// Resolve a client-supplied style: a known style id/name picks its template,
/// anything else is used as free text with the green-screen rules appended.
pub fn stylization_prompt(style: &str) -> String {
    match CharacterStyle::parse(style) {
        Some(known) => style_prompt(known),
        None => format!("{}\n\n{}", style.trim(), GREEN_SCREEN_RULES),
    }
}

fn style_look(style: CharacterStyle) -> &'static str {
    match style {
        CharacterStyle::Ps2 => {
            "- Authentic early 2000s PlayStation 2 video game character\n\
             - GTA San Andreas era graphics, low-poly with low-resolution textures\n\
             - Flat baked lighting, slightly stiff PS2 animation"
        }
        CharacterStyle::Anime => {
            "- Early 2000s street-anime character\n\
             - High-contrast cel shading with visible ink lines\n\
             - Limited, punchy animation with expressive faces"
        }
    }
}

/// Video prompt embedding the spoken line and the authored sections
/// (or conservative defaults when none were authored).
pub fn video_prompt(
    spoken_line: &str,
    style: CharacterStyle,
    sections: Option<&PromptSections>,
) -> String {
    let (animation, gestures) = match sections {
        Some(s) => (s.animation_instructions.as_str(), s.hand_arm_gestures.as_str()),
        None => (DEFAULT_ANIMATION_INSTRUCTIONS, DEFAULT_HAND_ARM_GESTURES),
    };

    format!(
        "Animate the provided image into a short video.

The character must remain EXACTLY the same as in the input image.
Do not change the character's identity, face, body, clothing, proportions or style.

Video timing (VERY IMPORTANT):
- The character appears to speak continuously for the full duration.
- Mouth movement is active and consistent from start to end.

Style:
{look}

Animation instructions:
{animation}

Speaking behavior:
- Mouth movement follows the rhythm and emphasis of the line below.
- Words in ALL CAPS are strongly emphasized; pause slightly after each line break.
- Do NOT move the mouth at a constant speed.

Spoken line (for rhythm and emphasis reference ONLY):
\"{line}\"

Hand and arm gestures:
{gestures}

Restrictions:
- Do NOT change stance or posture.
- Do NOT add walking, turning or dancing.
- Do NOT add background elements, text or visual effects.

{background}",
        look = style_look(style),
        animation = animation.trim(),
        line = spoken_line.trim(),
        gestures = gestures.trim(),
        background = GREEN_SCREEN_RULES,
    )
}

/// Instructions for the language model that authors prompt sections.
pub fn sections_prompt(spoken_line: &str, scene_description: &str, style: CharacterStyle) -> String {
    format!(
        "You are an expert video prompt engineer writing character animation prompts for AI video generation.

Write ONLY two sections of a video prompt, based on the scene description and the spoken line below.

\"Animation instructions\":
- Default: the character keeps the same main pose and body position, the camera is static and centered, the character looks directly into the camera.
- Only change these defaults if the scene description EXPLICITLY asks for something different.

\"Hand and arm gestures\":
- Expressive, context-appropriate gestures that match the energy of the scene and the line.
- Natural for a {style}; no chaotic or cartoonish movement.

Return a JSON object with exactly these two keys, each a string of bullet points starting with \"- \":
{{
  \"animation_instructions\": \"...\",
  \"hand_arm_gestures\": \"...\"
}}

Scene description: {scene}

Spoken line: \"{line}\"

Return ONLY valid JSON.",
        style = style.description(),
        scene = scene_description.trim(),
        line = spoken_line.trim(),
    )
}
