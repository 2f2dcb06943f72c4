//! Prompt building functions for the generation agents

use crate::domain::entities::Character;
use crate::domain::value_objects::{Guidance, GuidanceField};

/// System prompt for the Character Agent: the TOON rules and the required fields
pub const CHARACTER_AGENT_SYSTEM_PROMPT: &str = "\
You are a Character Agent. Analyze the scene and characters, then return your analysis in TOON format.

TOON Format Rules:
- Each line contains a key:value pair
- Multiple values for a key are separated by pipes: key:value1|value2|value3
- Whitespace is trimmed from keys and values
- Lines without colons are ignored

Required fields:
- emotional: Character emotional states (e.g., anxious|hopeful|determined)
- pov: Point of view perspective (e.g., first-limited, third-omniscient)
- voice: Narrative voice characteristics (e.g., short-sentences, descriptive, introspective)
- physical: Physical reactions and body language (e.g., trembling-hands, steady-gaze)

Example TOON output:
emotional:anxious|hopeful
pov:first-limited
voice:short-sentences|introspective
physical:trembling-hands|quick-glances

Return ONLY the TOON format output, no additional text.";

/// System prompt for the Scene Writer: target length and prose-only output
pub const SCENE_WRITER_SYSTEM_PROMPT: &str = "\
You are a Scene Writer. Write narrative prose for a single scene of a story.

Write between 300 and 500 words. Follow the character guidance you are given \
so that every character's voice and perspective stay consistent.

Return ONLY the prose of the scene. Do not add a title, notes, commentary or \
any text that is not part of the scene itself.";

const NO_CHARACTERS: &str = "No characters have been defined for this story yet.";

/// Format every character of the story for the Character Agent
pub fn build_character_roster(characters: &[Character]) -> String {
    if characters.is_empty() {
        return NO_CHARACTERS.to_string();
    }

    let mut roster = String::from("Characters in this story:\n");
    for character in characters {
        roster.push_str(&format!("\nName: {}\n", character.name));
        roster.push_str(&format!("Traits: {}\n", character.traits));
        if let Some(backstory) = character.backstory.as_deref().filter(|b| !b.trim().is_empty()) {
            roster.push_str(&format!("Backstory: {}\n", backstory));
        }
    }
    roster
}

/// User prompt for the Character Agent
pub fn build_character_agent_prompt(outline: &str, characters: &[Character]) -> String {
    format!(
        "Scene Outline:\n{}\n\n{}\n\nAnalyze this scene and the characters involved. \
         Return character perspective and voice guidance in TOON format with the required \
         fields: emotional, pov, voice, physical.",
        outline,
        build_character_roster(characters).trim_end()
    )
}

/// "emotional" -> "Emotional"
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn field_instruction(field: GuidanceField) -> &'static str {
    match field {
        GuidanceField::Emotional => "use for the characters' inner emotional states",
        GuidanceField::Pov => "use as the narrative point of view",
        GuidanceField::Voice => "use for sentence style and narrative voice",
        GuidanceField::Physical => "use for body language and physical reactions",
    }
}

/// Human-readable rendering of the guidance, required fields first
pub fn render_guidance(guidance: &Guidance) -> String {
    let mut lines: Vec<String> = GuidanceField::ALL
        .iter()
        .map(|field| {
            format!(
                "- {}: {} ({})",
                capitalize(field.key()),
                guidance.field(*field).unwrap_or("N/A"),
                field_instruction(*field)
            )
        })
        .collect();

    lines.extend(
        guidance
            .extra_entries()
            .map(|(key, value)| format!("- {}: {}", capitalize(key), value)),
    );
    lines.join("\n")
}

/// User prompt for the Scene Writer
pub fn build_scene_writer_prompt(outline: &str, guidance: &Guidance) -> String {
    format!(
        "Scene Outline:\n{}\n\nCharacter Guidance:\n{}\n\nWrite the scene as 300-500 words of \
         narrative prose that follows the outline and applies each guidance field to its \
         narrative dimension.",
        outline,
        render_guidance(guidance)
    )
}
