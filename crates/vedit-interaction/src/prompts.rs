//! Prompt templates sent to the refinement model.

use minijinja::{Environment, context};
use vedit_core::{Result, VeditError};

pub const REFINE_SYSTEM_INSTRUCTION: &str = "You are an expert at translating and refining user requests into precise AI image editing prompts.";

const REFINE_TEMPLATE: &str = r#"A user wants to edit an image. Their instruction is: "{{ instruction }}".
Rewrite it as a clear, concise and direct instruction for an AI image editing model, in English.
For example, if the user says "quita el fondo", answer "remove the background".
If the instruction is already clear, return it unchanged. Reply with the final instruction only."#;

/// Renders the refinement request for `instruction`.
pub fn render_refine_prompt(instruction: &str) -> Result<String> {
    Environment::new()
        .render_str(REFINE_TEMPLATE, context! { instruction })
        .map_err(|err| VeditError::internal(format!("Failed to render refine prompt: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_is_embedded_verbatim() {
        let prompt = render_refine_prompt("Eliminar el fondo").unwrap();
        assert!(prompt.contains(r#"Their instruction is: "Eliminar el fondo"."#));
        assert!(prompt.contains("English"));
    }

    #[test]
    fn test_markup_is_not_escaped() {
        let prompt = render_refine_prompt("make <it> \"pop\" & glow").unwrap();
        assert!(prompt.contains("make <it> \"pop\" & glow"));
    }
}
