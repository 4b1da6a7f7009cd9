//! Prompt templates for every step of the generation chain.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth**: tuning how a step talks to its model means
//!    editing exactly one function.
//!
//! 2. **Testability**: unit tests inspect the rendered prompts directly, so a
//!    template regression is caught without a live model.
//!
//! Each builder interpolates exactly one input: the [`FieldSet`] for step 1,
//! the previous step's artifact for every later step.

use crate::pipeline::fields::FieldSet;

/// Step 1: initial feature-and-audience description from the extracted fields.
pub fn initial_description(fields: &FieldSet) -> String {
    let mut details = String::new();
    for (field, value) in fields.iter() {
        let value = if value.is_empty() { "(not provided)" } else { value };
        details.push_str(&format!("- {}: {}\n", field, value));
    }
    for (key, value) in fields.extras() {
        details.push_str(&format!("- {}: {}\n", key, value));
    }

    format!(
        "Create a detailed description for the {name} app based on the following information:\n\
         {details}\n\
         Include primary features, functionality, and target audience. Organize the description \
         by potential app screens. Keep in mind that this app is an idea and not in production \
         yet, so keep all the information in future tense.\n\
         If design preferences and color scheme are provided, explain how they enhance the user \
         experience.\n\
         If any key information is missing, acknowledge this in your description and provide \
         general suggestions based on common practices for similar apps.",
        name = fields.project_name(),
        details = details,
    )
}

/// Step 2: tighten the description and make it usable as an image prompt.
pub fn refine_description(initial_description: &str) -> String {
    format!(
        "As an expert in prompt engineering, refine and improve the following app description.\n\
         Make it more concise, engaging, and marketable. Organize the description by potential \
         app screens, and include suggestions for UI design based on the app's functionality and \
         target audience.\n\n\
         Initial description:\n\
         {initial_description}\n\n\
         Please provide:\n\
         1. A refined app description\n\
         2. Make the prompts so perfect that it is easier to create the UI design image."
    )
}

/// Step 3: screen-by-screen visual design narrative.
pub fn ui_design(refined_description: &str) -> String {
    format!(
        "Based on this refined app description, provide a detailed description of the UI design \
         for the screens of the app.\n\
         Focus on the layout, color scheme, and key UI elements and feature functionality. Be \
         specific about positions, sizes, and styling of elements.\n\
         This description will be used to generate an image, so make it as visual and detailed \
         as possible.\n\
         Make the prompts so perfect that it is easier to create the UI design image.\n\n\
         {refined_description}"
    )
}

/// Step 4, first half: condense the UI narrative for the image model.
pub fn summarize_ui(ui_design: &str) -> String {
    format!(
        "Summarize the following UI design description in about 100 words, focusing on the most \
         important visual elements and overall style:\n\n\
         {ui_design}"
    )
}

/// Step 4, second half: the fixed image template around the summary.
pub fn ui_image(summary: &str) -> String {
    format!(
        "Create a detailed, professional UI design for a mobile app based on this description: \
         {summary}. The image should show a clear, high-fidelity mockup of the main screen of the app."
    )
}

/// Step 5a: Flutter skeleton covering every described screen.
pub fn flutter_code(ui_design: &str) -> String {
    format!(
        "Create a Flutter code structure for all the screens of the app based on this UI design \
         description and feature functionality:\n\n\
         {ui_design}\n\n\
         Provide a correct, clean and dynamic well-structured Flutter code that implements the \
         described UI design, elements and layout."
    )
}

/// Step 5b: React Native skeleton from the same narrative.
pub fn react_native_code(ui_design: &str) -> String {
    format!(
        "Create a basic React Native code structure for the screens of the app based on this UI \
         design description:\n\n\
         {ui_design}\n\n\
         Provide correct, clean and dynamic well-structured React Native code that implements the \
         described UI design, elements and layout."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fields::extract_fields;

    #[test]
    fn initial_prompt_lists_every_field() {
        let fields = extract_fields("Project name: Foo\nColor Scheme: teal\nBudget: small");
        let prompt = initial_description(&fields);
        assert!(prompt.contains("for the Foo app"));
        assert!(prompt.contains("- Color Scheme: teal"));
        assert!(prompt.contains("- Organization: (not provided)"));
        assert!(prompt.contains("- Budget: small"));
        assert!(prompt.contains("future tense"));
        assert!(prompt.contains("missing"));
    }

    #[test]
    fn initial_prompt_without_name() {
        let prompt = initial_description(&extract_fields(""));
        assert!(prompt.contains("for the unnamed app"));
    }

    #[test]
    fn later_prompts_embed_their_input() {
        let marker = "<<ARTIFACT>>";
        for prompt in [
            refine_description(marker),
            ui_design(marker),
            summarize_ui(marker),
            ui_image(marker),
            flutter_code(marker),
            react_native_code(marker),
        ] {
            assert!(prompt.contains(marker), "prompt lost its input: {prompt}");
        }
    }

    #[test]
    fn image_template_is_fixed() {
        assert_eq!(
            ui_image("a dark dashboard"),
            "Create a detailed, professional UI design for a mobile app based on this description: \
             a dark dashboard. The image should show a clear, high-fidelity mockup of the main screen of the app."
        );
    }

    #[test]
    fn code_prompts_name_their_stack() {
        assert!(flutter_code("x").contains("Flutter"));
        assert!(react_native_code("x").contains("React Native"));
        assert!(summarize_ui("x").contains("100 words"));
    }
}
