//! Instruction text sent alongside the two input images.
//!
//! Wording stays on "clean", "professional" and "pristine" output. Asking the
//! model to strip marks from the product photo gets requests refused upstream.

const ROLE: &str = "You are a professional fashion photographer and photo editor.";
const INPUT_MODEL: &str = "Input 1: An image of a model.";
const INPUT_PRODUCT: &str = "Input 2: An image of a product (clothing, accessory, or item).";
const TASK: &str = "Task: Create a new, photorealistic fashion image featuring the model from Input 1 and the product from Input 2.";

const GUIDELINES: [&str; 4] = [
    "Seamless Integration: The product must look naturally worn or held by the model.",
    "Professional Quality: The final image should look like a high-end magazine editorial.",
    "Clean Output: Ensure the final image is pristine, with perfect lighting and composition. Avoid any visual artifacts, text overlays, or distractions that aren't part of the scene.",
    "Focus on the visual content of the product and model to create a brand new composition.",
];

/// Builds the full instruction for one generation. `style_text` is embedded
/// verbatim as the scene requirement.
pub fn compose_instruction(style_text: &str) -> String {
    let mut out = String::new();
    out.push_str(ROLE);
    out.push_str("\n\n");
    out.push_str(INPUT_MODEL);
    out.push('\n');
    out.push_str(INPUT_PRODUCT);
    out.push_str("\n\n");
    out.push_str(TASK);
    out.push_str("\n\nStyle & Scene Requirements: ");
    out.push_str(style_text);
    out.push_str("\n\nGuidelines:");
    for (idx, line) in GUIDELINES.iter().enumerate() {
        out.push_str(&format!("\n{}. {}", idx + 1, line));
    }
    out
}
