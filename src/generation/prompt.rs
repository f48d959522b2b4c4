//! Text instructions sent alongside the image payloads.

use crate::generation::aspect_ratio::is_concrete_ratio;

/// Used when the user leaves the instruction field empty.
pub const DEFAULT_TRYON_TEMPLATE: &str = "Take the garment shown in the product image and dress \
the person in the model image with it. Fit the garment naturally to the person's body shape and \
pose, and match the lighting and shadows of the model photo. Reproduce the garment's pattern, \
texture, colors and any logos or prints exactly as they appear in the product image.";

/// Appended to every try-on instruction.
pub const BLENDING_CLAUSE: &str = "Blend the garment seamlessly into the photo so the result \
looks like a real photograph, and preserve the product's texture and pattern exactly.";

/// Instruction for the garment-mask request.
pub const MASK_EXTRACTION_PROMPT: &str = "Create a clean black and white segmentation mask of \
this photo. Paint every pixel belonging to the upper-body garment worn by the person pure white \
and every other pixel pure black. Return only the mask image, with no gray levels, outlines or \
text.";

/// Build the try-on instruction.
///
/// `aspect_ratio` must already be resolved to a `W:H` string; anything else
/// (including the selector sentinels) is left out of the prompt.
pub fn build_generation_prompt(user_text: &str, aspect_ratio: &str) -> String {
    let base = match user_text.trim() {
        "" => DEFAULT_TRYON_TEMPLATE,
        _ => user_text,
    };
    let mut prompt = format!("{base} {BLENDING_CLAUSE}");

    if is_concrete_ratio(aspect_ratio) {
        prompt.push_str(&format!(
            " The output image must have an aspect ratio of {}.",
            aspect_ratio.trim()
        ));
    } else if !aspect_ratio.trim().is_empty() {
        log::warn!("dropping unresolved aspect ratio '{aspect_ratio}' from prompt");
    }
    prompt
}

/// Build the region-edit instruction. The first payload is the base image,
/// the second the mask. The mask is drawn at on-screen size, so it only
/// matches the base image in aspect ratio.
pub fn build_inpaint_prompt(description: &str) -> String {
    format!(
        "The first image is the base image. The second image is a black and white mask that \
covers the whole base image; scale it to the base image's dimensions before using it. Black \
pixels mark the region to change and white pixels must stay exactly as they are. Edit only the \
black region of the base image as follows: \"{description}\". Keep the base image's resolution \
and blend the edit seamlessly with the surrounding pixels so no seams, halos or color shifts are \
visible."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_uses_default_template_and_names_ratio_last() {
        let prompt = build_generation_prompt("", "4:3");
        assert!(prompt.starts_with(DEFAULT_TRYON_TEMPLATE));
        assert!(prompt.contains(BLENDING_CLAUSE));
        assert!(prompt.ends_with("aspect ratio of 4:3."));
    }

    #[test]
    fn custom_text_is_used_verbatim() {
        let prompt = build_generation_prompt("Put the jacket on her, unzipped.", "1:1");
        assert!(prompt.starts_with("Put the jacket on her, unzipped. "));
        assert!(!prompt.contains(DEFAULT_TRYON_TEMPLATE));
        assert!(prompt.contains(BLENDING_CLAUSE));
    }

    #[test]
    fn whitespace_only_text_counts_as_empty() {
        assert!(build_generation_prompt("   \n", "1:1").starts_with(DEFAULT_TRYON_TEMPLATE));
    }

    #[test]
    fn sentinels_never_appear_as_ratios() {
        let prompt = build_generation_prompt("custom text", "model");
        assert!(!prompt.contains("aspect ratio"));
        assert!(!prompt.contains("model"));
        assert_eq!(prompt, format!("custom text {BLENDING_CLAUSE}"));

        let prompt = build_generation_prompt("", "use-product-ratio");
        assert!(!prompt.contains("aspect ratio of"));
    }

    #[test]
    fn inpaint_prompt_asks_for_mask_scaling() {
        let prompt = build_inpaint_prompt("shorten the hem");
        assert!(!prompt.contains("same size"));
        assert!(prompt.contains("covers the whole base image"));
        assert!(prompt.contains("scale it to the base image's dimensions"));
    }

    #[test]
    fn inpaint_prompt_quotes_description_without_ratio() {
        let prompt = build_inpaint_prompt("fix the sleeve");
        assert!(prompt.contains("\"fix the sleeve\""));
        assert!(prompt.contains("first image is the base image"));
        assert!(prompt.contains("second image is a black and white mask"));
        assert!(!prompt.contains("aspect ratio"));
    }
}
