use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::client::{ImageGenerator, TextModel};
use crate::error::{StudioError, StudioResult};
use crate::request::{GenerationRequest, ImageHandle};

const DRYRUN_SIZE: u32 = 64;

/// Offline stand-in for both hosted models.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryrunClient;

impl DryrunClient {
    pub fn new() -> Self {
        Self
    }
}

impl ImageGenerator for DryrunClient {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn generate(&self, request: &GenerationRequest) -> StudioResult<ImageHandle> {
        let (r, g, b) = color_from_request(request);
        let mut image = RgbImage::new(DRYRUN_SIZE, DRYRUN_SIZE);
        for pixel in image.pixels_mut() {
            *pixel = Rgb([r, g, b]);
        }
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|err| StudioError::GenerationFailed(format!("dryrun encode failed: {err}")))?;
        debug!(
            references = request.reference_images.len(),
            aspect_ratio = %request.aspect_ratio,
            "dryrun image rendered"
        );
        Ok(ImageHandle::from_bytes("image/png", &png))
    }
}

impl TextModel for DryrunClient {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn complete(&self, prompt: &str) -> StudioResult<String> {
        let digest = hex::encode(&Sha256::digest(prompt.as_bytes())[..4]);
        Ok(format!(
            "A vivid, well-lit scene built around the post's subject, composed for the target platform (draft {digest})."
        ))
    }
}

fn color_from_request(request: &GenerationRequest) -> (u8, u8, u8) {
    let mut hasher = Sha256::new();
    hasher.update(request.instruction.as_bytes());
    hasher.update(request.aspect_ratio.as_str().as_bytes());
    let digest = hasher.finalize();
    (digest[0], digest[1], digest[2])
}

#[cfg(test)]
mod tests {
    use super::DryrunClient;
    use crate::client::{ImageGenerator, TextModel};
    use crate::request::build_request;

    #[test]
    fn renders_a_decodable_png_that_depends_on_the_instruction() -> anyhow::Result<()> {
        let client = DryrunClient::new();
        let first = client.generate(&build_request("A red barn.", &[], None)?)?;
        let again = client.generate(&build_request("A red barn.", &[], None)?)?;
        let other = client.generate(&build_request("A blue lake.", &[], None)?)?;

        assert_eq!(first, again);
        assert_ne!(first, other);

        let decoded = first.decode()?;
        assert_eq!(decoded.mime_type, "image/png");
        let image = image::load_from_memory(&decoded.bytes)?;
        assert_eq!(image.width(), 64);
        Ok(())
    }

    #[test]
    fn draft_text_is_never_empty() -> anyhow::Result<()> {
        let text = DryrunClient::new().complete("topic: launch day")?;
        assert!(!text.trim().is_empty());
        Ok(())
    }
}
