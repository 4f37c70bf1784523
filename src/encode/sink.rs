use image::ImageEncoder as _;

use crate::foundation::error::EncodeError;
use crate::foundation::math::div_alpha_u8;
use crate::render::compositor::CompositeImage;

/// Output raster format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Baseline JPEG; alpha is flattened over black.
    Jpeg,
    /// Lossless PNG with straight alpha.
    Png,
}

impl OutputFormat {
    /// MIME type announced in responses.
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    fn name(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
        }
    }
}

/// Encoded image bytes plus the content type describing them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    /// Format of `bytes`.
    pub format: OutputFormat,
    /// Encoded payload.
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    /// MIME type of the payload.
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Turns a composite into an encoded byte stream. Called once per successful request.
pub trait ImageEncoder: Send + Sync {
    /// Format this encoder produces.
    fn format(&self) -> OutputFormat;
    /// Encode `image`.
    fn encode(&self, image: &CompositeImage) -> Result<EncodedImage, EncodeError>;
}

/// Encoder settings, as configured on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOpts {
    /// Output format.
    pub format: OutputFormat,
    /// JPEG quality in `1..=100`; ignored for PNG.
    pub quality: u8,
}

impl Default for EncodeOpts {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: 95,
        }
    }
}

impl EncodeOpts {
    /// Build the encoder these options describe.
    pub fn build(self) -> Result<Box<dyn ImageEncoder>, EncodeError> {
        Ok(match self.format {
            OutputFormat::Jpeg => Box::new(JpegEncoder::new(self.quality)?),
            OutputFormat::Png => Box::new(PngEncoder),
        })
    }
}

/// JPEG encoder at a fixed quality.
#[derive(Clone, Copy, Debug)]
pub struct JpegEncoder {
    quality: u8,
}

impl JpegEncoder {
    /// Encoder at `quality` (`1..=100`).
    pub fn new(quality: u8) -> Result<Self, EncodeError> {
        if !(1..=100).contains(&quality) {
            return Err(EncodeError::Quality(quality));
        }
        Ok(Self { quality })
    }

    /// Configured quality.
    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(&self, image: &CompositeImage) -> Result<EncodedImage, EncodeError> {
        // Premultiplied color is already the color over black.
        let rgb: Vec<u8> = image
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        let mut bytes = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, self.quality)
            .write_image(&rgb, image.width, image.height, image::ExtendedColorType::Rgb8)
            .map_err(|source| EncodeError::Codec {
                format: OutputFormat::Jpeg.name(),
                source,
            })?;
        Ok(EncodedImage {
            format: OutputFormat::Jpeg,
            bytes,
        })
    }
}

/// Lossless PNG encoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(&self, image: &CompositeImage) -> Result<EncodedImage, EncodeError> {
        let straight = unpremultiply_rgba8(&image.data);

        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(
                &straight,
                image.width,
                image.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|source| EncodeError::Codec {
                format: OutputFormat::Png.name(),
                source,
            })?;
        Ok(EncodedImage {
            format: OutputFormat::Png,
            bytes,
        })
    }
}

pub(crate) fn unpremultiply_rgba8(premul: &[u8]) -> Vec<u8> {
    let mut out = premul.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = px[3];
        if a == 255 {
            continue;
        }
        px[0] = div_alpha_u8(px[0], a);
        px[1] = div_alpha_u8(px[1], a);
        px[2] = div_alpha_u8(px[2], a);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
