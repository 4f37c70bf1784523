use anyhow::Context;

use crate::{
    assets::store::PreparedImage,
    foundation::{error::PlumageResult, math::mul_div255_u8},
};

/// Decode encoded image bytes (PNG or JPEG) and normalize to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> PlumageResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut px = rgba.into_raw();
    premultiply_rgba8_in_place(&mut px);

    PreparedImage::from_premul_rgba8(width, height, px)
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
