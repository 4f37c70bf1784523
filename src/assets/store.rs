use std::{collections::HashMap, sync::Arc};

use rayon::prelude::*;

use crate::{
    assets::{decode::premultiply_rgba8_in_place, source::ImageSource},
    foundation::error::{LoadError, PlumageError, PlumageResult},
    layout::slots::{LayerSlot, Layout},
};

/// Decoded raster image in premultiplied RGBA8 form, shared read-only once stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap premultiplied RGBA8 pixels; `data` must hold exactly `width * height * 4` bytes.
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> PlumageResult<Self> {
        let expected = rgba8_len(width, height)?;
        if data.len() != expected {
            return Err(PlumageError::validation(format!(
                "rgba8 buffer for {width}x{height} must be {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(data),
        })
    }

    /// Wrap straight (non-premultiplied) RGBA8 pixels, premultiplying them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> PlumageResult<Self> {
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul_rgba8(width, height, data)
    }

    /// Image filled with one straight RGBA8 color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> PlumageResult<Self> {
        let len = rgba8_len(width, height)?;
        Self::from_straight_rgba8(width, height, rgba.repeat(len / 4))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major premultiplied RGBA8 bytes.
    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.rgba8_premul[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }
}

pub(crate) fn rgba8_len(width: u32, height: u32) -> PlumageResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| PlumageError::validation("image buffer size overflow"))
}

/// Immutable store of everything the compositor draws from.
///
/// Built in one pass by [`AssetStore::prepare`]; never mutated afterwards, so any number of
/// requests may read it concurrently.
#[derive(Clone, Debug)]
pub struct AssetStore {
    background: PreparedImage,
    default_image: PreparedImage,
    variants: HashMap<LayerSlot, Vec<PreparedImage>>,
}

impl AssetStore {
    /// Load the default image, the background, and every slot collection named by `layout`.
    ///
    /// Variant order is the source's enumeration order. Fails if any image is unreadable or a
    /// slot, whether listed in the layout's slots or referenced by a position, ends up with no
    /// variants.
    #[tracing::instrument(skip_all, fields(slots = layout.slots().len()))]
    pub fn prepare(source: &dyn ImageSource, layout: &Layout) -> Result<Self, LoadError> {
        let default_image = source.load_image(layout.default_image())?;
        let background = source.load_image(layout.background())?;

        let mut variants = HashMap::with_capacity(layout.slots().len());
        for spec in layout.slots() {
            let paths = source.list_collection(&spec.collection)?;
            if paths.is_empty() {
                return Err(LoadError::EmptySlot {
                    slot: spec.slot,
                    collection: spec.collection.clone(),
                });
            }

            let images = paths
                .par_iter()
                .map(|path| source.load_image(path))
                .collect::<Result<Vec<_>, _>>()?;
            tracing::debug!(slot = %spec.slot, variants = images.len(), "loaded slot");
            variants.insert(spec.slot, images);
        }

        // Every slot an identifier can select must be drawable before any request is served.
        if let Some(&slot) = layout
            .positions()
            .iter()
            .find(|slot| variants.get(*slot).is_none_or(Vec::is_empty))
        {
            return Err(LoadError::EmptySlot {
                slot,
                collection: layout
                    .spec(slot)
                    .map(|s| s.collection.clone())
                    .unwrap_or_default(),
            });
        }

        Ok(Self {
            background,
            default_image,
            variants,
        })
    }

    /// Base canvas.
    pub fn background(&self) -> &PreparedImage {
        &self.background
    }

    /// Image served in place of a composite when the service is configured to substitute.
    pub fn default_image(&self) -> &PreparedImage {
        &self.default_image
    }

    /// Variants for `slot` in selection order; empty when the slot was never loaded.
    pub fn variants(&self, slot: LayerSlot) -> &[PreparedImage] {
        self.variants.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Variant count per loaded slot, in [`LayerSlot`] order.
    pub fn variant_counts(&self) -> Vec<(LayerSlot, usize)> {
        let mut out: Vec<_> = self.variants.iter().map(|(s, v)| (*s, v.len())).collect();
        out.sort();
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
