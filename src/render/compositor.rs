use crate::{
    assets::store::{AssetStore, PreparedImage},
    codec::identifier::SelectionSequence,
    foundation::{core::PlacementRect, error::RenderError},
    layout::slots::Layout,
    render::composite::draw_over,
};

/// Flattened composite owned by one request. Premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub data: Vec<u8>,
}

impl CompositeImage {
    /// Fresh working image holding a copy of `base` (copy semantics, no blending).
    pub fn copy_of(base: &PreparedImage) -> Self {
        Self {
            width: base.width(),
            height: base.height(),
            data: base.rgba8_premul().to_vec(),
        }
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.data[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }
}

/// Stacks selected variants onto a copy of the background.
#[derive(Clone, Copy, Debug)]
pub struct Compositor<'a> {
    store: &'a AssetStore,
    layout: &'a Layout,
}

impl<'a> Compositor<'a> {
    /// Compositor drawing from `store` at the placements in `layout`.
    pub fn new(store: &'a AssetStore, layout: &'a Layout) -> Self {
        Self { store, layout }
    }

    /// Composite `selection` over the background, in selection order.
    ///
    /// Every selection is resolved before the first layer is drawn, so an out-of-range index
    /// fails the whole render and no partial composite exists.
    #[tracing::instrument(level = "debug", skip_all, fields(layers = selection.len()))]
    pub fn render(&self, selection: &SelectionSequence) -> Result<CompositeImage, RenderError> {
        let layers = selection
            .iter()
            .map(|sel| {
                let variants = self.store.variants(sel.slot);
                let image = variants
                    .get(sel.variant)
                    .ok_or(RenderError::IndexOutOfRange {
                        slot: sel.slot,
                        index: sel.variant,
                        len: variants.len(),
                    })?;
                let rect = self
                    .layout
                    .placement(sel.slot)
                    .ok_or(RenderError::MissingPlacement { slot: sel.slot })?;
                Ok((image, rect))
            })
            .collect::<Result<Vec<(&PreparedImage, PlacementRect)>, RenderError>>()?;

        let mut out = CompositeImage::copy_of(self.store.background());
        for (image, rect) in layers {
            draw_over(&mut out.data, out.width, out.height, image, rect);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
