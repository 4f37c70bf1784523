use std::sync::Arc;

use crate::{
    assets::loader::AssetLoader,
    codec::identifier::decode_with_order,
    encode::sink::{EncodedImage, ImageEncoder},
    foundation::error::PlumageResult,
    render::compositor::{CompositeImage, Compositor},
};

/// `Cache-Control` value sent with every successful thumbnail: public, three days.
pub const CACHE_CONTROL: &str = "public, max-age=259200";

/// The per-request pipeline: load once, decode, composite, encode.
///
/// Holds no per-request state; one instance serves every worker thread.
pub struct ThumbnailService {
    loader: Arc<AssetLoader>,
    encoder: Box<dyn ImageEncoder>,
}

impl ThumbnailService {
    /// Service drawing from `loader` and encoding with `encoder`.
    pub fn new(loader: Arc<AssetLoader>, encoder: Box<dyn ImageEncoder>) -> Self {
        Self { loader, encoder }
    }

    /// The loader backing this service.
    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    /// The encoder used for every response.
    pub fn encoder(&self) -> &dyn ImageEncoder {
        self.encoder.as_ref()
    }

    /// Composite the thumbnail selected by `identifier`, without encoding it.
    pub fn composite(&self, identifier: &str) -> PlumageResult<CompositeImage> {
        let store = self.loader.ensure_loaded()?;
        let layout = self.loader.layout();
        let selection = decode_with_order(layout.positions(), identifier)?;
        Ok(Compositor::new(store, layout).render(&selection)?)
    }

    /// Composite and encode the thumbnail selected by `identifier`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn thumbnail(&self, identifier: &str) -> PlumageResult<EncodedImage> {
        let image = self.composite(identifier)?;
        Ok(self.encoder.encode(&image)?)
    }

    /// Encode the default image.
    pub fn default_thumbnail(&self) -> PlumageResult<EncodedImage> {
        let store = self.loader.ensure_loaded()?;
        let image = CompositeImage::copy_of(store.default_image());
        Ok(self.encoder.encode(&image)?)
    }
}

impl std::fmt::Debug for ThumbnailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailService")
            .field("loader", &self.loader)
            .field("format", &self.encoder.format())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/thumbnail.rs"]
mod tests;
