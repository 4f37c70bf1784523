//! Plumage composites layered thumbnails and serves them over HTTP.
//!
//! A request path such as `/thumb/3a0f19c2` carries an identifier with one hex digit per layer
//! slot. Each digit picks a variant image for its slot; the variants are stacked onto a fixed
//! background and the result is encoded and returned.
//!
//! # Pipeline overview
//!
//! 1. **Load once**: [`AssetLoader::ensure_loaded`] populates an immutable [`AssetStore`] from an
//!    [`ImageSource`] on first use; concurrent callers wait for that single population.
//! 2. **Decode**: [`decode`] maps the identifier to a [`SelectionSequence`] in the fixed
//!    [`Layout`] position order.
//! 3. **Composite**: [`Compositor::render`] copies the background and draws each selected
//!    variant source-over at its slot's placement.
//! 4. **Encode**: an [`ImageEncoder`] turns the [`CompositeImage`] into JPEG or PNG bytes.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No IO after load**: decoding and compositing are pure and deterministic.
//! - **Premultiplied RGBA8** internally; encoders convert on the way out.
//! - **No silent clamping**: an out-of-range variant fails the request.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod codec;
mod encode;
mod foundation;
mod layout;
mod render;
mod server;
mod service;

pub use assets::decode::decode_image;
pub use assets::loader::{AssetLoader, LoaderState};
pub use assets::source::{DirSource, ImageSource, MemorySource, normalize_rel_path};
pub use assets::store::{AssetStore, PreparedImage};
pub use codec::identifier::{
    Selection, SelectionSequence, decode, decode_with_order, encode_identifier,
};
pub use encode::sink::{
    EncodeOpts, EncodedImage, ImageEncoder, JpegEncoder, OutputFormat, PngEncoder,
};
pub use foundation::core::PlacementRect;
pub use foundation::error::{
    DecodeError, EncodeError, LoadError, PlumageError, PlumageResult, RenderError,
};
pub use layout::slots::{
    LayerSlot, Layout, REFERENCE_BACKGROUND, REFERENCE_DEFAULT_IMAGE, REFERENCE_ORDER, SlotSpec,
};
pub use render::compositor::{CompositeImage, Compositor};
pub use server::http::{BadIdPolicy, ROUTE_PREFIX, Reply, ServeOpts, route, serve};
pub use service::thumbnail::{CACHE_CONTROL, ThumbnailService};
