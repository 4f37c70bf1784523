use super::*;
use crate::assets::{source::MemorySource, store::PreparedImage};
use crate::encode::sink::{OutputFormat, PngEncoder};
use crate::foundation::core::PlacementRect;
use crate::foundation::error::{DecodeError, LoadError, PlumageError, RenderError};
use crate::layout::slots::{LayerSlot, Layout, SlotSpec};

fn solid(v: u8) -> PreparedImage {
    PreparedImage::solid(2, 2, [v, v, v, 255]).unwrap()
}

fn layout() -> Arc<Layout> {
    Arc::new(
        Layout::new(
            "bg.png",
            "default.png",
            vec![
                SlotSpec {
                    slot: LayerSlot::Head,
                    collection: "heads".to_string(),
                    rect: PlacementRect::new(0, 0, 1, 1).unwrap(),
                },
                SlotSpec {
                    slot: LayerSlot::Feet,
                    collection: "feet".to_string(),
                    rect: PlacementRect::new(1, 1, 2, 2).unwrap(),
                },
            ],
            vec![LayerSlot::Head, LayerSlot::Feet],
        )
        .unwrap(),
    )
}

fn service(source: MemorySource) -> ThumbnailService {
    let loader = AssetLoader::new(Arc::new(source), layout());
    ThumbnailService::new(Arc::new(loader), Box::new(PngEncoder))
}

fn full_source() -> MemorySource {
    MemorySource::new()
        .with_image("bg.png", solid(10))
        .with_image("default.png", solid(20))
        .with_image("heads/0.png", solid(30))
        .with_image("heads/1.png", solid(31))
        .with_image("feet/0.png", solid(40))
}

#[test]
fn composite_runs_the_whole_pipeline() {
    let svc = service(full_source());
    let img = svc.composite("10").unwrap();
    assert_eq!(img.pixel(0, 0), Some([31, 31, 31, 255]));
    assert_eq!(img.pixel(1, 1), Some([40, 40, 40, 255]));
    assert_eq!(img.pixel(1, 0), Some([10, 10, 10, 255]));
    assert_eq!(svc.loader().populations(), 1);
}

#[test]
fn thumbnail_encodes_with_configured_encoder() {
    let svc = service(full_source());
    let out = svc.thumbnail("00").unwrap();
    assert_eq!(out.format, OutputFormat::Png);
    let back = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    assert_eq!(back.get_pixel(0, 0).0, [30, 30, 30, 255]);
}

#[test]
fn bad_identifier_is_a_decode_error() {
    let svc = service(full_source());
    assert!(matches!(
        svc.thumbnail("000"),
        Err(PlumageError::Decode(DecodeError::BadLength {
            expected: 2,
            actual: 3
        }))
    ));
    assert!(matches!(
        svc.thumbnail("0q"),
        Err(PlumageError::Decode(DecodeError::BadCharacter { position: 1, .. }))
    ));
}

#[test]
fn out_of_range_variant_is_a_render_error() {
    let svc = service(full_source());
    assert!(matches!(
        svc.thumbnail("f0"),
        Err(PlumageError::Render(RenderError::IndexOutOfRange {
            slot: LayerSlot::Head,
            index: 15,
            len: 2
        }))
    ));
}

#[test]
fn load_failure_surfaces_before_decoding() {
    let svc = service(MemorySource::new().with_image("default.png", solid(20)));
    // even a malformed identifier reports the load failure first
    assert!(matches!(
        svc.thumbnail("x"),
        Err(PlumageError::Load(LoadError::Read { .. }))
    ));
    assert!(svc.default_thumbnail().is_err());
}

#[test]
fn default_thumbnail_encodes_default_image() {
    let svc = service(full_source());
    let out = svc.default_thumbnail().unwrap();
    let back = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    assert_eq!(back.get_pixel(1, 1).0, [20, 20, 20, 255]);
}
