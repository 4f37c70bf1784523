use super::*;
use crate::assets::{loader::AssetLoader, source::MemorySource, store::PreparedImage};
use crate::encode::sink::PngEncoder;
use crate::foundation::core::PlacementRect;
use crate::layout::slots::{LayerSlot, Layout, SlotSpec};

fn solid(v: u8) -> PreparedImage {
    PreparedImage::solid(2, 2, [v, v, v, 255]).unwrap()
}

fn service() -> ThumbnailService {
    let layout = Layout::new(
        "bg.png",
        "default.png",
        vec![SlotSpec {
            slot: LayerSlot::Wing,
            collection: "wing".to_string(),
            rect: PlacementRect::new(0, 0, 2, 2).unwrap(),
        }],
        vec![LayerSlot::Wing, LayerSlot::Wing],
    )
    .unwrap();
    let source = MemorySource::new()
        .with_image("bg.png", solid(10))
        .with_image("default.png", solid(20))
        .with_image("wing/0.png", solid(30))
        .with_image("wing/1.png", solid(31));
    let loader = AssetLoader::new(Arc::new(source), Arc::new(layout));
    ThumbnailService::new(Arc::new(loader), Box::new(PngEncoder))
}

fn decoded_gray(reply: &Reply) -> u8 {
    image::load_from_memory(&reply.body).unwrap().to_rgba8().get_pixel(0, 0).0[0]
}

#[test]
fn good_identifier_is_served_with_cache_headers() {
    let svc = service();
    let reply = route(&svc, BadIdPolicy::Status, "GET", "/thumb/01");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type, "image/png");
    assert_eq!(reply.cache_control, Some("public, max-age=259200"));
    // the later position draws over the earlier one
    assert_eq!(decoded_gray(&reply), 31);
}

#[test]
fn query_string_is_ignored_and_case_does_not_matter() {
    let svc = service();
    let a = route(&svc, BadIdPolicy::Status, "GET", "/thumb/10?v=2");
    assert_eq!(a.status, 200);
    assert_eq!(decoded_gray(&a), 30);
    let b = route(&svc, BadIdPolicy::Status, "GET", "/thumb/1A");
    assert_eq!(b.status, 500);
}

#[test]
fn malformed_identifier_is_400_under_status_policy() {
    let svc = service();
    for url in ["/thumb/", "/thumb/0", "/thumb/zz", "/thumb/000"] {
        let reply = route(&svc, BadIdPolicy::Status, "GET", url);
        assert_eq!(reply.status, 400, "{url}");
        assert_eq!(reply.cache_control, None);
        assert!(reply.content_type.starts_with("text/plain"));
    }
}

#[test]
fn malformed_identifier_gets_default_image_under_substitution_policy() {
    let svc = service();
    let reply = route(&svc, BadIdPolicy::DefaultImage, "GET", "/thumb/nope");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.cache_control, None);
    assert_eq!(decoded_gray(&reply), 20);
}

#[test]
fn out_of_range_is_500_even_under_substitution_policy() {
    let svc = service();
    let reply = route(&svc, BadIdPolicy::DefaultImage, "GET", "/thumb/0f");
    assert_eq!(reply.status, 500);
    assert_eq!(reply.cache_control, None);
}

#[test]
fn unknown_paths_and_methods_are_rejected() {
    let svc = service();
    assert_eq!(route(&svc, BadIdPolicy::Status, "GET", "/").status, 404);
    assert_eq!(route(&svc, BadIdPolicy::Status, "GET", "/thumbs/00").status, 404);
    assert_eq!(route(&svc, BadIdPolicy::Status, "POST", "/thumb/00").status, 405);
    // nothing above needed the assets
    assert_eq!(svc.loader().populations(), 0);
}

#[test]
fn load_failure_is_500() {
    let layout = Layout::reference();
    let loader = AssetLoader::new(Arc::new(MemorySource::new()), Arc::new(layout));
    let svc = ThumbnailService::new(Arc::new(loader), Box::new(PngEncoder));
    let reply = route(&svc, BadIdPolicy::DefaultImage, "GET", "/thumb/00000000");
    assert_eq!(reply.status, 500);
}

#[test]
fn serve_opts_default_to_port_8080_and_status_policy() {
    let opts = ServeOpts::default();
    assert_eq!(opts.addr, "0.0.0.0:8080");
    assert!(opts.workers >= 1);
    assert!(!opts.eager);
    assert_eq!(opts.bad_id, BadIdPolicy::Status);
}

#[test]
fn path_is_percent_decoded_before_matching() {
    let svc = service();
    let plain = route(&svc, BadIdPolicy::Status, "GET", "/thumb/01");
    let escaped = route(&svc, BadIdPolicy::Status, "GET", "/thumb/0%31");
    assert_eq!(escaped.status, 200);
    assert_eq!(escaped, plain);
    assert_eq!(route(&svc, BadIdPolicy::Status, "GET", "/%74humb/01").status, 200);
    assert_eq!(route(&svc, BadIdPolicy::Status, "GET", "/thumb/%ff%fe").status, 400);
}

#[test]
fn head_is_answered_like_get() {
    let svc = service();
    let get = route(&svc, BadIdPolicy::Status, "GET", "/thumb/10");
    let head = route(&svc, BadIdPolicy::Status, "HEAD", "/thumb/10");
    assert_eq!(head.status, 200);
    assert_eq!(head.cache_control, Some(CACHE_CONTROL));
    assert_eq!(head, get);
    assert_eq!(route(&svc, BadIdPolicy::Status, "HEAD", "/thumb/zz").status, 400);
}
