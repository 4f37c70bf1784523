use std::io::Cursor;

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "plumage_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn write_png(path: &Path, rgba: [u8; 4]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, &buf).unwrap();
}

fn px(v: u8) -> PreparedImage {
    PreparedImage::solid(1, 1, [v, v, v, 255]).unwrap()
}

#[test]
fn dir_source_lists_pngs_sorted_and_skips_other_files() {
    let tmp = temp_dir("dir_source_list");
    write_png(&tmp.join("heads/b.png"), [2, 2, 2, 255]);
    write_png(&tmp.join("heads/a.png"), [1, 1, 1, 255]);
    write_png(&tmp.join("heads/C.PNG"), [3, 3, 3, 255]);
    std::fs::write(tmp.join("heads/notes.txt"), "x").unwrap();
    std::fs::create_dir_all(tmp.join("heads/nested.png")).unwrap();

    let src = DirSource::new(&tmp);
    let paths = src.list_collection("heads").unwrap();
    assert_eq!(paths, vec!["heads/C.PNG", "heads/a.png", "heads/b.png"]);

    let img = src.load_image(&paths[1]).unwrap();
    assert_eq!(img.pixel(0, 0), Some([1, 1, 1, 255]));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn dir_source_reports_missing_files_and_collections() {
    let tmp = temp_dir("dir_source_missing");
    std::fs::create_dir_all(&tmp).unwrap();
    let src = DirSource::new(&tmp);

    assert!(matches!(
        src.load_image("bg/missing.png"),
        Err(LoadError::Read { path, .. }) if path == "bg/missing.png"
    ));
    assert!(matches!(
        src.list_collection("wing"),
        Err(LoadError::List { collection, .. }) if collection == "wing"
    ));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn dir_source_reports_undecodable_files() {
    let tmp = temp_dir("dir_source_corrupt");
    std::fs::create_dir_all(&tmp).unwrap();
    std::fs::write(tmp.join("broken.png"), b"not an image").unwrap();

    let err = DirSource::new(&tmp).load_image("broken.png").unwrap_err();
    assert!(matches!(err, LoadError::Decode { .. }));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn dir_source_refuses_to_escape_root() {
    let src = DirSource::new(std::env::temp_dir());
    assert!(matches!(
        src.load_image("../etc/passwd"),
        Err(LoadError::Read { .. })
    ));
    assert!(src.list_collection("/abs").is_err());
}

#[test]
fn memory_source_lists_direct_children_in_path_order() {
    let src = MemorySource::new()
        .with_image("wing/02.png", px(2))
        .with_image("wing/01.png", px(1))
        .with_image("wing/deep/03.png", px(3))
        .with_image("wings/04.png", px(4))
        .with_image("bg.png", px(9));

    assert_eq!(
        src.list_collection("wing").unwrap(),
        vec!["wing/01.png", "wing/02.png"]
    );
    assert!(src.list_collection("feet").unwrap().is_empty());
    assert_eq!(src.load_image("bg.png").unwrap(), px(9));
    assert!(src.load_image("nope.png").is_err());
    assert_eq!(src.len(), 5);
}

#[test]
fn normalize_path_cross_platform() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/x.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[cfg(target_os = "linux")]
#[test]
fn dir_source_rejects_non_utf8_variant_names() {
    use std::os::unix::ffi::OsStrExt;

    let tmp = temp_dir("dir_source_non_utf8");
    write_png(&tmp.join("wing").join("a.png"), [1, 2, 3, 255]);
    let odd = std::ffi::OsStr::from_bytes(b"b\xff.png");
    write_png(&tmp.join("wing").join(odd), [4, 5, 6, 255]);

    let err = DirSource::new(&tmp).list_collection("wing").unwrap_err();
    assert!(matches!(err, LoadError::List { collection, .. } if collection == "wing"));

    std::fs::remove_dir_all(&tmp).ok();
}
