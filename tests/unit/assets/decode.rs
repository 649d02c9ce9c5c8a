use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(px));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_keeps_straight_rgba() {
    let bytes = png_bytes(3, 2, [100, 50, 200, 128]);
    let img = decode_image(&bytes).unwrap();
    assert_eq!((img.width, img.height), (3, 2));
    assert_eq!(img.rgba8.len(), 3 * 2 * 4);
    assert_eq!(&img.rgba8[..4], &[100, 50, 200, 128]);
    assert!(img.icc_profile.is_none());
}

#[test]
fn decode_garbage_fails() {
    assert!(decode_image(b"definitely not an image").is_err());
}

#[test]
fn load_missing_path_is_missing_input() {
    let err = load_image(Path::new("does/not/exist.png")).unwrap_err();
    assert!(matches!(err, FadeGifError::MissingInput { .. }));
}

#[test]
fn load_undecodable_file_is_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"\x89PNG but not really").unwrap();
    let err = load_image(&path).unwrap_err();
    assert!(matches!(err, FadeGifError::MissingInput { .. }));
}

#[test]
fn load_records_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ok.png");
    std::fs::write(&path, png_bytes(4, 4, [1, 2, 3, 255])).unwrap();
    let img = load_image(&path).unwrap();
    assert_eq!(img.path, path);
}

#[test]
fn from_rgba8_validates_length() {
    assert!(SourceImage::from_rgba8("x", 2, 2, vec![0; 16]).is_ok());
    assert!(SourceImage::from_rgba8("x", 2, 2, vec![0; 15]).is_err());
    assert!(SourceImage::from_rgba8("x", 0, 2, vec![]).is_err());
}
