use super::*;
use crate::foundation::core::CropRect;

fn write_png(dir: &Path, name: &str, w: u32, h: u32, px: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(w, h, image::Rgba(px))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn crop_applies_to_every_image() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_png(dir.path(), "a.png", 10, 8, [1, 2, 3, 255]),
        write_png(dir.path(), "b.png", 12, 9, [4, 5, 6, 255]),
    ];
    let cfg = PipelineConfig {
        crop: Some(CropRect::from_edges(1, 1, 6, 5)),
        ..PipelineConfig::default()
    };
    let images = preprocess_all(&paths, &cfg, &mut |_, _| Ok(())).unwrap();
    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|img| (img.width, img.height) == (5, 4)));
    assert_eq!(&images[1].rgba8[..4], &[4, 5, 6, 255]);
}

#[test]
fn crop_outside_any_image_fails() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_png(dir.path(), "big.png", 20, 20, [0, 0, 0, 255]),
        write_png(dir.path(), "small.png", 4, 4, [0, 0, 0, 255]),
    ];
    let cfg = PipelineConfig {
        crop: Some(CropRect::from_edges(0, 0, 10, 10)),
        missing_input: MissingInputPolicy::Skip,
        ..PipelineConfig::default()
    };
    let err = preprocess_all(&paths, &cfg, &mut |_, _| Ok(())).unwrap_err();
    assert!(matches!(err, FadeGifError::InvalidCrop(_)));
}

#[test]
fn missing_inputs_fail_by_default_and_skip_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_png(dir.path(), "a.png", 4, 4, [9, 9, 9, 255]),
        dir.path().join("gone.png"),
        write_png(dir.path(), "c.png", 4, 4, [7, 7, 7, 255]),
    ];

    let err = preprocess_all(&paths, &PipelineConfig::default(), &mut |_, _| Ok(())).unwrap_err();
    assert!(matches!(err, FadeGifError::MissingInput { .. }));

    let cfg = PipelineConfig {
        missing_input: MissingInputPolicy::Skip,
        ..PipelineConfig::default()
    };
    let mut calls = Vec::new();
    let images = preprocess_all(&paths, &cfg, &mut |done, total| {
        calls.push((done, total));
        Ok(())
    })
    .unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(&images[1].rgba8[..4], &[7, 7, 7, 255]);
    assert_eq!(calls, vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn callback_error_stops_loading() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<_> = (0..6)
        .map(|i| write_png(dir.path(), &format!("{i}.png"), 2, 2, [0, 0, 0, 255]))
        .collect();
    let mut calls = 0;
    let err = preprocess_all(&paths, &PipelineConfig::default(), &mut |_, _| {
        calls += 1;
        Err(FadeGifError::Cancelled)
    })
    .unwrap_err();
    assert!(matches!(err, FadeGifError::Cancelled));
    assert_eq!(calls, 1);
}

#[test]
fn sharpening_keeps_dimensions_and_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "s.png", 6, 6, [120, 120, 120, 200]);
    let cfg = PipelineConfig {
        sharpen_strength: 1.5,
        ..PipelineConfig::default()
    };
    let img = preprocess_image(&path, &cfg).unwrap();
    assert_eq!((img.width, img.height), (6, 6));
    assert!(img.rgba8.chunks_exact(4).all(|p| p == [120, 120, 120, 200]));
}
