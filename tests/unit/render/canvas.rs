use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> SourceImage {
    SourceImage::from_rgba8("s.png", w, h, px.repeat((w * h) as usize)).unwrap()
}

fn fixed(width: u32, height: u32) -> PipelineConfig {
    PipelineConfig {
        target_canvas: TargetCanvas::Fixed { width, height },
        ..PipelineConfig::default()
    }
}

#[test]
fn fixed_target_wins_without_quality_preservation() {
    let images = [solid(10, 10, [0; 4]), solid(30, 5, [0; 4])];
    let canvas = resolve_canvas(&images, &fixed(64, 48)).unwrap();
    assert_eq!((canvas.width, canvas.height), (64, 48));
}

#[test]
fn largest_bounds_used_when_preserving_quality_or_fitting() {
    let images = [solid(10, 40, [0; 4]), solid(30, 5, [0; 4])];
    let preserve = PipelineConfig {
        preserve_quality: true,
        ..fixed(64, 48)
    };
    let canvas = resolve_canvas(&images, &preserve).unwrap();
    assert_eq!((canvas.width, canvas.height), (30, 40));

    let fit = PipelineConfig {
        target_canvas: TargetCanvas::FitToLargest,
        ..PipelineConfig::default()
    };
    assert_eq!(resolve_canvas(&images, &fit).unwrap(), canvas);
}

#[test]
fn fit_size_preserves_aspect() {
    let canvas = Canvas::new(200, 100).unwrap();
    assert_eq!(fit_size((400, 400), canvas), (100, 100));
    assert_eq!(fit_size((50, 10), canvas), (200, 40));
    assert_eq!(fit_size((1000, 1), canvas), (200, 1));
}

#[test]
fn normalized_image_is_centered_with_transparent_padding() {
    let img = solid(20, 20, [10, 20, 30, 255]);
    let out = normalize_image(&img, Canvas::new(40, 20).unwrap(), &fixed(40, 20)).unwrap();
    assert_eq!(out.rgba8.len(), 40 * 20 * 4);
    assert_eq!(out.pixel(0, 10), [0, 0, 0, 0]);
    assert_eq!(out.pixel(9, 10), [0, 0, 0, 0]);
    assert_eq!(out.pixel(10, 0), [10, 20, 30, 255]);
    assert_eq!(out.pixel(29, 19), [10, 20, 30, 255]);
    assert_eq!(out.pixel(30, 10), [0, 0, 0, 0]);
}

#[test]
fn exact_size_with_quality_preservation_skips_resampling() {
    let mut data = Vec::new();
    for i in 0..16u8 {
        data.extend_from_slice(&[i * 16, 255 - i * 16, i, 128]);
    }
    let img = SourceImage::from_rgba8("g.png", 4, 4, data.clone()).unwrap();
    let cfg = PipelineConfig {
        preserve_quality: true,
        ..PipelineConfig::default()
    };
    let out = normalize_image(&img, Canvas::new(4, 4).unwrap(), &cfg).unwrap();
    assert_eq!(out.rgba8, data);
}

#[test]
fn normalize_all_keeps_order_and_canvas() {
    let images = [
        solid(100, 50, [255, 0, 0, 255]),
        solid(50, 100, [0, 0, 255, 255]),
    ];
    let cfg = fixed(60, 60);
    let canvas = resolve_canvas(&images, &cfg).unwrap();
    let mut seen = Vec::new();
    let out = normalize_all(&images, canvas, &cfg, &mut |n| {
        seen.push(n);
        Ok(())
    })
    .unwrap();
    assert_eq!(seen, vec![1, 2]);
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|img| img.canvas == Canvas::new(60, 60).unwrap()));
    assert_eq!(out[0].pixel(30, 30), [255, 0, 0, 255]);
    assert_eq!(out[0].pixel(30, 0), [0, 0, 0, 0]);
    assert_eq!(out[1].pixel(30, 30), [0, 0, 255, 255]);
    assert_eq!(out[1].pixel(0, 30), [0, 0, 0, 0]);
}

#[test]
fn normalize_all_stops_when_the_callback_fails() {
    let images: Vec<_> = (0..12).map(|_| solid(4, 4, [1, 2, 3, 255])).collect();
    let canvas = Canvas::new(4, 4).unwrap();
    let mut calls = 0;
    let err = normalize_all(&images, canvas, &fixed(4, 4), &mut |n| {
        calls += 1;
        if n == 3 {
            return Err(FadeGifError::Cancelled);
        }
        Ok(())
    })
    .unwrap_err();
    assert!(matches!(err, FadeGifError::Cancelled));
    assert_eq!(calls, 3);
}

#[test]
fn oversized_computed_canvas_is_an_encode_error() {
    let images = [solid(70_000, 1, [0; 4]), solid(10, 10, [0; 4])];
    let fit = PipelineConfig {
        target_canvas: TargetCanvas::FitToLargest,
        ..PipelineConfig::default()
    };
    assert!(matches!(
        resolve_canvas(&images, &fit),
        Err(FadeGifError::Encode(_))
    ));
    let preserve = PipelineConfig {
        preserve_quality: true,
        ..PipelineConfig::default()
    };
    assert!(matches!(
        resolve_canvas(&images, &preserve),
        Err(FadeGifError::Encode(_))
    ));
}
