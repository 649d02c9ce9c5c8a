use std::collections::HashSet;

use super::*;
use crate::{
    config::model::QuantizeMethod,
    render::frame::{Frame, FrameRole},
};

fn noisy_rgba(w: u32, h: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            out.extend_from_slice(&[
                (x * 255 / w) as u8,
                (y * 255 / h) as u8,
                ((x * 31 + y * 17) % 256) as u8,
                255,
            ]);
        }
    }
    out
}

fn distinct(ix: &IndexedPixels) -> usize {
    ix.indices
        .iter()
        .map(|&i| ix.palette[usize::from(i)])
        .collect::<HashSet<_>>()
        .len()
}

#[test]
fn flatten_composites_against_background() {
    let rgba = [255, 0, 0, 255, 0, 0, 0, 0, 0, 0, 0, 128];
    let rgb = flatten_onto_background(&rgba, [255, 255, 255]).unwrap();
    assert_eq!(&rgb[0..3], &[255, 0, 0]);
    assert_eq!(&rgb[3..6], &[255, 255, 255]);
    assert_eq!(&rgb[6..9], &[127, 127, 127]);
    assert!(flatten_onto_background(&[0; 3], [0; 3]).is_err());
}

#[test]
fn adaptive_frames_stay_within_256_colors() {
    let canvas = Canvas::new(64, 64).unwrap();
    let rgb = flatten_onto_background(&noisy_rgba(64, 64), [255, 255, 255]).unwrap();
    assert!(histogram(&rgb).len() > 256);
    for quantize in [
        QuantizeMethod::MedianCut,
        QuantizeMethod::MaxCoverage,
        QuantizeMethod::FastOctree,
    ] {
        for dither in [
            DitherMethod::FloydSteinberg,
            DitherMethod::Ordered,
            DitherMethod::None,
        ] {
            let cfg = PipelineConfig {
                quantize,
                dither,
                ..PipelineConfig::default()
            };
            let ix = reduce_adaptive(&rgb, canvas, &cfg).unwrap();
            assert_eq!(ix.indices.len(), 64 * 64);
            assert!(ix.palette.len() <= 256);
            assert!(distinct(&ix) <= 256);
        }
    }
}

#[test]
fn few_colors_are_reproduced_exactly() {
    let canvas = Canvas::new(2, 2).unwrap();
    let rgb = vec![10, 20, 30, 200, 100, 0, 10, 20, 30, 1, 2, 3];
    let ix = reduce_adaptive(&rgb, canvas, &PipelineConfig::default()).unwrap();
    assert_eq!(FramePixels::Indexed(ix).to_rgb8().unwrap(), rgb);
}

#[test]
fn sequence_reduction_keeps_durations_and_paths() {
    let canvas = Canvas::new(8, 8).unwrap();
    let mut seq = FrameSequence::new(canvas);
    for (d, role) in [(500, FrameRole::Keyframe), (50, FrameRole::Transition)] {
        seq.push(Frame {
            pixels: FramePixels::Rgba(noisy_rgba(8, 8)),
            duration_ms: d,
            role,
        })
        .unwrap();
    }

    let mut seen = Vec::new();
    let flat = reduce_sequence(seq.clone(), &PipelineConfig::default(), &mut |n| {
        seen.push(n);
        Ok(())
    })
    .unwrap();
    assert_eq!(seen, vec![1, 2]);
    assert_eq!(flat.durations_ms(), vec![500, 50]);
    assert!(
        flat.frames()
            .iter()
            .all(|f| matches!(f.pixels, FramePixels::Rgb(_)))
    );

    let cfg = PipelineConfig {
        preserve_quality: true,
        ..PipelineConfig::default()
    };
    let indexed = reduce_sequence(seq, &cfg, &mut |_| Ok(())).unwrap();
    assert_eq!(indexed.frames()[1].role, FrameRole::Transition);
    assert!(
        indexed
            .frames()
            .iter()
            .all(|f| matches!(f.pixels, FramePixels::Indexed(_)))
    );
}
