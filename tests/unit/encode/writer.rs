use std::collections::HashSet;

use super::*;
use crate::{
    encode::inspect::{decode_gif_frames, inspect_gif},
    foundation::core::Canvas,
    render::frame::{Frame, FrameRole},
};

fn indexed_seq(durations: &[u32]) -> FrameSequence {
    let canvas = Canvas::new(4, 2).unwrap();
    let mut seq = FrameSequence::new(canvas);
    for (i, &d) in durations.iter().enumerate() {
        let mut palette = vec![[0, 0, 0]; 256];
        palette[0] = [255, 0, 0];
        palette[200] = [0, 0, 255];
        let idx = if i % 2 == 0 { 0 } else { 200 };
        seq.push(Frame {
            pixels: FramePixels::Indexed(IndexedPixels {
                palette,
                indices: vec![idx; 8],
            }),
            duration_ms: d,
            role: FrameRole::Keyframe,
        })
        .unwrap();
    }
    seq
}

fn opts(loop_count: u16, optimize: bool) -> GifEncodeOpts {
    GifEncodeOpts {
        loop_count,
        optimize,
        quality: 95,
    }
}

#[test]
fn delays_round_to_centiseconds() {
    assert_eq!(delay_centis(500), 50);
    assert_eq!(delay_centis(100), 10);
    assert_eq!(delay_centis(15), 2);
    assert_eq!(delay_centis(14), 1);
    assert_eq!(delay_centis(0), 1);
    assert_eq!(delay_centis(u32::MAX), u16::MAX);
}

#[test]
fn quality_maps_onto_neuquant_speed() {
    let speed = |quality| {
        GifEncodeOpts {
            quality,
            ..opts(0, false)
        }
        .neuquant_speed()
    };
    assert_eq!(speed(100), 1);
    assert_eq!(speed(0), 30);
    assert_eq!(speed(95), 3);
}

#[test]
fn trim_palette_keeps_only_used_entries() {
    let ix = IndexedPixels {
        palette: vec![[1, 1, 1], [2, 2, 2], [3, 3, 3], [4, 4, 4]],
        indices: vec![3, 1, 3, 3],
    };
    let trimmed = trim_palette(&ix);
    assert_eq!(trimmed.palette, vec![[4, 4, 4], [2, 2, 2]]);
    assert_eq!(trimmed.indices, vec![0, 1, 0, 0]);
}

#[test]
fn written_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("anim.gif");
    write_gif(&indexed_seq(&[500, 100, 100, 500]), &out, &opts(0, false)).unwrap();

    let info = inspect_gif(&out).unwrap();
    assert_eq!((info.width, info.height), (4, 2));
    assert_eq!(info.frame_count, 4);
    assert_eq!(info.durations_ms, vec![500, 100, 100, 500]);
    assert_eq!(info.loop_count, Some(0));

    let frames = decode_gif_frames(&out).unwrap();
    assert_eq!(&frames[0][..4], &[255, 0, 0, 255]);
    assert_eq!(&frames[1][..4], &[0, 0, 255, 255]);
}

#[test]
fn finite_loops_and_optimized_palettes_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("anim.GIF");
    write_gif(&indexed_seq(&[200, 30]), &out, &opts(3, true)).unwrap();
    let info = inspect_gif(&out).unwrap();
    assert_eq!(info.loop_count, Some(3));
    assert_eq!(info.durations_ms, vec![200, 30]);
    let frames = decode_gif_frames(&out).unwrap();
    assert_eq!(&frames[1][..4], &[0, 0, 255, 255]);
}

#[test]
fn optimized_output_is_smaller() {
    let dir = tempfile::tempdir().unwrap();
    let full = dir.path().join("full.gif");
    let small = dir.path().join("small.gif");
    let seq = indexed_seq(&[100, 100, 100]);
    write_gif(&seq, &full, &opts(0, false)).unwrap();
    write_gif(&seq, &small, &opts(0, true)).unwrap();
    let len = |p: &Path| std::fs::metadata(p).unwrap().len();
    assert!(len(&small) < len(&full));
}

#[test]
fn rgb_frames_are_quantized_by_the_encoder() {
    let canvas = Canvas::new(3, 3).unwrap();
    let mut seq = FrameSequence::new(canvas);
    seq.push(Frame {
        pixels: FramePixels::Rgb([0, 200, 0].repeat(9)),
        duration_ms: 40,
        role: FrameRole::Transition,
    })
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("rgb.gif");
    write_gif(&seq, &out, &opts(0, false)).unwrap();
    let frames = decode_gif_frames(&out).unwrap();
    let px = &frames[0][..4];
    assert!(px[0] < 8 && px[1] > 192 && px[2] < 8, "{px:?}");
}

fn resolve(frame: &gif::Frame<'_>) -> Vec<[u8; 3]> {
    let palette = frame.palette.as_deref().unwrap();
    frame
        .buffer
        .iter()
        .map(|&i| {
            let i = usize::from(i) * 3;
            [palette[i], palette[i + 1], palette[i + 2]]
        })
        .collect()
}

#[test]
fn optimize_trims_encoder_palettes_of_rgb_frames() {
    // 20x20 gradient: 400 distinct colors, so the encoder falls back to NeuQuant.
    let mut rgb = Vec::new();
    for y in 0..20u8 {
        for x in 0..20u8 {
            rgb.extend_from_slice(&[x * 12, y * 12, 255 - x * 6]);
        }
    }
    let pixels = FramePixels::Rgb(rgb);
    let plain = to_gif_frame(&pixels, 40, 20, 20, &opts(0, false)).unwrap();
    let trimmed = to_gif_frame(&pixels, 40, 20, 20, &opts(0, true)).unwrap();

    let entries = trimmed.palette.as_deref().unwrap().len() / 3;
    let used: HashSet<u8> = trimmed.buffer.iter().copied().collect();
    assert_eq!(used.len(), entries);
    assert!(entries <= plain.palette.as_deref().unwrap().len() / 3);
    assert_eq!(resolve(&trimmed), resolve(&plain));
    assert_eq!(trimmed.delay, 4);
}

#[test]
fn wrong_extension_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("anim.png");
    let err = write_gif(&indexed_seq(&[100, 100]), &out, &opts(0, false)).unwrap_err();
    assert!(matches!(err, FadeGifError::Encode(_)));
    assert!(!out.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn unwritable_destination_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("missing-dir").join("anim.gif");
    let err = write_gif(&indexed_seq(&[100, 100]), &out, &opts(0, false)).unwrap_err();
    assert!(matches!(err, FadeGifError::Encode(_)));
    assert!(!out.exists());
}

#[test]
fn progress_error_aborts_and_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("anim.gif");
    let mut seen = Vec::new();
    let err = write_gif_with_progress(
        &indexed_seq(&[100, 100, 100]),
        &out,
        &opts(0, false),
        &mut |n| {
            seen.push(n);
            if n == 2 {
                Err(FadeGifError::Cancelled)
            } else {
                Ok(())
            }
        },
    )
    .unwrap_err();
    assert!(matches!(err, FadeGifError::Cancelled));
    assert_eq!(seen, vec![1, 2]);
    assert!(!out.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn straight_rgba_frames_are_rejected() {
    let canvas = Canvas::new(1, 1).unwrap();
    let mut seq = FrameSequence::new(canvas);
    seq.push(Frame {
        pixels: FramePixels::Rgba(vec![0, 0, 0, 0]),
        duration_ms: 10,
        role: FrameRole::Keyframe,
    })
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let err = write_gif(&seq, &dir.path().join("a.gif"), &opts(0, false)).unwrap_err();
    assert!(matches!(err, FadeGifError::Encode(_)));
}
