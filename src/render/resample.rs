use image::{RgbaImage, imageops};

use crate::{
    config::model::ResampleFilter,
    foundation::{
        error::{FadeGifError, FadeGifResult},
        math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place},
    },
};

/// Plan the intermediate sizes of a downscale from `src` to `dst`.
///
/// Halves both dimensions (never going below `dst`) while the remaining scale is under 0.5, then
/// ends with `dst` itself. The plan is empty when `src == dst`. Upscales are a single step.
pub fn plan_downscale(src: (u32, u32), dst: (u32, u32)) -> Vec<(u32, u32)> {
    if src == dst {
        return Vec::new();
    }
    let mut plan = Vec::new();
    let mut cur = src;
    while remaining_scale(cur, dst) < 0.5 {
        let next = ((cur.0 / 2).max(dst.0), (cur.1 / 2).max(dst.1));
        if next == cur || next == dst {
            break;
        }
        plan.push(next);
        cur = next;
    }
    plan.push(dst);
    plan
}

fn remaining_scale(cur: (u32, u32), dst: (u32, u32)) -> f64 {
    let sx = f64::from(dst.0) / f64::from(cur.0.max(1));
    let sy = f64::from(dst.1) / f64::from(cur.1.max(1));
    sx.min(sy)
}

/// Resize a straight RGBA8 image to `dst` following [`plan_downscale`].
///
/// Filtering runs on premultiplied pixels so transparent neighbors do not bleed dark fringes.
pub fn multi_stage_resize(
    img: &RgbaImage,
    dst: (u32, u32),
    filter: ResampleFilter,
) -> FadeGifResult<RgbaImage> {
    if dst.0 == 0 || dst.1 == 0 {
        return Err(FadeGifError::validation(format!(
            "resize target {}x{} must be non-zero",
            dst.0, dst.1
        )));
    }
    let plan = plan_downscale(img.dimensions(), dst);
    if plan.is_empty() {
        return Ok(img.clone());
    }

    let mut cur = img.clone();
    premultiply_rgba8_in_place(&mut cur);
    let kernel = filter.filter_type();
    for (w, h) in plan {
        cur = imageops::resize(&cur, w, h, kernel);
    }
    unpremultiply_rgba8_in_place(&mut cur);
    Ok(cur)
}
