use super::*;

#[test]
fn default_config_is_valid() {
    let cfg = PipelineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.fade_steps, 15);
    assert_eq!(cfg.background, [255, 255, 255]);
    assert!(!cfg.optimize_output());
}

#[test]
fn validation_rejects_out_of_range_values() {
    let bad = [
        PipelineConfig {
            fade_steps: 0,
            ..Default::default()
        },
        PipelineConfig {
            hold_duration_ms: 0,
            ..Default::default()
        },
        PipelineConfig {
            fade_duration_ms: 0,
            ..Default::default()
        },
        PipelineConfig {
            quality: 101,
            ..Default::default()
        },
        PipelineConfig {
            sharpen_strength: -1.0,
            ..Default::default()
        },
        PipelineConfig {
            sharpen_strength: f32::NAN,
            ..Default::default()
        },
        PipelineConfig {
            threads: Some(0),
            ..Default::default()
        },
        PipelineConfig {
            target_canvas: TargetCanvas::Fixed {
                width: 0,
                height: 10,
            },
            ..Default::default()
        },
        PipelineConfig {
            target_canvas: TargetCanvas::Fixed {
                width: 70_000,
                height: 4,
            },
            ..Default::default()
        },
    ];
    for cfg in bad {
        assert!(matches!(
            cfg.validate(),
            Err(FadeGifError::Validation(_))
        ));
    }
}

#[test]
fn empty_crop_is_an_invalid_crop() {
    let cfg = PipelineConfig {
        crop: Some(CropRect::from_edges(10, 10, 10, 20)),
        ..Default::default()
    };
    assert!(matches!(cfg.validate(), Err(FadeGifError::InvalidCrop(_))));
}

#[test]
fn expected_frame_count_matches_formula() {
    let cfg = PipelineConfig {
        fade_steps: 3,
        ..Default::default()
    };
    assert_eq!(cfg.expected_frame_count(0), 0);
    assert_eq!(cfg.expected_frame_count(1), 1);
    assert_eq!(cfg.expected_frame_count(2), 5);
    assert_eq!(cfg.expected_frame_count(4), 13);
}

#[test]
fn json_uses_defaults_for_missing_fields() {
    let cfg: PipelineConfig = serde_json::from_value(serde_json::json!({
        "fade_steps": 4,
        "target_canvas": { "mode": "fit_to_largest" },
        "dither": "ordered",
        "quantize": "fast_octree",
        "crop": { "left": 0, "top": 0, "right": 10, "bottom": 10 }
    }))
    .unwrap();
    assert_eq!(cfg.fade_steps, 4);
    assert_eq!(cfg.target_canvas, TargetCanvas::FitToLargest);
    assert_eq!(cfg.dither, DitherMethod::Ordered);
    assert_eq!(cfg.quantize, QuantizeMethod::FastOctree);
    assert_eq!(cfg.hold_duration_ms, 500);
    assert_eq!(cfg.crop, Some(CropRect::from_edges(0, 0, 10, 10)));
}

#[test]
fn json_rejects_unknown_fields() {
    let res: Result<PipelineConfig, _> =
        serde_json::from_value(serde_json::json!({ "fade_stepz": 4 }));
    assert!(res.is_err());
}

#[test]
fn low_quality_enables_optimization() {
    let cfg = PipelineConfig {
        quality: 89,
        ..Default::default()
    };
    assert!(cfg.optimize_output());
}
