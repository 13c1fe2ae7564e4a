//! Property tests for the normalized → pixel transform and label parsing.

use std::path::Path;

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use yolo2gt::ir::io_yolo::parse_label_file;
use yolo2gt::ir::{AnnotationRecord, ClassMap, ImageDimensions, NormalizedDetection};

fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(128);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config
}

fn arb_detection() -> impl Strategy<Value = NormalizedDetection> {
    (0u32..80, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(
        |(class_id, center_x, center_y, width, height)| NormalizedDetection {
            class_id,
            center_x,
            center_y,
            width,
            height,
        },
    )
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn full_frame_box_matches_image(width in 1u32..10_000, height in 1u32..10_000) {
        let det = NormalizedDetection {
            class_id: 0,
            center_x: 0.5,
            center_y: 0.5,
            width: 1.0,
            height: 1.0,
        };
        let ann = det.to_absolute(ImageDimensions::new(width, height));
        prop_assert_eq!(ann.top, 0.0);
        prop_assert_eq!(ann.left, 0.0);
        prop_assert_eq!(ann.width, width as f64);
        prop_assert_eq!(ann.height, height as f64);
    }

    #[test]
    fn doubling_image_width_doubles_width_and_left(
        det in arb_detection(),
        width in 1u32..5_000,
        height in 1u32..5_000,
    ) {
        let base = det.to_absolute(ImageDimensions::new(width, height));
        let wide = det.to_absolute(ImageDimensions::new(width * 2, height));

        prop_assert!(close(wide.width, base.width * 2.0));
        prop_assert!(close(wide.left, base.left * 2.0));
        prop_assert_eq!(wide.top, base.top);
        prop_assert_eq!(wide.height, base.height);
        prop_assert_eq!(wide.class_id, det.class_id);
    }

    #[test]
    fn records_have_one_confidence_per_well_formed_line(
        dets in prop::collection::vec(arb_detection(), 0..20),
        junk in prop::collection::vec(0usize..20, 0..5),
    ) {
        let mut lines: Vec<String> = dets
            .iter()
            .map(|d| format!("{} {} {} {} {}", d.class_id, d.center_x, d.center_y, d.width, d.height))
            .collect();
        for pos in &junk {
            let at = (*pos).min(lines.len());
            lines.insert(at, "0 0.5 0.5 0.5".to_string());
        }

        let parsed = parse_label_file(&lines.join("\n"), Path::new("prop.txt"));
        prop_assert_eq!(parsed.detections.len(), dets.len());
        prop_assert_eq!(parsed.malformed.len(), junk.len());

        let dims = ImageDimensions::new(640, 480);
        let annotations = parsed
            .detections
            .iter()
            .map(|p| p.detection.to_absolute(dims))
            .collect();
        let record = AnnotationRecord::build("prop.jpg", dims, annotations, &ClassMap::from_names(["a"]));
        prop_assert_eq!(record.annotations().len(), dets.len());
        prop_assert_eq!(record.metadata.objects.len(), dets.len());
    }
}
