use crate::json::{BakeDocument, delta_field_to_json_string};
use crate::{DEFAULT_SMOOTH_WINDOW, DeltaField, Error, FrameRange, SampleProvider};
use glam::Vec3;
use serde_json::{Value, json};

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-5,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

/// One bone along +Y sliding along +X, with three vertices beside it.
fn sliding_bone_sample(frame: i32) -> Value {
    let x = frame as f32;
    json!({
        "vertices": [[x + 0.5, 0.5, 0.0], [x - 0.5, 0.5, 0.0], [x + 0.25, 0.0, 0.0]],
        "bones": { "root": { "head": [x, 0.0, 0.0], "tail": [x, 1.0, 0.0] } }
    })
}

fn sliding_bone_document(start: i32, end: i32) -> Value {
    let weight = json!([{ "bone": "root", "weight": 1.0 }]);
    json!({
        "frames": { "start": start, "end": end },
        "settings": { "smoothWindow": 0 },
        "bones": [{ "name": "root" }],
        "weights": [weight, weight, weight],
        "samples": (start..=end).map(sliding_bone_sample).collect::<Vec<_>>()
    })
}

fn arm_document(prune: &[&str]) -> Value {
    let sample = |frame: i32| {
        let x = frame as f32;
        json!({
            "vertices": [[x + 0.5, 0.5, 0.0], [x + 1.0, 1.5, 0.0], [x + 0.25, 2.5, 0.0]],
            "bones": {
                "upper": { "head": [x, 0.0, 0.0], "tail": [x, 1.0, 0.0] },
                "lower": { "head": [x, 1.0, 0.0], "tail": [x, 2.0, 0.0] },
                "hand": { "head": [x, 2.0, 0.0], "tail": [x, 3.0, 0.0] }
            }
        })
    };
    json!({
        "frames": { "start": 0, "end": 1 },
        "settings": { "smoothWindow": 0 },
        "bones": [
            { "name": "upper" },
            { "name": "lower", "parent": "upper" },
            { "name": "hand", "parent": "lower" }
        ],
        "prune": prune,
        "weights": [
            [{ "bone": "upper", "weight": 1.0 }],
            [{ "bone": "lower", "weight": 1.0 }],
            [{ "bone": "hand", "weight": 1.0 }]
        ],
        "samples": [sample(0), sample(1)]
    })
}

fn parse(value: &Value) -> Result<BakeDocument, Error> {
    BakeDocument::from_json_str(&value.to_string())
}

#[test]
fn skinned_document_bakes_ribbon_deltas() {
    let document = parse(&sliding_bone_document(4, 6)).unwrap();
    assert_eq!(document.range, FrameRange::new(4, 6));
    assert_eq!(document.settings.smooth_window, 0);
    assert!(!document.settings.full_body);

    let rig = document.rig.as_ref().unwrap();
    assert_eq!(rig.hierarchy.len(), 1);
    assert_eq!(rig.skin.vertex_count(), 3);

    let field = document.bake().unwrap();
    assert_eq!(field.range(), FrameRange::new(4, 6));
    for (_, deltas) in field.iter() {
        assert_approx(deltas[0], 1.0);
        assert_approx(deltas[1], -1.0);
        assert_approx(deltas[2], 0.5);
    }
}

#[test]
fn document_is_a_sample_provider() {
    let document = parse(&sliding_bone_document(0, 2)).unwrap();
    assert_eq!(document.vertex_positions(1)[0], Vec3::new(1.5, 0.5, 0.0));
    assert_eq!(document.bone_poses(2)[0].tail, Vec3::new(2.0, 1.0, 0.0));
    assert!(document.camera_view(1).is_none());
    assert!(document.vertex_positions(3).is_empty());
}

#[test]
fn settings_default_when_omitted() {
    let mut value = sliding_bone_document(0, 1);
    value.as_object_mut().unwrap().remove("settings");
    let document = parse(&value).unwrap();
    assert_eq!(document.settings.smooth_window, DEFAULT_SMOOTH_WINDOW);
    assert!(!document.settings.camera_pov);
}

#[test]
fn range_falls_back_to_keyframes_then_sample_count() {
    let mut value = sliding_bone_document(3, 5);
    let object = value.as_object_mut().unwrap();
    object.remove("frames");
    object.insert("keyframes".to_string(), json!([[5, 3], [4]]));
    assert_eq!(parse(&value).unwrap().range, FrameRange::new(3, 5));

    value.as_object_mut().unwrap().remove("keyframes");
    assert_eq!(parse(&value).unwrap().range, FrameRange::new(0, 2));
}

#[test]
fn sample_count_must_cover_the_range() {
    let mut value = sliding_bone_document(0, 2);
    value["frames"]["end"] = json!(5);
    let err = parse(&value).unwrap_err();
    assert_eq!(
        err.to_string(),
        "expected 6 sampled frames for range 0..=5, got 3"
    );
}

#[test]
fn document_without_bones_bakes_rigid() {
    let value = json!({
        "settings": { "smoothWindow": 0 },
        "samples": [
            { "vertices": [[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]] },
            { "vertices": [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]] }
        ]
    });
    let document = parse(&value).unwrap();
    assert!(document.rig.is_none());
    assert_eq!(document.range, FrameRange::new(0, 1));

    // Centroid at 2/3: offsets -5/3, 1/3, 4/3 divided by 4/3.
    let field = document.bake().unwrap();
    let deltas = field.get(0).unwrap();
    assert_approx(deltas[0], -1.25);
    assert_approx(deltas[1], 0.25);
    assert_approx(deltas[2], 1.0);
}

#[test]
fn pruning_expands_to_descendants() {
    let document = parse(&arm_document(&["upper"])).unwrap();
    assert_eq!(document.discarded, vec![1, 2]);

    let field = document.bake().unwrap();
    for (_, deltas) in field.iter() {
        assert_approx(deltas[0], 0.5);
        assert_approx(deltas[1], 1.0);
        assert_approx(deltas[2], 0.25);
    }

    let document = parse(&arm_document(&["hand"])).unwrap();
    assert!(document.discarded.is_empty());
}

#[test]
fn unknown_names_are_rejected() {
    let mut value = arm_document(&[]);
    value["bones"][1]["parent"] = json!("spine");
    let err = parse(&value).unwrap_err();
    match &err {
        Error::JsonUnknownBoneParent { bone, parent } => {
            assert_eq!(bone, "lower");
            assert_eq!(parent, "spine");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = parse(&arm_document(&["tail"])).unwrap_err();
    assert!(
        matches!(&err, Error::JsonUnknownBone { bone, .. } if bone == "tail"),
        "{err:?}"
    );
}

#[test]
fn every_bone_needs_a_pose_in_every_sample() {
    let mut value = arm_document(&[]);
    value["samples"][1]["bones"]
        .as_object_mut()
        .unwrap()
        .remove("hand");
    let err = parse(&value).unwrap_err();
    assert!(
        matches!(&err, Error::JsonMissingBonePose { sample: 1, bone } if bone == "hand"),
        "{err:?}"
    );
}

#[test]
fn weights_for_unknown_bones_are_skipped() {
    let mut value = sliding_bone_document(0, 1);
    value["weights"][2] = json!([{ "bone": "ghost", "weight": 1.0 }]);
    let document = parse(&value).unwrap();
    let skin = &document.rig.as_ref().unwrap().skin;
    assert!(skin.vertex(2).is_empty());

    let field = document.bake().unwrap();
    assert_eq!(field.get(0).unwrap()[2], 0.0);
}

#[test]
fn missing_weights_leave_every_vertex_unweighted() {
    let mut value = sliding_bone_document(0, 1);
    value.as_object_mut().unwrap().remove("weights");
    let document = parse(&value).unwrap();
    assert_eq!(document.rig.as_ref().unwrap().skin.vertex_count(), 3);

    let field = document.bake().unwrap();
    for (_, deltas) in field.iter() {
        assert_eq!(deltas, &[0.0, 0.0, 0.0]);
    }
}

#[test]
fn malformed_input_is_a_parse_error() {
    let err = BakeDocument::from_json_str("{\"samples\": 3}").unwrap_err();
    assert!(matches!(err, Error::JsonParse { .. }), "{err:?}");
}

#[test]
fn delta_field_serializes_named_attributes() {
    let frames = vec![vec![0.5, -1.0], vec![0.0, 0.25]];
    let field = DeltaField::new(FrameRange::new(9, 10), frames).unwrap();
    let text = delta_field_to_json_string(&field).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["firstFrame"], json!(9));
    assert_eq!(value["lastFrame"], json!(10));
    assert_eq!(value["attributes"]["delta_9"], json!([0.5, -1.0]));
    assert_eq!(value["attributes"]["delta_10"], json!([0.0, 0.25]));
    assert_eq!(value["attributes"].as_object().unwrap().len(), 2);
}
