use posemix_core::{
    name_hash, parse_animation_json, AnimationData, AnimationId, AnimationManager,
    AnimationRequest, AnimationTarget, Applier, BlendMode, Category, ElementChannel, ElementPose,
    RunParameters,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

const NOD_JSON: &str = r#"{
    "name": "nod",
    "length": 20,
    "loop": true,
    "weights": { "head": 0.5 },
    "blendModes": { "chest": "add" },
    "keyframes": [
        {
            "frame": 10,
            "nodes": {
                "head": { "rotation": { "x": 30 }, "shortest": ["x"] },
                "chest": { "offset": [0, 0.1, 0] }
            }
        },
        {
            "frame": 0,
            "nodes": {
                "head": { "rotation": [0, 0, 0] },
                "chest": { "offset": [0, 0, 0] }
            }
        }
    ]
}"#;

#[test]
fn parses_authored_json() {
    let data: AnimationData = parse_animation_json(NOD_JSON).expect("parse nod");
    assert_eq!(data.code, "nod");
    assert_eq!(data.total_frames, 20.0);
    assert!(data.cyclic);
    assert_eq!(data.keyframes.len(), 2);
    assert_eq!(data.element_weights.get("head"), Some(&0.5));
    assert_eq!(data.element_blend_modes.get("chest"), Some(&BlendMode::Add));

    let head = &data.keyframes[0].elements["head"];
    assert_eq!(head.channel(ElementChannel::RotateX), Some(30.0));
    assert_eq!(head.channel(ElementChannel::RotateY), None);
    assert!(head.shortest_distance(ElementChannel::RotateX));

    let chest = &data.keyframes[1].elements["chest"];
    assert_eq!(chest.channel(ElementChannel::TranslateY), Some(0.0));
}

#[test]
fn canonical_json_round_trips() {
    let data = parse_animation_json(NOD_JSON).unwrap();
    let json = serde_json::to_string(&data).unwrap();
    let back: AnimationData = serde_json::from_str(&json).unwrap();
    assert_eq!(back, data);
}

#[test]
fn loaded_animation_plays_through_manager() {
    let data = parse_animation_json(NOD_JSON).unwrap();
    let id = AnimationId::new(Category::new("head", BlendMode::Average, None), "nod");
    let mut manager = AnimationManager::new();
    assert!(manager.register(id, &data));

    let target = AnimationTarget::Entity(11);
    manager
        .run(
            target,
            false,
            &[AnimationRequest::new(id, RunParameters::play(1.0, Some(0.0), Some(10.0)))],
        )
        .unwrap();
    manager.tick(0.5);

    let mut pose = ElementPose::default();
    assert!(manager
        .applier_mut()
        .apply_animation(target, name_hash("head"), &mut pose, 0.5));
    // 15 degrees at weight 0.5 averaged with the host pose (0 at weight 0.5)
    approx(pose.rotation[0], 7.5, 1e-4);

    let mut chest = ElementPose::default();
    assert!(manager
        .applier_mut()
        .apply_animation(target, name_hash("chest"), &mut chest, 1.0));
    approx(chest.translation[1], 0.05, 1e-6);
}

#[test]
fn invalid_documents_are_errors() {
    assert_eq!(parse_animation_json("{").unwrap_err().category(), "serialization");

    let past_end = r#"{ "name": "x", "length": 5, "keyframes": [ { "frame": 9 } ] }"#;
    assert_eq!(parse_animation_json(past_end).unwrap_err().category(), "data");
}
