use posemix_core::{
    AnimationAction, AnimationId, AnimationRequest, AnimationRunPacket, AnimationStopPacket,
    AnimationTarget, BlendMode, Category, ProgressModifier, RunId, RunParameters,
};
use serde_json::json;

fn sample_packet() -> AnimationRunPacket {
    let arms = Category::new("arms", BlendMode::AddAverage, Some(0.75));
    let legs = Category::new("legs", BlendMode::Add, None);
    AnimationRunPacket {
        run_id: RunId::new(),
        target: AnimationTarget::Entity(-12),
        requests: vec![
            AnimationRequest::new(
                AnimationId::new(arms, "wave"),
                RunParameters::ease_in(0.3, 4.0).with_modifier(ProgressModifier::SinQuadratic),
            ),
            AnimationRequest::new(
                AnimationId::new(arms, "wave"),
                RunParameters::play(1.25, Some(25.0), Some(5.0)).with_modifier(ProgressModifier::Bounce),
            ),
            AnimationRequest::new(AnimationId::new(legs, "walk"), RunParameters::stop()),
            AnimationRequest::new(AnimationId::new(arms, "wave"), RunParameters::ease_out(0.5)),
        ],
    }
}

#[test]
fn run_packet_survives_json_and_bincode() {
    let packet = sample_packet();

    let from_json = AnimationRunPacket::from_json(&packet.to_json().unwrap()).unwrap();
    assert_eq!(from_json, packet);

    let bytes = packet.to_bytes().unwrap();
    let from_bytes = AnimationRunPacket::from_bytes(&bytes).unwrap();
    assert_eq!(from_bytes, packet);
    // category defaults travel with the request
    assert_eq!(from_bytes.requests[0].animation.category.blend_mode, BlendMode::AddAverage);
    assert_eq!(from_bytes.requests[0].animation.category.weight, Some(0.75));
}

#[test]
fn held_item_targets_and_stop_packets_round_trip() {
    for target in [
        AnimationTarget::HeldItemFirstPerson,
        AnimationTarget::HeldItemThirdPerson,
    ] {
        let packet = AnimationRunPacket {
            target,
            requests: vec![],
            ..sample_packet()
        };
        assert_eq!(AnimationRunPacket::from_bytes(&packet.to_bytes().unwrap()).unwrap(), packet);
    }

    let stop = AnimationStopPacket { run_id: RunId::new() };
    assert_eq!(AnimationStopPacket::from_bytes(&stop.to_bytes().unwrap()).unwrap(), stop);
    assert_eq!(AnimationStopPacket::from_json(&stop.to_json().unwrap()).unwrap(), stop);
}

#[test]
fn request_json_shape_is_stable() {
    let packet = sample_packet();
    let value: serde_json::Value = serde_json::from_str(&packet.to_json().unwrap()).unwrap();
    assert_eq!(value["target"], json!({ "Entity": -12 }));
    assert_eq!(value["requests"][1]["parameters"]["action"], json!("Play"));
    assert_eq!(value["requests"][1]["parameters"]["modifier"], json!("Bounce"));
    assert_eq!(value["requests"][1]["parameters"]["start_frame"], json!(25.0));
    assert_eq!(value["requests"][2]["parameters"]["target_frame"], json!(null));

    // optional fields may be omitted by peers
    let parsed: RunParameters = serde_json::from_value(json!({ "action": "Clear" })).unwrap();
    assert_eq!(parsed.action, AnimationAction::Clear);
    assert_eq!(parsed.modifier, ProgressModifier::Linear);
    assert_eq!(parsed.duration, 0.0);
}

#[test]
fn truncated_bytes_are_rejected() {
    let bytes = sample_packet().to_bytes().unwrap();
    let err = AnimationRunPacket::from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
    assert_eq!(err.category(), "serialization");
}
