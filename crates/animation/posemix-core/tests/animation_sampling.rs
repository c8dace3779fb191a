use posemix_core::{
    Animation, AnimationData, AnimationId, Animator, BlendMode, Category, ElementChannel,
    ElementId, RawKeyframe, RunParameters, WeightedValue,
};
use std::sync::Arc;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn average_category() -> Category {
    Category::new("main", BlendMode::Average, Some(1.0))
}

fn rot(frame: &posemix_core::AnimationFrame, node: &str, channel: ElementChannel) -> f32 {
    frame
        .value(&ElementId::from_name(node, channel))
        .expect("channel present")
        .value
}

fn three_keyframe_cycle() -> Animation {
    let data = AnimationData::new(
        "cycle",
        30.0,
        true,
        vec![
            RawKeyframe::new(0)
                .with("arm", ElementChannel::RotateX, 10.0)
                .with("arm", ElementChannel::TranslateY, 0.0),
            RawKeyframe::new(10)
                .with("arm", ElementChannel::RotateX, 40.0)
                .with("arm", ElementChannel::TranslateY, 1.0),
            RawKeyframe::new(20)
                .with("arm", ElementChannel::RotateX, 70.0)
                .with("arm", ElementChannel::TranslateY, 2.0),
        ],
    );
    Animation::new(AnimationId::new(average_category(), "cycle"), &data).unwrap()
}

#[test]
fn cyclic_wraparound_lands_on_first_keyframe() {
    let anim = three_keyframe_cycle();
    // half way through 25 -> 5 on a 30 frame loop is frame 0
    let frame = anim.play(0.5, Some(25.0), Some(5.0));
    assert_eq!(&frame, &anim.keyframes()[0]);
    approx(rot(&frame, "arm", ElementChannel::RotateX), 10.0, 1e-6);

    // the same through an animator with a real duration
    let mut animator = Animator::new();
    animator
        .run(RunParameters::play(2.0, Some(25.0), Some(5.0)), Arc::new(anim.clone()))
        .unwrap();
    assert_eq!(animator.calculate(1.0), &anim.keyframes()[0]);
}

#[test]
fn wrapped_segment_interpolates_across_loop_point() {
    let anim = three_keyframe_cycle();
    assert_eq!(anim.frame_positions(), &[0, 10, 20, 29]);
    // 29 was filled from 20 (70) towards 0 (10) across the loop: 9/10 of the way,
    // on the shorter arc for rotation and linearly for translation
    let last = &anim.keyframes()[3];
    approx(rot(last, "arm", ElementChannel::RotateX), 16.0, 1e-4);
    approx(rot(last, "arm", ElementChannel::TranslateY), 0.2, 1e-4);

    // sampling between 29 and the loop point goes back towards frame 0
    let frame = anim.sample(29.5);
    approx(rot(&frame, "arm", ElementChannel::RotateX), 13.0, 1e-4);
}

#[test]
fn shortest_arc_channels_cross_zero() {
    let data = AnimationData {
        keyframes: vec![
            RawKeyframe::new(0).with("head", ElementChannel::RotateY, 350.0),
            RawKeyframe::new(10).with("head", ElementChannel::RotateY, 10.0),
        ],
        ..AnimationData::new("turn", 11.0, false, vec![])
    };
    let mut data = data;
    for keyframe in &mut data.keyframes {
        keyframe
            .elements
            .get_mut("head")
            .unwrap()
            .rot_shortest_distance_y = true;
    }
    let anim = Animation::new(AnimationId::new(average_category(), "turn"), &data).unwrap();
    let frame = anim.play(0.5, None, None);
    approx(rot(&frame, "head", ElementChannel::RotateY), 0.0, 1e-4);
    let frame = anim.play(0.25, None, None);
    approx(rot(&frame, "head", ElementChannel::RotateY), 355.0, 1e-4);

    // without the flag the long way round is taken
    data.keyframes
        .iter_mut()
        .for_each(|k| k.elements.get_mut("head").unwrap().rot_shortest_distance_y = false);
    let anim = Animation::new(AnimationId::new(average_category(), "turn"), &data).unwrap();
    approx(rot(&anim.play(0.5, None, None), "head", ElementChannel::RotateY), 180.0, 1e-4);
}

#[test]
fn hole_filling_is_deterministic_and_complete() {
    let mut data = AnimationData::new(
        "sparse",
        40.0,
        true,
        vec![
            RawKeyframe::new(5)
                .with("a", ElementChannel::RotateZ, 300.0)
                .with("b", ElementChannel::TranslateX, -1.0),
            RawKeyframe::new(17).with("c", ElementChannel::RotateX, 12.0),
            RawKeyframe::new(31)
                .with("a", ElementChannel::RotateZ, 20.0)
                .with("c", ElementChannel::RotateX, 90.0),
        ],
    );
    data.element_weights.insert("b".into(), 0.25);
    let id = AnimationId::new(average_category(), "sparse");

    let one = Animation::new(id, &data).unwrap();
    let two = Animation::new(id, &data).unwrap();
    assert_eq!(one.frame_positions(), &[0, 5, 17, 31, 39]);
    for (a, b) in one.keyframes().iter().zip(two.keyframes()) {
        assert_eq!(a.len(), 3);
        let bits = |f: &posemix_core::AnimationFrame| -> Vec<_> {
            f.iter()
                .map(|(e, m)| {
                    let v = e.value.unwrap_or(WeightedValue::new(f32::NAN, f32::NAN));
                    (e.id, v.value.to_bits(), v.weight.to_bits(), m)
                })
                .collect()
        };
        assert_eq!(bits(a), bits(b));
    }

    // per-node weight override survives hole filling
    let b = ElementId::from_name("b", ElementChannel::TranslateX);
    for keyframe in one.keyframes() {
        approx(keyframe.value(&b).unwrap().weight, 0.25, 1e-6);
    }
}
