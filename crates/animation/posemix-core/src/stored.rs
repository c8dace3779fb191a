use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::data::{AnimationData, NodeTransform, RawKeyframe};
use crate::error::{AnimationError, Result};
use crate::frame::BlendMode;

/// Public API: parse authored animation JSON into the canonical
/// [`AnimationData`] (data.rs).
///
/// Notes:
/// - `length` is the timeline length in frames; `loop` marks cyclic animations.
/// - Per node, `offset` and `rotation` (degrees) accept either `[x, y, z]` or
///   an object with any subset of `x`, `y`, `z`.
/// - `shortest` lists the rotation axes that interpolate along the shorter arc.
/// - Blend modes are `"add"`, `"average"` or `"addAverage"`.
pub fn parse_animation_json(s: &str) -> Result<AnimationData> {
    let stored: StoredAnimation = serde_json::from_str(s)?;
    let invalid = |reason: String| AnimationError::InvalidData {
        name: stored.name.clone(),
        reason,
    };

    let mut keyframes: Vec<RawKeyframe> = Vec::with_capacity(stored.keyframes.len());
    for sk in &stored.keyframes {
        let mut elements: IndexMap<String, NodeTransform> = IndexMap::with_capacity(sk.nodes.len());
        for (node, sn) in &sk.nodes {
            let [offset_x, offset_y, offset_z] = sn
                .offset
                .as_ref()
                .map(|v| v.components())
                .transpose()
                .map_err(|e| invalid(format!("node '{node}' offset: {e}")))?
                .unwrap_or_default();
            let [rotation_x, rotation_y, rotation_z] = sn
                .rotation
                .as_ref()
                .map(|v| v.components())
                .transpose()
                .map_err(|e| invalid(format!("node '{node}' rotation: {e}")))?
                .unwrap_or_default();
            elements.insert(
                node.clone(),
                NodeTransform {
                    offset_x,
                    offset_y,
                    offset_z,
                    rotation_x,
                    rotation_y,
                    rotation_z,
                    rot_shortest_distance_x: sn.shortest.contains(&Axis::X),
                    rot_shortest_distance_y: sn.shortest.contains(&Axis::Y),
                    rot_shortest_distance_z: sn.shortest.contains(&Axis::Z),
                },
            );
        }
        keyframes.push(RawKeyframe {
            frame: sk.frame,
            elements,
        });
    }

    let mut element_blend_modes: HashMap<String, BlendMode> = HashMap::new();
    for (node, mode) in &stored.blend_modes {
        let mode = match mode.as_str() {
            "add" => BlendMode::Add,
            "average" => BlendMode::Average,
            "addAverage" => BlendMode::AddAverage,
            other => return Err(invalid(format!("unknown blend mode '{other}' for '{node}'"))),
        };
        element_blend_modes.insert(node.clone(), mode);
    }

    let data = AnimationData {
        code: stored.name.clone(),
        total_frames: stored.length,
        cyclic: stored.r#loop,
        keyframes,
        element_weights: stored.weights.clone(),
        element_blend_modes,
    };
    data.validate_basic()?;
    Ok(data)
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
struct StoredAnimation {
    pub name: String,
    pub length: f32,
    #[serde(default)]
    pub r#loop: bool,
    pub keyframes: Vec<StoredKeyframe>,
    #[serde(default)]
    pub weights: HashMap<String, f32>,
    #[serde(default, rename = "blendModes")]
    pub blend_modes: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct StoredKeyframe {
    pub frame: u32,
    #[serde(default)]
    pub nodes: IndexMap<String, StoredNode>,
}

#[derive(Debug, Deserialize)]
struct StoredNode {
    #[serde(default)]
    pub offset: Option<RawVector>,
    #[serde(default)]
    pub rotation: Option<RawVector>,
    #[serde(default)]
    pub shortest: Vec<Axis>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawVector {
    Array(Vec<f32>),
    Partial {
        #[serde(default)]
        x: Option<f32>,
        #[serde(default)]
        y: Option<f32>,
        #[serde(default)]
        z: Option<f32>,
    },
}

impl RawVector {
    fn components(&self) -> std::result::Result<[Option<f32>; 3], String> {
        match self {
            RawVector::Array(v) if v.len() == 3 => Ok([Some(v[0]), Some(v[1]), Some(v[2])]),
            RawVector::Array(v) => Err(format!("expected 3 components, got {}", v.len())),
            RawVector::Partial { x, y, z } => Ok([*x, *y, *z]),
        }
    }
}
