//! Posemix Core (engine-agnostic)
//!
//! Procedural skeletal animation compositing: keyframed animations are played
//! per category by animators, composited per target into one pose delta each
//! tick, and written into the host's live poses through an applier. Runs can be
//! replicated between peers with the packets in [`sync`].

pub mod animation;
pub mod animator;
pub mod applier;
pub mod composer;
pub mod config;
pub mod data;
pub mod element;
pub mod error;
pub mod frame;
pub mod ids;
pub mod interp;
pub mod manager;
pub mod pose;
pub mod registry;
pub mod request;
pub mod stored;
pub mod sync;
pub mod value;

// Re-exports for consumers (host adapters)
pub use animation::Animation;
pub use animator::{Animator, AnimatorStatus};
pub use applier::{Applier, PoseApplier};
pub use composer::{AnimatorSnapshot, CompletionHandler, Composer};
pub use config::Config;
pub use data::{AnimationData, NodeTransform, RawKeyframe};
pub use element::{AnimationElement, ElementChannel, ElementId};
pub use error::{AnimationError, Result};
pub use frame::{AnimationFrame, BlendMode};
pub use ids::{name_hash, AnimationId, AnimationTarget, Category, RunId};
pub use interp::ProgressModifier;
pub use manager::{AnimationManager, EntityLiveness};
pub use pose::{ElementPose, PoseSink};
pub use registry::{AnimationRegistry, AnimationSource};
pub use request::{AnimationAction, AnimationRequest, RunParameters};
pub use stored::parse_animation_json;
pub use sync::{AnimationRunPacket, AnimationStopPacket, PacketOutbox, Synchronizer};
pub use value::WeightedValue;
