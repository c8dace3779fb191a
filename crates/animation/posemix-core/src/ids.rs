//! Identifiers for runs, categories, animations and skeletal node names.
//!
//! Names are hashed with 32-bit FNV-1a so that every peer derives the same ids
//! from the same strings without sharing a table.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::frame::BlendMode;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Stable 32-bit hash of a node, category or animation name.
pub const fn name_hash(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Identifier of one `run` call. Generated locally or received from a peer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Named slot that animations compete in. At most one animator runs per
/// category on a given target.
///
/// Equality and hashing only look at the name hash; blend mode and weight are
/// the defaults applied to frames of animations registered under it.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub hash: u32,
    pub blend_mode: BlendMode,
    pub weight: Option<f32>,
}

impl Category {
    pub fn new(name: &str, blend_mode: BlendMode, weight: Option<f32>) -> Self {
        Self {
            hash: name_hash(name),
            blend_mode,
            weight,
        }
    }

    /// Weight used for elements that carry no explicit override.
    #[inline]
    pub fn default_weight(&self) -> f32 {
        self.weight.unwrap_or(1.0)
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

/// Animation identity: the category it plays in plus the hashed animation code.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AnimationId {
    pub category: Category,
    pub animation: u32,
}

impl AnimationId {
    pub fn new(category: Category, animation: &str) -> Self {
        Self {
            category,
            animation: name_hash(animation),
        }
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}/{:08x}", self.category.hash, self.animation)
    }
}

/// What an animation is applied to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AnimationTarget {
    Entity(i64),
    HeldItemFirstPerson,
    HeldItemThirdPerson,
}

impl AnimationTarget {
    /// Held-item views only exist on the local client and are never synchronized.
    #[inline]
    pub fn is_local_view(&self) -> bool {
        !matches!(self, AnimationTarget::Entity(_))
    }

    #[inline]
    pub fn entity_id(&self) -> Option<i64> {
        match self {
            AnimationTarget::Entity(id) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_hash_is_fnv1a() {
        assert_eq!(name_hash(""), 0x811c_9dc5);
        assert_eq!(name_hash("a"), 0xe40c_292c);
        assert_ne!(name_hash("hand"), name_hash("head"));
    }

    #[test]
    fn category_identity_ignores_defaults() {
        let a = Category::new("arms", BlendMode::Add, None);
        let b = Category::new("arms", BlendMode::Average, Some(0.5));
        assert_eq!(a, b);
        assert_ne!(a, Category::new("legs", BlendMode::Add, None));
    }

    #[test]
    fn held_item_views_are_local() {
        assert!(AnimationTarget::HeldItemFirstPerson.is_local_view());
        assert!(AnimationTarget::HeldItemThirdPerson.is_local_view());
        assert!(!AnimationTarget::Entity(7).is_local_view());
        assert_eq!(AnimationTarget::Entity(7).entity_id(), Some(7));
    }
}
