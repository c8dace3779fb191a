//! Animation definitions and the caches of built animations.
//!
//! Shared definitions are built once at registration. Deferred definitions are
//! built per target on first use, from data the host supplies through
//! [`AnimationSource`] (e.g. animations that depend on the entity's model).

use std::sync::Arc;

use hashbrown::HashMap;
use log::{debug, warn};

use crate::animation::Animation;
use crate::data::AnimationData;
use crate::error::{AnimationError, Result};
use crate::ids::{AnimationId, AnimationTarget};

/// Host-supplied raw data for deferred definitions.
pub trait AnimationSource {
    fn animation_data(&mut self, id: AnimationId, target: AnimationTarget) -> Option<AnimationData>;
}

#[derive(Clone, Debug)]
enum Definition {
    Shared(Arc<Animation>),
    Deferred,
}

#[derive(Clone, Debug, Default)]
pub struct AnimationRegistry {
    definitions: HashMap<AnimationId, Definition>,
    per_target: HashMap<(AnimationId, AnimationTarget), Arc<Animation>>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register a shared animation. False if `id` is taken or the
    /// data is invalid.
    pub fn register(&mut self, id: AnimationId, data: &AnimationData) -> bool {
        if self.definitions.contains_key(&id) {
            warn!("{}", AnimationError::DuplicateAnimation { id });
            return false;
        }
        match Animation::new(id, data) {
            Ok(animation) => {
                self.definitions
                    .insert(id, Definition::Shared(Arc::new(animation)));
                debug!("registered animation {id}");
                true
            }
            Err(err) => {
                warn!("rejecting animation {id}: {err}");
                false
            }
        }
    }

    /// Register an animation whose data is fetched per target when first used.
    pub fn register_deferred(&mut self, id: AnimationId) -> bool {
        if self.definitions.contains_key(&id) {
            warn!("{}", AnimationError::DuplicateAnimation { id });
            return false;
        }
        self.definitions.insert(id, Definition::Deferred);
        debug!("registered deferred animation {id}");
        true
    }

    pub fn contains(&self, id: &AnimationId) -> bool {
        self.definitions.contains_key(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve `id` for `target`, building and caching deferred animations.
    pub fn resolve(
        &mut self,
        id: AnimationId,
        target: AnimationTarget,
        source: Option<&mut dyn AnimationSource>,
    ) -> Result<Arc<Animation>> {
        match self.definitions.get(&id) {
            None => Err(AnimationError::AnimationNotFound { id }),
            Some(Definition::Shared(animation)) => Ok(Arc::clone(animation)),
            Some(Definition::Deferred) => {
                if let Some(animation) = self.per_target.get(&(id, target)) {
                    return Ok(Arc::clone(animation));
                }
                let data = source
                    .and_then(|source| source.animation_data(id, target))
                    .ok_or(AnimationError::AnimationNotFound { id })?;
                let animation = Arc::new(Animation::new(id, &data)?);
                self.per_target.insert((id, target), Arc::clone(&animation));
                debug!("built deferred animation {id} for {target:?}");
                Ok(animation)
            }
        }
    }

    /// Drop cached per-target builds for a target that went away.
    pub fn forget_target(&mut self, target: AnimationTarget) {
        self.per_target.retain(|(_, t), _| *t != target);
    }

    /// Number of cached per-target builds.
    pub fn cached_len(&self) -> usize {
        self.per_target.len()
    }
}
