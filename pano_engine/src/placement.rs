//! Placement acquisition as an explicit state machine. Only one placement
//! may be in flight across the whole editor; affordances read the current
//! phase instead of being toggled one by one.

use pano_core::angles::SphereAngles;
use pano_core::model::{HotspotId, HotspotKind, MAX_KEYFRAME_SLOTS};

use crate::error::EngineError;
use crate::registry::HotspotRegistry;

/// What a placement fills: a static hotspot's single slot or one keyframe
/// slot of a dynamic hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementTarget {
    Static(HotspotId),
    Keyframe(HotspotId, usize),
}

impl PlacementTarget {
    pub fn hotspot_id(&self) -> HotspotId {
        match self {
            PlacementTarget::Static(id) => *id,
            PlacementTarget::Keyframe(id, _) => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementPhase {
    #[default]
    Idle,
    Awaiting(PlacementTarget),
}

/// Governs pointer-driven acquisition of angular coordinates.
#[derive(Debug, Default)]
pub struct PlacementArbiter {
    phase: PlacementPhase,
}

impl PlacementArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PlacementPhase {
        self.phase
    }

    /// True while a placement is in flight. Every placement affordance is
    /// disabled globally until the pending target commits.
    pub fn locked(&self) -> bool {
        matches!(self.phase, PlacementPhase::Awaiting(_))
    }

    /// Whether the affordance for `target` is currently enabled.
    pub fn can_begin(&self, registry: &HotspotRegistry, target: PlacementTarget) -> bool {
        !self.locked() && self.validate(registry, target).is_ok()
    }

    /// Arm the state machine for `target`. A new request supersedes any
    /// in-flight target by construction.
    pub fn begin(
        &mut self,
        registry: &HotspotRegistry,
        target: PlacementTarget,
    ) -> Result<(), EngineError> {
        self.validate(registry, target)?;
        self.phase = PlacementPhase::Awaiting(target);
        Ok(())
    }

    /// Commit the pending placement with the angle pair captured from the
    /// pointer ray and the transport's current time. A commit with no
    /// target awaited is a stray click and is silently ignored.
    pub fn commit(
        &mut self,
        registry: &mut HotspotRegistry,
        angles: SphereAngles,
        time: f64,
    ) -> Result<Option<PlacementTarget>, EngineError> {
        let target = match self.phase {
            PlacementPhase::Awaiting(target) => target,
            PlacementPhase::Idle => return Ok(None),
        };
        registry.commit_placement(target, angles, time)?;
        self.phase = PlacementPhase::Idle;
        Ok(Some(target))
    }

    fn validate(
        &self,
        registry: &HotspotRegistry,
        target: PlacementTarget,
    ) -> Result<(), EngineError> {
        let id = target.hotspot_id();
        let hotspot = registry.get(id).ok_or(EngineError::NotFound(id))?;
        match target {
            PlacementTarget::Static(_) => {
                if hotspot.hotspot_type != HotspotKind::Static {
                    return Err(EngineError::InvalidType {
                        id,
                        expected: HotspotKind::Static,
                        actual: hotspot.hotspot_type,
                    });
                }
            }
            PlacementTarget::Keyframe(_, slot) => {
                if hotspot.hotspot_type != HotspotKind::Dynamic {
                    return Err(EngineError::InvalidType {
                        id,
                        expected: HotspotKind::Dynamic,
                        actual: hotspot.hotspot_type,
                    });
                }
                if hotspot.interpolated {
                    return Err(EngineError::InvalidInput(format!(
                        "hotspot {id} already committed its keyframes"
                    )));
                }
                if slot >= MAX_KEYFRAME_SLOTS {
                    return Err(EngineError::KeyframeOutOfRange { id, slot });
                }
                // Slots fill strictly in order; indices below the
                // positioned count reposition an existing keyframe.
                if slot > hotspot.positioned_keyframes() {
                    return Err(EngineError::InvalidInput(format!(
                        "keyframe slot {slot} of hotspot {id} is not yet reachable"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Whether the "interpolate" authoring action is available for `id`:
/// every slot positioned and the keyframe set not yet committed.
pub fn interpolation_ready(registry: &HotspotRegistry, id: HotspotId) -> bool {
    registry
        .get(id)
        .map(|hotspot| {
            hotspot.hotspot_type == HotspotKind::Dynamic
                && !hotspot.interpolated
                && hotspot.positioned_keyframes() >= MAX_KEYFRAME_SLOTS
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamic_hotspot(registry: &mut HotspotRegistry) -> HotspotId {
        let id = registry.create();
        registry
            .retype(id, HotspotKind::Dynamic)
            .expect("hotspot exists");
        id
    }

    #[test]
    fn slots_fill_strictly_in_order() {
        let mut registry = HotspotRegistry::new();
        let id = dynamic_hotspot(&mut registry);
        let mut arbiter = PlacementArbiter::new();

        assert!(!arbiter.can_begin(&registry, PlacementTarget::Keyframe(id, 1)));
        assert!(!arbiter.can_begin(&registry, PlacementTarget::Keyframe(id, 2)));
        assert!(arbiter.can_begin(&registry, PlacementTarget::Keyframe(id, 0)));

        arbiter
            .begin(&registry, PlacementTarget::Keyframe(id, 0))
            .expect("slot 0 reachable");
        arbiter
            .commit(&mut registry, SphereAngles::new(0.0, 0.0), 0.0)
            .expect("commit succeeds");

        assert!(arbiter.can_begin(&registry, PlacementTarget::Keyframe(id, 1)));
        assert!(!arbiter.can_begin(&registry, PlacementTarget::Keyframe(id, 2)));
        // Slot 0 stays reachable for repositioning.
        assert!(arbiter.can_begin(&registry, PlacementTarget::Keyframe(id, 0)));
    }

    #[test]
    fn placement_locks_globally_while_awaiting() {
        let mut registry = HotspotRegistry::new();
        let dynamic = dynamic_hotspot(&mut registry);
        let static_id = registry.create();
        let mut arbiter = PlacementArbiter::new();

        arbiter
            .begin(&registry, PlacementTarget::Static(static_id))
            .expect("static placement arms");
        assert!(arbiter.locked());
        assert!(!arbiter.can_begin(&registry, PlacementTarget::Keyframe(dynamic, 0)));
        assert!(!arbiter.can_begin(&registry, PlacementTarget::Static(static_id)));

        arbiter
            .commit(&mut registry, SphereAngles::new(90.0, 0.0), 4.0)
            .expect("commit succeeds");
        assert!(!arbiter.locked());
        assert!(arbiter.can_begin(&registry, PlacementTarget::Keyframe(dynamic, 0)));
    }

    #[test]
    fn stray_commits_are_ignored() {
        let mut registry = HotspotRegistry::new();
        registry.create();
        let mut arbiter = PlacementArbiter::new();
        let outcome = arbiter
            .commit(&mut registry, SphereAngles::new(1.0, 2.0), 3.0)
            .expect("stray commit is not an error");
        assert_eq!(outcome, None);
    }

    #[test]
    fn static_commit_captures_angles_and_time() {
        let mut registry = HotspotRegistry::new();
        let id = registry.create();
        let mut arbiter = PlacementArbiter::new();
        arbiter
            .begin(&registry, PlacementTarget::Static(id))
            .expect("placement arms");
        arbiter
            .commit(&mut registry, SphereAngles::new(123.0, -4.0), 7.5)
            .expect("commit succeeds");

        let hotspot = registry.get(id).expect("present");
        assert_eq!(hotspot.yaw, Some(123.0));
        assert_eq!(hotspot.pitch, Some(-4.0));
        assert_eq!(hotspot.display_start_time, Some(7.5));
        assert!(hotspot.positioned);
    }

    #[test]
    fn interpolation_enables_exactly_after_the_third_slot() {
        let mut registry = HotspotRegistry::new();
        let id = dynamic_hotspot(&mut registry);
        let mut arbiter = PlacementArbiter::new();

        for slot in 0..MAX_KEYFRAME_SLOTS {
            assert!(!interpolation_ready(&registry, id));
            arbiter
                .begin(&registry, PlacementTarget::Keyframe(id, slot))
                .expect("slot reachable");
            arbiter
                .commit(
                    &mut registry,
                    SphereAngles::new(slot as f32 * 45.0, 0.0),
                    slot as f64 * 5.0,
                )
                .expect("commit succeeds");
        }
        assert!(interpolation_ready(&registry, id));

        registry.mark_interpolated(id).expect("interpolation commits");
        assert!(!interpolation_ready(&registry, id));
        assert!(!arbiter.can_begin(&registry, PlacementTarget::Keyframe(id, 0)));
    }

    #[test]
    fn failed_commit_keeps_the_placement_armed() {
        let mut registry = HotspotRegistry::new();
        let id = dynamic_hotspot(&mut registry);
        let mut arbiter = PlacementArbiter::new();
        arbiter
            .begin(&registry, PlacementTarget::Keyframe(id, 0))
            .expect("slot reachable");
        arbiter
            .commit(&mut registry, SphereAngles::new(0.0, 0.0), 2.0)
            .expect("commit succeeds");

        arbiter
            .begin(&registry, PlacementTarget::Keyframe(id, 1))
            .expect("slot reachable");
        let duplicate = arbiter.commit(&mut registry, SphereAngles::new(45.0, 0.0), 2.0);
        assert!(duplicate.is_err());
        assert!(arbiter.locked(), "author can click again at another time");

        arbiter
            .commit(&mut registry, SphereAngles::new(45.0, 0.0), 4.0)
            .expect("retry succeeds");
        assert!(!arbiter.locked());
    }
}
