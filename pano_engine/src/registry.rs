//! The canonical in-memory hotspot store. Every mutation lands here and
//! is echoed as a [`RegistryEvent`] so the derived surfaces (3D markers,
//! authoring list) can re-derive their presentation instead of mutating
//! each other directly.

use std::collections::{BTreeMap, VecDeque};

use pano_core::angles::SphereAngles;
use pano_core::keyframes::sort_keyframes;
use pano_core::model::{
    ContentRef, Hotspot, HotspotDocument, HotspotId, HotspotKind, Keyframe, MAX_KEYFRAME_SLOTS,
};

use crate::error::EngineError;
use crate::placement::PlacementTarget;

/// Mutation notice drained by the sync bridge within the same logical
/// tick as the operation that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    Added(HotspotId),
    Removed(HotspotId),
    Retyped {
        id: HotspotId,
        from: HotspotKind,
        to: HotspotKind,
    },
    ContentAssigned(HotspotId),
    TitleChanged(HotspotId),
    DisplayWindowChanged(HotspotId),
    Repositioned(PlacementTarget),
    Interpolated(HotspotId),
    DocumentReplaced,
}

/// Source of truth for all hotspots of one content instance. Owned by
/// exactly one authoring or runtime context at a time; never shared.
#[derive(Debug, Default)]
pub struct HotspotRegistry {
    hotspots: Vec<Hotspot>,
    index: BTreeMap<HotspotId, usize>,
    next_id: u32,
    pending: VecDeque<RegistryEvent>,
}

impl HotspotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from persisted data. Keyframe sequences are
    /// re-sorted on the way in and id allocation resumes past the
    /// largest id present.
    pub fn from_document(document: HotspotDocument) -> Self {
        let mut registry = Self::new();
        registry.install_document(document);
        registry
    }

    /// Replace the whole collection (e.g. the host re-read saved params
    /// after the video changed). Emits a single `DocumentReplaced`.
    pub fn replace_document(&mut self, document: HotspotDocument) {
        self.install_document(document);
        self.pending.push_back(RegistryEvent::DocumentReplaced);
    }

    fn install_document(&mut self, document: HotspotDocument) {
        self.next_id = document.next_id();
        self.hotspots = document.hotspots;
        for hotspot in &mut self.hotspots {
            sort_keyframes(&mut hotspot.keyframes);
        }
        self.rebuild_index();
    }

    pub fn to_document(&self) -> HotspotDocument {
        HotspotDocument {
            hotspots: self.hotspots.clone(),
        }
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .hotspots
            .iter()
            .enumerate()
            .map(|(position, hotspot)| (hotspot.id, position))
            .collect();
    }

    /// Allocate the next id and append a seeded hotspot. Never fails.
    pub fn create(&mut self) -> HotspotId {
        while self.index.contains_key(&HotspotId(self.next_id)) {
            self.next_id += 1;
        }
        let id = HotspotId(self.next_id);
        self.next_id += 1;

        self.hotspots.push(Hotspot::seeded(id));
        self.index.insert(id, self.hotspots.len() - 1);
        self.pending.push_back(RegistryEvent::Added(id));
        id
    }

    /// Remove a hotspot. The bridge cascades removal of its markers (and,
    /// for dynamic hotspots, every keyframe marker) in the same tick.
    pub fn remove(&mut self, id: HotspotId) -> Result<(), EngineError> {
        let position = *self.index.get(&id).ok_or(EngineError::NotFound(id))?;
        self.hotspots.remove(position);
        self.rebuild_index();
        self.pending.push_back(RegistryEvent::Removed(id));
        Ok(())
    }

    /// Switch a hotspot between static and dynamic. Retyping to the
    /// current kind is a no-op; an actual switch resets all geometry
    /// state because the marker representation is type-dependent.
    pub fn retype(&mut self, id: HotspotId, kind: HotspotKind) -> Result<(), EngineError> {
        let hotspot = self.require_mut(id)?;
        let from = hotspot.hotspot_type;
        if from == kind {
            return Ok(());
        }

        hotspot.hotspot_type = kind;
        hotspot.positioned = false;
        hotspot.interpolated = false;
        match kind {
            HotspotKind::Dynamic => {
                hotspot.yaw = None;
                hotspot.pitch = None;
                hotspot.keyframes = Vec::new();
            }
            HotspotKind::Static => {
                hotspot.keyframes = Vec::new();
                hotspot.yaw = Some(0.0);
                hotspot.pitch = Some(0.0);
            }
        }

        self.pending.push_back(RegistryEvent::Retyped { id, from, to: kind });
        Ok(())
    }

    pub fn assign_content(
        &mut self,
        id: HotspotId,
        content: ContentRef,
    ) -> Result<(), EngineError> {
        let hotspot = self.require_mut(id)?;
        hotspot.content = Some(content);
        self.pending.push_back(RegistryEvent::ContentAssigned(id));
        Ok(())
    }

    pub fn set_title(&mut self, id: HotspotId, title: impl Into<String>) -> Result<(), EngineError> {
        let hotspot = self.require_mut(id)?;
        hotspot.title = title.into();
        self.pending.push_back(RegistryEvent::TitleChanged(id));
        Ok(())
    }

    /// Set a static hotspot's display window. Both bounds are optional;
    /// when both exist, `start <= end` must hold.
    pub fn set_display_window(
        &mut self,
        id: HotspotId,
        start: Option<f64>,
        end: Option<f64>,
    ) -> Result<(), EngineError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(EngineError::InvalidInput(format!(
                    "display window start {start} exceeds end {end}"
                )));
            }
        }

        let hotspot = self.require_mut(id)?;
        if hotspot.hotspot_type != HotspotKind::Static {
            return Err(EngineError::InvalidType {
                id,
                expected: HotspotKind::Static,
                actual: hotspot.hotspot_type,
            });
        }
        hotspot.display_start_time = start;
        hotspot.display_end_time = end;
        self.pending
            .push_back(RegistryEvent::DisplayWindowChanged(id));
        Ok(())
    }

    /// Write a committed placement onto its target: the angle pair plus
    /// the transport time captured at the pointer interaction.
    pub fn commit_placement(
        &mut self,
        target: PlacementTarget,
        angles: SphereAngles,
        time: f64,
    ) -> Result<(), EngineError> {
        match target {
            PlacementTarget::Static(id) => {
                let hotspot = self.require_mut(id)?;
                if hotspot.hotspot_type != HotspotKind::Static {
                    return Err(EngineError::InvalidType {
                        id,
                        expected: HotspotKind::Static,
                        actual: hotspot.hotspot_type,
                    });
                }
                hotspot.yaw = Some(angles.yaw);
                hotspot.pitch = Some(angles.pitch);
                hotspot.display_start_time = Some(time);
                hotspot.positioned = true;
            }
            PlacementTarget::Keyframe(id, slot) => {
                let hotspot = self.require_mut(id)?;
                if hotspot.hotspot_type != HotspotKind::Dynamic {
                    return Err(EngineError::InvalidType {
                        id,
                        expected: HotspotKind::Dynamic,
                        actual: hotspot.hotspot_type,
                    });
                }
                if slot >= MAX_KEYFRAME_SLOTS || slot > hotspot.keyframes.len() {
                    return Err(EngineError::KeyframeOutOfRange { id, slot });
                }
                let duplicate = hotspot
                    .keyframes
                    .iter()
                    .enumerate()
                    .any(|(index, keyframe)| index != slot && keyframe.time == time);
                if duplicate {
                    return Err(EngineError::InvalidInput(format!(
                        "keyframe time {time} already used by hotspot {id}"
                    )));
                }

                let keyframe = Keyframe {
                    time,
                    yaw: angles.yaw,
                    pitch: angles.pitch,
                    positioned: true,
                };
                if slot == hotspot.keyframes.len() {
                    hotspot.keyframes.push(keyframe);
                } else {
                    hotspot.keyframes[slot] = keyframe;
                }
                sort_keyframes(&mut hotspot.keyframes);
            }
        }

        self.pending.push_back(RegistryEvent::Repositioned(target));
        Ok(())
    }

    /// Commit the keyframe set for playback use. Requires a full slot
    /// complement so the authoring flow matches the placement gating.
    pub fn mark_interpolated(&mut self, id: HotspotId) -> Result<(), EngineError> {
        let hotspot = self.require_mut(id)?;
        if hotspot.hotspot_type != HotspotKind::Dynamic {
            return Err(EngineError::InvalidType {
                id,
                expected: HotspotKind::Dynamic,
                actual: hotspot.hotspot_type,
            });
        }
        if hotspot.positioned_keyframes() < MAX_KEYFRAME_SLOTS {
            return Err(EngineError::InvalidInput(format!(
                "hotspot {id} needs {MAX_KEYFRAME_SLOTS} positioned keyframes before interpolation"
            )));
        }
        if !hotspot.interpolated {
            hotspot.interpolated = true;
            self.pending.push_back(RegistryEvent::Interpolated(id));
        }
        Ok(())
    }

    pub fn get(&self, id: HotspotId) -> Option<&Hotspot> {
        self.index.get(&id).map(|position| &self.hotspots[*position])
    }

    fn require_mut(&mut self, id: HotspotId) -> Result<&mut Hotspot, EngineError> {
        let position = *self.index.get(&id).ok_or(EngineError::NotFound(id))?;
        Ok(&mut self.hotspots[position])
    }

    /// Hotspots in stable display order.
    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    pub fn len(&self) -> usize {
        self.hotspots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }

    /// Drain the pending mutation notices in emission order.
    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        self.pending.drain(..).collect()
    }
}
