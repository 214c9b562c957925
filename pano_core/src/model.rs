//! The persisted hotspot data shapes shared by the authoring tool and the
//! runtime player. Serialization follows the document schema exactly:
//! camelCase keys, optional geometry fields omitted while unset.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::angles::SphereAngles;

/// How many keyframe slots a dynamic hotspot may author concurrently.
pub const MAX_KEYFRAME_SLOTS: usize = 3;

/// Identity of a hotspot within one content instance. Allocation is
/// monotonic and ids are never reused while higher siblings exist.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct HotspotId(pub u32);

impl fmt::Display for HotspotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotKind {
    Static,
    Dynamic,
}

/// Embeddable content attached to a hotspot. Rendering the descriptor is
/// a collaborator concern; the engine only carries it around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRef {
    pub library: String,
    #[serde(default)]
    pub params: Value,
}

impl ContentRef {
    pub fn new(library: impl Into<String>, params: Value) -> Self {
        Self {
            library: library.into(),
            params,
        }
    }
}

/// A timed angular sample on a dynamic hotspot's motion path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f64,
    pub yaw: f32,
    pub pitch: f32,
    #[serde(default)]
    pub positioned: bool,
}

impl Keyframe {
    pub fn angles(&self) -> SphereAngles {
        SphereAngles::new(self.yaw, self.pitch)
    }
}

/// The addressable interactive unit placed on the video sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: HotspotId,
    pub hotspot_type: HotspotKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentRef>,
    #[serde(default)]
    pub positioned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_end_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<Keyframe>,
    #[serde(default)]
    pub interpolated: bool,
}

impl Hotspot {
    /// A freshly created hotspot with the authoring defaults: static,
    /// unpositioned, content-less, zero display window.
    pub fn seeded(id: HotspotId) -> Self {
        Hotspot {
            id,
            hotspot_type: HotspotKind::Static,
            title: format!("Interaction {id}"),
            content: None,
            positioned: false,
            yaw: None,
            pitch: None,
            display_start_time: Some(0.0),
            display_end_time: Some(0.0),
            keyframes: Vec::new(),
            interpolated: false,
        }
    }

    /// The committed static angle pair, once both halves exist.
    pub fn angles(&self) -> Option<SphereAngles> {
        match (self.yaw, self.pitch) {
            (Some(yaw), Some(pitch)) => Some(SphereAngles::new(yaw, pitch)),
            _ => None,
        }
    }

    pub fn positioned_keyframes(&self) -> usize {
        self.keyframes.iter().filter(|k| k.positioned).count()
    }
}

/// Persisted authoring ↔ runtime document boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotspotDocument {
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

impl HotspotDocument {
    /// Next id to allocate: one past the largest id present, zero for an
    /// empty document.
    pub fn next_id(&self) -> u32 {
        self.hotspots
            .iter()
            .map(|hotspot| hotspot.id.0 + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Composite index key for derived markers. Static hotspots and runtime
/// interpolated markers key on the hotspot alone; editor previews key on
/// each keyframe slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerKey {
    Hotspot(HotspotId),
    Keyframe(HotspotId, usize),
}

impl MarkerKey {
    pub fn hotspot_id(&self) -> HotspotId {
        match self {
            MarkerKey::Hotspot(id) => *id,
            MarkerKey::Keyframe(id, _) => *id,
        }
    }
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerKey::Hotspot(id) => write!(f, "hotspot:{id}"),
            MarkerKey::Keyframe(id, index) => write!(f, "hotspot:{id}:keyframe:{index}"),
        }
    }
}
