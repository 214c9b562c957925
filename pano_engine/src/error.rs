use pano_core::model::{HotspotId, HotspotKind};
use thiserror::Error;

/// Failure taxonomy for the public authoring/runtime operations.
///
/// Interpolation shortfalls (`NotInterpolable`) never appear here: the
/// sync bridge resolves them locally into a hidden marker. `NotFound` is
/// surfaced by hosts as a logged warning and is never fatal.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("hotspot {0} not found")]
    NotFound(HotspotId),
    #[error("hotspot {id} has no keyframe slot {slot}")]
    KeyframeOutOfRange { id: HotspotId, slot: usize },
    #[error("hotspot {id} is {actual:?}, operation needs {expected:?}")]
    InvalidType {
        id: HotspotId,
        expected: HotspotKind,
        actual: HotspotKind,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
}
