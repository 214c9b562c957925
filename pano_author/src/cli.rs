use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use pano_core::model::{HotspotId, HotspotKind};
use pano_core::timecode::parse_mss;
use pano_engine::PlacementTarget;

#[derive(Parser, Debug)]
#[command(
    about = "Headless authoring host for spherical video hotspots",
    version
)]
pub struct Args {
    /// Path to the hotspot project document (JSON)
    #[arg(long, default_value = "hotspots.json")]
    pub project: PathBuf,

    /// Video duration in seconds assumed by the headless transport
    #[arg(long, default_value_t = 60.0)]
    pub duration: f64,

    /// Create a new hotspot with the authoring defaults
    #[arg(long)]
    pub add_hotspot: bool,

    /// Change a hotspot's type, formatted as ID:static or ID:dynamic
    #[arg(long, value_name = "ID:TYPE")]
    pub set_type: Option<String>,

    /// Commit a placement, formatted as ID[@SLOT]:YAW:PITCH:TIME
    /// (SLOT selects a dynamic keyframe slot; TIME is seconds or M:SS)
    #[arg(long, value_name = "ID[@SLOT]:YAW:PITCH:TIME")]
    pub place: Vec<String>,

    /// Set a static hotspot's display window as ID:START:END
    /// (bounds are seconds or M:SS)
    #[arg(long, value_name = "ID:START:END")]
    pub set_window: Option<String>,

    /// Assign embeddable content to a hotspot, formatted as ID:LIBRARY
    #[arg(long, value_name = "ID:LIBRARY")]
    pub set_content: Option<String>,

    /// Rename a hotspot, formatted as ID:TITLE
    #[arg(long, value_name = "ID:TITLE")]
    pub set_title: Option<String>,

    /// Commit a dynamic hotspot's keyframe set for playback interpolation
    #[arg(long, value_name = "ID")]
    pub interpolate: Option<u32>,

    /// Remove the hotspot with this id
    #[arg(long, value_name = "ID")]
    pub remove_hotspot: Option<u32>,

    /// Print the hotspot list after applying the operations
    #[arg(long)]
    pub inspect: bool,

    /// Path to write a simulated marker timeline as JSON
    #[arg(long)]
    pub timeline_json: Option<PathBuf>,

    /// Tick step in seconds for --timeline-json
    #[arg(long, default_value_t = 1.0)]
    pub tick_step: f64,
}

/// One authoring operation, applied in the order listed here.
#[derive(Debug)]
pub enum Operation {
    Add,
    SetType(HotspotId, HotspotKind),
    Place {
        target: PlacementTarget,
        yaw: f32,
        pitch: f32,
        time: f64,
    },
    SetWindow {
        id: HotspotId,
        start: f64,
        end: f64,
    },
    SetContent(HotspotId, String),
    SetTitle(HotspotId, String),
    Interpolate(HotspotId),
    Remove(HotspotId),
}

#[derive(Debug)]
pub struct Command {
    pub project: PathBuf,
    pub duration: f64,
    pub operations: Vec<Operation>,
    pub inspect: bool,
    pub timeline_json: Option<PathBuf>,
    pub tick_step: f64,
}

pub fn parse() -> Result<Command> {
    Args::parse().into_command()
}

impl Args {
    pub fn into_command(self) -> Result<Command> {
        if self.duration <= 0.0 {
            bail!("--duration must be positive");
        }
        if self.tick_step <= 0.0 {
            bail!("--tick-step must be positive");
        }

        let mut operations = Vec::new();
        if self.add_hotspot {
            operations.push(Operation::Add);
        }
        if let Some(spec) = self.set_type.as_deref() {
            operations.push(parse_set_type(spec)?);
        }
        for spec in &self.place {
            operations.push(parse_place(spec)?);
        }
        if let Some(spec) = self.set_window.as_deref() {
            operations.push(parse_set_window(spec)?);
        }
        if let Some(spec) = self.set_content.as_deref() {
            let (id, library) = split_id_pair(spec, "--set-content", "ID:LIBRARY")?;
            operations.push(Operation::SetContent(id, library));
        }
        if let Some(spec) = self.set_title.as_deref() {
            let (id, title) = split_id_pair(spec, "--set-title", "ID:TITLE")?;
            operations.push(Operation::SetTitle(id, title));
        }
        if let Some(id) = self.interpolate {
            operations.push(Operation::Interpolate(HotspotId(id)));
        }
        if let Some(id) = self.remove_hotspot {
            operations.push(Operation::Remove(HotspotId(id)));
        }

        Ok(Command {
            project: self.project,
            duration: self.duration,
            operations,
            inspect: self.inspect,
            timeline_json: self.timeline_json,
            tick_step: self.tick_step,
        })
    }
}

fn parse_set_type(spec: &str) -> Result<Operation> {
    let (id, kind) = spec
        .split_once(':')
        .with_context(|| format!("--set-type expects ID:TYPE, got {spec:?}"))?;
    let id = parse_id(id)?;
    let kind = match kind {
        "static" => HotspotKind::Static,
        "dynamic" => HotspotKind::Dynamic,
        other => bail!("unknown hotspot type {other:?} (expected static or dynamic)"),
    };
    Ok(Operation::SetType(id, kind))
}

fn parse_place(spec: &str) -> Result<Operation> {
    let parts: Vec<&str> = spec.split(':').collect();
    // An M:SS time carries its own colon, so 5 segments are legal.
    if parts.len() < 4 || parts.len() > 5 {
        bail!("--place expects ID[@SLOT]:YAW:PITCH:TIME, got {spec:?}");
    }

    let target = match parts[0].split_once('@') {
        Some((id, slot)) => {
            let slot: usize = slot
                .parse()
                .with_context(|| format!("invalid keyframe slot in {spec:?}"))?;
            PlacementTarget::Keyframe(parse_id(id)?, slot)
        }
        None => PlacementTarget::Static(parse_id(parts[0])?),
    };

    let yaw: f32 = parts[1]
        .parse()
        .with_context(|| format!("invalid yaw in {spec:?}"))?;
    let pitch: f32 = parts[2]
        .parse()
        .with_context(|| format!("invalid pitch in {spec:?}"))?;
    let time = parse_time(&parts[3..].join(":"))?;

    Ok(Operation::Place {
        target,
        yaw,
        pitch,
        time,
    })
}

fn parse_set_window(spec: &str) -> Result<Operation> {
    let parts: Vec<&str> = spec.split(':').collect();
    let (id, start, end) = match parts.as_slice() {
        [id, start, end] => (*id, *start, *end),
        // M:SS bounds carry their own colon: ID:M:SS:M:SS.
        [id, start_m, start_s, end_m, end_s] => {
            return Ok(Operation::SetWindow {
                id: parse_id(id)?,
                start: parse_time(&format!("{start_m}:{start_s}"))?,
                end: parse_time(&format!("{end_m}:{end_s}"))?,
            });
        }
        _ => bail!("--set-window expects ID:START:END, got {spec:?}"),
    };
    Ok(Operation::SetWindow {
        id: parse_id(id)?,
        start: parse_time(start)?,
        end: parse_time(end)?,
    })
}

fn split_id_pair(spec: &str, flag: &str, shape: &str) -> Result<(HotspotId, String)> {
    let (id, rest) = spec
        .split_once(':')
        .with_context(|| format!("{flag} expects {shape}, got {spec:?}"))?;
    Ok((parse_id(id)?, rest.to_string()))
}

fn parse_id(text: &str) -> Result<HotspotId> {
    let raw: u32 = text
        .parse()
        .with_context(|| format!("invalid hotspot id {text:?}"))?;
    Ok(HotspotId(raw))
}

/// Accept plain seconds ("7.5") or editor timecode text ("1:15").
fn parse_time(text: &str) -> Result<f64> {
    if let Ok(seconds) = parse_mss(text) {
        return Ok(seconds);
    }
    text.parse::<f64>()
        .with_context(|| format!("invalid time {text:?} (expected seconds or M:SS)"))
}
