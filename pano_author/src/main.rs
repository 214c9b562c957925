use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;

use pano_core::angles::SphereAngles;
use pano_core::model::{ContentRef, Hotspot, HotspotDocument, HotspotKind};
use pano_core::timecode::format_mss;
use pano_engine::{AuthorSession, EngineError, HeadlessScene, ManualTransport, TransportEvent};
use serde_json::json;

mod cli;

use cli::{Command, Operation};

fn main() -> Result<()> {
    env_logger::init();
    let command = cli::parse()?;
    run(command)
}

fn run(command: Command) -> Result<()> {
    let document = load_document(&command.project)?;
    let mut session = AuthorSession::new(
        document,
        ManualTransport::new(command.duration),
        HeadlessScene::new(),
    );
    session.handle_transport_event(TransportEvent::Ready);
    session.handle_transport_event(TransportEvent::Play);

    for operation in command.operations {
        apply_operation(&mut session, operation);
    }

    save_document(&command.project, &session.to_document())?;
    println!("Saved project to {}", command.project.display());

    if command.inspect {
        for hotspot in session.registry().hotspots() {
            println!("{}", describe_hotspot(hotspot));
        }
        if session.registry().is_empty() {
            println!("(no hotspots yet)");
        }
    }

    if let Some(path) = command.timeline_json.as_ref() {
        let report = simulate_timeline(&mut session, command.duration, command.tick_step);
        let json = serde_json::to_string_pretty(&report)
            .context("serializing marker timeline to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing marker timeline to {}", path.display()))?;
        println!("Saved marker timeline to {}", path.display());
    }

    Ok(())
}

fn apply_operation(session: &mut AuthorSession<ManualTransport, HeadlessScene>, operation: Operation) {
    let outcome = match operation {
        Operation::Add => {
            let id = session.create_hotspot();
            println!("Created hotspot {id}");
            Ok(())
        }
        Operation::SetType(id, kind) => session.set_hotspot_type(id, kind),
        Operation::Place {
            target,
            yaw,
            pitch,
            time,
        } => {
            // The headless equivalent of "position on video": seek the
            // transport to the capture time, arm, then commit the angles
            // a pointer ray would have produced.
            session.transport_mut().seek(time);
            session
                .begin_placement(target)
                .and_then(|_| {
                    session
                        .commit_placement(SphereAngles::new(yaw, pitch))
                        .map(|_| ())
                })
        }
        Operation::SetWindow { id, start, end } => {
            session.set_display_window(id, Some(start), Some(end))
        }
        // Selecting a library starts with empty params; the content form
        // fills them in later.
        Operation::SetContent(id, library) => {
            session.set_content(id, ContentRef::new(library, json!({})))
        }
        Operation::SetTitle(id, title) => session.set_title(id, title),
        Operation::Interpolate(id) => session.begin_interpolation(id),
        Operation::Remove(id) => session.delete_hotspot(id),
    };

    match outcome {
        Ok(()) => {}
        // Missing ids are a no-op for the author, never fatal.
        Err(err @ EngineError::NotFound(_)) => warn!("{err}"),
        Err(err) => eprintln!("[pano_author] operation rejected: {err}"),
    }
}

fn load_document(path: &Path) -> Result<HotspotDocument> {
    if !path.exists() {
        eprintln!(
            "[pano_author] info: starting a new project at {}",
            path.display()
        );
        return Ok(HotspotDocument::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading project document {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing project document {}", path.display()))
}

fn save_document(path: &Path, document: &HotspotDocument) -> Result<()> {
    let json =
        serde_json::to_string_pretty(document).context("serializing project document to JSON")?;
    fs::write(path, &json)
        .with_context(|| format!("writing project document to {}", path.display()))
}

fn describe_hotspot(hotspot: &Hotspot) -> String {
    let mut line = format!(
        "hotspot {} [{}] {:?}",
        hotspot.id,
        match hotspot.hotspot_type {
            HotspotKind::Static => "static",
            HotspotKind::Dynamic => "dynamic",
        },
        hotspot.title,
    );

    match hotspot.hotspot_type {
        HotspotKind::Static => {
            if let Some(angles) = hotspot.angles() {
                line.push_str(&format!(
                    " yaw={:.2} pitch={:.2}",
                    angles.yaw, angles.pitch
                ));
            } else {
                line.push_str(" unpositioned");
            }
            let start = hotspot.display_start_time.map(format_mss);
            let end = hotspot.display_end_time.map(format_mss);
            line.push_str(&format!(
                " window={}..{}",
                start.as_deref().unwrap_or("-"),
                end.as_deref().unwrap_or("-"),
            ));
        }
        HotspotKind::Dynamic => {
            line.push_str(&format!(
                " keyframes={}/{}",
                hotspot.positioned_keyframes(),
                pano_core::model::MAX_KEYFRAME_SLOTS,
            ));
            if hotspot.interpolated {
                line.push_str(" interpolated");
            }
        }
    }

    match hotspot.content.as_ref() {
        Some(content) => line.push_str(&format!(" content={}", content.library)),
        None => line.push_str(" content=-"),
    }
    line
}

#[derive(Debug, Serialize)]
struct TimelineReport {
    duration: f64,
    tick_step: f64,
    ticks: Vec<TimelineTick>,
}

#[derive(Debug, Serialize)]
struct TimelineTick {
    time: f64,
    markers: Vec<MarkerSnapshot>,
}

#[derive(Debug, Serialize)]
struct MarkerSnapshot {
    key: String,
    position: [f32; 3],
    visible: bool,
}

/// Step the headless clock across the timeline and record what each
/// preview marker does at every tick.
fn simulate_timeline(
    session: &mut AuthorSession<ManualTransport, HeadlessScene>,
    duration: f64,
    tick_step: f64,
) -> TimelineReport {
    let mut ticks = Vec::new();
    let mut tick = 0u64;
    loop {
        let time = tick as f64 * tick_step;
        if time > duration {
            break;
        }
        session.transport_mut().seek(time);
        session.handle_transport_event(TransportEvent::TimeUpdate);

        let mut markers = Vec::new();
        for key in session.bridge().marker_keys() {
            let Some(handle) = session.bridge().handle_for_key(key) else {
                continue;
            };
            let Some(position) = session.scene().marker_position(handle) else {
                continue;
            };
            markers.push(MarkerSnapshot {
                key: key.to_string(),
                position: position.to_array(),
                visible: session.scene().marker_visible(handle).unwrap_or(false),
            });
        }
        ticks.push(TimelineTick { time, markers });
        tick += 1;
    }

    TimelineReport {
        duration,
        tick_step,
        ticks,
    }
}
