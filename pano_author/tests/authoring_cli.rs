use std::fs;
use std::process::Command;

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::tempdir;

use pano_core::angles::{position_from_angles, SphereAngles, SPHERE_RADIUS};

#[test]
fn authoring_run_creates_and_persists_a_hotspot() -> Result<()> {
    let temp_dir = tempdir().context("creating temporary project directory")?;
    let project_path = temp_dir.path().join("project.json");

    let output = Command::new(env!("CARGO_BIN_EXE_pano_author"))
        .args([
            "--project",
            project_path.to_str().context("project path is not UTF-8")?,
            "--add-hotspot",
            "--inspect",
        ])
        .output()
        .context("executing pano_author")?;

    assert!(
        output.status.success(),
        "pano_author exited with {:?}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Interaction 0"),
        "inspection missing the seeded title: {stdout}"
    );

    let raw = fs::read_to_string(&project_path).context("reading persisted project")?;
    let document: Value = serde_json::from_str(&raw).context("parsing persisted project")?;
    let hotspots = document["hotspots"]
        .as_array()
        .context("hotspots array present")?;
    assert_eq!(hotspots.len(), 1);
    assert_eq!(hotspots[0]["id"], 0);
    assert_eq!(hotspots[0]["hotspotType"], "static");
    assert_eq!(hotspots[0]["positioned"], false);

    Ok(())
}

#[test]
fn dynamic_flow_interpolates_in_the_timeline_report() -> Result<()> {
    let temp_dir = tempdir().context("creating temporary project directory")?;
    let project_path = temp_dir.path().join("project.json");
    let timeline_path = temp_dir.path().join("timeline.json");
    let project = project_path.to_str().context("project path is not UTF-8")?;

    let created = Command::new(env!("CARGO_BIN_EXE_pano_author"))
        .args(["--project", project, "--add-hotspot"])
        .output()
        .context("executing pano_author to create the hotspot")?;
    assert!(created.status.success());

    let authored = Command::new(env!("CARGO_BIN_EXE_pano_author"))
        .args([
            "--project",
            project,
            "--set-type",
            "0:dynamic",
            "--place",
            "0@0:0:0:0",
            "--place",
            "0@1:45:10:5",
            "--place",
            "0@2:90:0:10",
            "--set-content",
            "0:text",
            "--interpolate",
            "0",
            "--timeline-json",
            timeline_path.to_str().context("timeline path is not UTF-8")?,
            "--tick-step",
            "2.5",
        ])
        .output()
        .context("executing pano_author to author the motion path")?;
    assert!(
        authored.status.success(),
        "pano_author exited with {:?}: {}",
        authored.status,
        String::from_utf8_lossy(&authored.stderr)
    );

    let raw = fs::read_to_string(&project_path).context("reading persisted project")?;
    let document: Value = serde_json::from_str(&raw).context("parsing persisted project")?;
    let hotspot = &document["hotspots"][0];
    assert_eq!(hotspot["hotspotType"], "dynamic");
    assert_eq!(hotspot["interpolated"], true);
    assert_eq!(hotspot["content"]["library"], "text");
    let keyframes = hotspot["keyframes"]
        .as_array()
        .context("keyframes array present")?;
    assert_eq!(keyframes.len(), 3);
    let times: Vec<f64> = keyframes
        .iter()
        .map(|keyframe| keyframe["time"].as_f64().expect("keyframe time"))
        .collect();
    assert_eq!(times, vec![0.0, 5.0, 10.0]);

    let raw = fs::read_to_string(&timeline_path).context("reading timeline report")?;
    let report: Value = serde_json::from_str(&raw).context("parsing timeline report")?;
    let ticks = report["ticks"].as_array().context("ticks array present")?;
    let midpoint = ticks
        .iter()
        .find(|tick| tick["time"].as_f64() == Some(2.5))
        .context("tick at t=2.5 present")?;
    let marker = &midpoint["markers"][0];
    assert_eq!(marker["key"], "hotspot:0");
    assert_eq!(marker["visible"], true);

    let expected = position_from_angles(SphereAngles::new(22.5, 5.0), SPHERE_RADIUS);
    for (axis, component) in ["x", "y", "z"].iter().enumerate() {
        let actual = marker["position"][axis]
            .as_f64()
            .with_context(|| format!("position component {component}"))?;
        let expected = expected.to_array()[axis] as f64;
        assert!(
            (actual - expected).abs() <= 1e-2,
            "position {component}: {actual} != {expected}"
        );
    }

    Ok(())
}

#[test]
fn invalid_operations_never_abort_the_run() -> Result<()> {
    let temp_dir = tempdir().context("creating temporary project directory")?;
    let project_path = temp_dir.path().join("project.json");

    // Removing a hotspot that does not exist is a logged no-op; the run
    // still saves the (empty) document.
    let output = Command::new(env!("CARGO_BIN_EXE_pano_author"))
        .args([
            "--project",
            project_path.to_str().context("project path is not UTF-8")?,
            "--remove-hotspot",
            "42",
        ])
        .output()
        .context("executing pano_author")?;

    assert!(output.status.success());
    assert!(project_path.is_file(), "document saved despite the no-op");

    Ok(())
}
