//! Headless host for the locomotion controller.
//!
//! Usage:
//!   cargo run -p sandbox                                 # default settings, 6 s at 60 Hz
//!   cargo run -p sandbox -- --settings tuning.json      # load controller settings
//!   RUST_LOG=debug cargo run -p sandbox -- --hz 120     # per-transition logging

mod scenario;

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use log::{info, warn};

use locomotion::{
    CapsuleSpec, CharacterPose, ControllerSettings, FrameInput, GravityProfileSet,
    LocomotionController, Quat, RapierGroundProbe, RapierMover,
};

use scenario::{Action, MAX_FLOOR_ANGLE_DEG};

#[derive(Parser)]
#[command(name = "sandbox")]
#[command(about = "Run the scripted locomotion scenario against a Rapier world")]
struct Args {
    /// Controller settings (JSON). Missing fields use defaults.
    #[arg(short = 's', long)]
    settings: Option<PathBuf>,

    /// Gravity profiles (JSON array). Defaults to `default` and `inverted`.
    #[arg(short = 'p', long)]
    profiles: Option<PathBuf>,

    /// Simulated duration in seconds
    #[arg(long, default_value_t = 6.0)]
    seconds: f32,

    /// Fixed step rate
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    hz: u32,
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))
}

fn load_settings(path: Option<&Path>) -> Result<ControllerSettings, String> {
    match path {
        Some(path) => ControllerSettings::from_json_str(&read(path)?).map_err(|e| e.to_string()),
        None => Ok(ControllerSettings::default()),
    }
}

fn load_profiles(
    path: Option<&Path>,
    settings: &ControllerSettings,
) -> Result<GravityProfileSet, String> {
    match path {
        Some(path) => GravityProfileSet::from_json_str(&read(path)?).map_err(|e| e.to_string()),
        None => Ok(GravityProfileSet::standard(settings)),
    }
}

fn run(args: &Args) -> Result<(), String> {
    let settings = load_settings(args.settings.as_deref())?;
    let profiles = load_profiles(args.profiles.as_deref(), &settings)?;

    let capsule = CapsuleSpec::default();
    let world = scenario::build_world().into_shared();

    let mut controller = LocomotionController::builder()
        .probe(RapierGroundProbe::new(
            world.clone(),
            capsule,
            MAX_FLOOR_ANGLE_DEG,
        ))
        .resolver(RapierMover::new(world.clone(), capsule, MAX_FLOOR_ANGLE_DEG))
        .pose(CharacterPose::new(
            scenario::spawn_point(&capsule),
            Quat::identity(),
        ))
        .settings(settings)
        .profiles(profiles)
        .build()
        .map_err(|e| e.to_string())?;

    let dt = 1.0 / args.hz as f32;
    let frames = (args.seconds.max(0.0) * args.hz as f32).ceil() as u32;
    let summary_every = (args.hz / 2).max(1);

    let (mut horizontal, mut vertical) = (0.0, 0.0);
    let mut previous_time = 0.0;

    for frame in 1..=frames {
        let time = frame as f32 * dt;
        world.borrow_mut().advance_platforms(dt);

        let mut jump_pressed = false;
        for action in scenario::due(previous_time, time) {
            match action {
                Action::Walk {
                    horizontal: h,
                    vertical: v,
                } => {
                    horizontal = h;
                    vertical = v;
                }
                Action::Jump => jump_pressed = true,
                Action::Reorient(profile) => {
                    if let Err(e) = controller.request_reorientation(profile) {
                        warn!("Reorientation to `{profile}` refused: {e}");
                    }
                }
            }
        }
        previous_time = time;

        let report = controller.step(&FrameInput {
            horizontal,
            vertical,
            jump_pressed,
            delta_time: dt,
            time,
        });

        if frame % summary_every == 0 || report.ceiling_bounce {
            let pose = controller.pose();
            let t = pose.translation;
            info!(
                "t={time:5.2} pos=({:6.2}, {:6.2}, {:6.2}) up_y={:5.2} grounded={} vs={:6.2}{}",
                t.x,
                t.y,
                t.z,
                pose.up().y,
                report.grounded,
                report.vertical_speed,
                if report.ceiling_bounce {
                    " ceiling"
                } else if report.platform.is_some() {
                    " riding"
                } else {
                    ""
                }
            );
        }
    }

    let t = controller.pose().translation;
    println!(
        "Finished {frames} frame(s) at ({:.3}, {:.3}, {:.3}), grounded={}",
        t.x,
        t.y,
        t.z,
        controller.is_grounded(previous_time)
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
