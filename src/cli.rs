use anyhow::{Result, anyhow};
use pico_args::Arguments;
use std::{
    env,
    io::{self, BufRead},
    path::PathBuf,
};

use crate::config::ConfigStore;
use crate::gestures::GestureClassifier;
use crate::pipeline::{self, PipelineOptions};
use crate::pose::HandPose;

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("run") => {
            let opts = PipelineOptions {
                profile: pargs.opt_value_from_str("--profile")?,
                width: pargs.opt_value_from_str("--width")?,
                height: pargs.opt_value_from_str("--height")?,
                driver_bin: pargs.opt_value_from_str::<_, PathBuf>("--driver-bin")?,
            };
            pipeline::run(opts)
        }

        Some("classify") => run_classify(),

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: handctl use <profile_name>"))?;
            let mut cfg = ConfigStore::load_or_install_default()?;
            cfg.set_active(&name)?;
            println!("active profile: {}", cfg.active_name);
            Ok(())
        }

        Some("list") => {
            let cfg = ConfigStore::load_or_install_default()?;
            for name in cfg.list_profiles() {
                let marker = if name == cfg.active_name { "*" } else { " " };
                println!("{marker} {name}");
            }
            Ok(())
        }

        Some("doctor") => {
            let cfg = ConfigStore::load_or_install_default()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&cfg.doctor_report()).unwrap_or_default()
            );
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

/// Debug aid: label poses from stdin without synthesizing commands.
fn run_classify() -> Result<()> {
    let cfg = ConfigStore::load_or_install_default()?;
    let classifier = GestureClassifier::new(&cfg.profile.thresholds);
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let pose: HandPose = match serde_json::from_str(trimmed) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("parse error: {e}");
                continue;
            }
        };
        if let Err(e) = pose.validate() {
            eprintln!("invalid pose: {e}");
            continue;
        }
        println!("{}", classifier.classify(&pose).as_str());
    }
    Ok(())
}

fn print_help() {
    println!(
        r#"handctl — hand-gesture virtual HID mapper

Reads one hand-pose JSON object per line on stdin and emits HID driver
commands (MOUSE_MOVE, MOUSE_LEFT, GAMEPAD_BTN, ...), one per line.

USAGE:
  handctl help [command]              Show general or command-specific help
  handctl run [options]               Run the mapping pipeline
      --profile <name>                Profile to use for this session
      --width <px> --height <px>      Override the target screen size
      --driver-bin <path>             Spawn this HID driver and feed it
                                      (default: print commands to stdout)
  handctl classify                    Print the gesture label per input pose
  handctl use <name>                  Switch the active profile
  handctl list                        List profiles; active marked with '*'
  handctl doctor                      Diagnose driver permissions

TIPS:
  - Profiles: ~/.config/handctl/profiles (hot-reloaded while running)
  - Active profile pointer: ~/.config/handctl/active
  - RUST_LOG=debug for per-frame diagnostics
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "run" => println!(
            "usage: handctl run [--profile <name>] [--width <px>] [--height <px>] [--driver-bin <path>]\n\
             Runs the pose-to-command pipeline until stdin closes or SIGINT/SIGTERM."
        ),
        "classify" => println!(
            "usage: handctl classify\nLabels each pose on stdin (no debouncing, no commands)."
        ),
        "use" => {
            println!("usage: handctl use <name>\nSwitches the active profile to <name>.")
        }
        "list" => {
            println!("usage: handctl list\nLists available profiles; marks active with '*'.")
        }
        "doctor" => println!(
            "usage: handctl doctor\nChecks /dev/uinput access for the downstream driver."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}
