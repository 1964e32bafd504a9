use anyhow::{Result, anyhow};
use pico_args::Arguments;
use std::env;

use crate::config::ConfigState;
use crate::input;
use crate::pipeline::{self, RunOptions};

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    // Flags-based help (-h/--help)
    if pargs.contains(["-h", "--help"]) {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.subcommand()?;

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.opt_free_from_str()?;
            match topic {
                Some(t) => print_subcmd_help(&t),
                None => print_help(),
            }
            Ok(())
        }

        Some("run") => {
            let opts = RunOptions {
                profile: pargs.opt_value_from_str("--profile")?,
                dry_run: pargs.contains("--dry-run"),
            };
            pipeline::run_pipeline(opts)
        }

        Some("devices") => {
            let found = input::discover_multitouch();
            if found.is_empty() {
                println!("no multitouch devices found (are you in the 'input' group?)");
            }
            for d in found {
                println!("{}", d.label());
            }
            Ok(())
        }

        Some("list") => {
            let cfg = ConfigState::load_or_install_default()?;
            for name in cfg.list_profiles() {
                let mark = if name == cfg.active_name { '*' } else { ' ' };
                println!("{mark} {name}");
            }
            Ok(())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: swipectl use <profile_name>"))?;
            let mut cfg = ConfigState::load_or_install_default()?;
            cfg.set_active(&name)?;
            println!("active profile: {}", cfg.active_name);
            Ok(())
        }

        Some("check") => {
            let cfg = ConfigState::load_or_install_default()?;
            let name: String = pargs
                .opt_free_from_str()?
                .unwrap_or_else(|| cfg.active_name.clone());
            let p = cfg.load_named(&name)?;
            let directions: Vec<&str> = p.swipe.direction.iter().map(|d| d.as_str()).collect();
            print_response(&serde_json::json!({
                "profile": name,
                "name": p.meta.name,
                "allow_commands": p.meta.allow_commands,
                "swipe": {
                    "direction": directions,
                    "threshold": p.swipe.threshold,
                    "velocity": p.swipe.velocity,
                    "false_positive_threshold": p.swipe.false_positive_threshold,
                    "scroll": p.swipe.scroll,
                },
                "viewport": p.viewport.map(|v| [v.width, v.height]),
                "bindings": p.bindings,
            }));
            Ok(())
        }

        Some("doctor") => {
            let cfg = ConfigState::load_or_install_default()?;
            let devices: Vec<String> = input::discover_multitouch()
                .iter()
                .map(|d| d.label())
                .collect();
            print_response(&cfg.doctor_report(&devices));
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

fn print_help() {
    println!(
        r#"swipectl - single-finger swipe gestures for Linux touchscreens

USAGE:
  swipectl help [command]                 Show general or command-specific help
  swipectl run [--profile N] [--dry-run]  Recognize swipes and perform bindings
  swipectl devices                        List detected multitouch devices
  swipectl list                           List profiles
  swipectl use <name>                     Switch active profile
  swipectl check [name]                   Validate a profile and print it
  swipectl doctor                         Diagnose permissions/devices

ENV:
  SWIPECTL_LOG=debug                      Log every cancellation and swipe

TIPS:
  - Profiles: ~/.config/swipectl/profiles
  - Active profile pointer: ~/.config/swipectl/active
  - Saving the active profile while `run` is going reloads it
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "run" => println!(
            "usage: swipectl run [--profile <name>] [--dry-run]\nReads touch devices, recognizes swipes and performs their bindings.\n--dry-run logs actions instead of emitting input."
        ),
        "devices" => println!("usage: swipectl devices\nLists multitouch devices swipectl can read."),
        "list" => {
            println!("usage: swipectl list\nLists available profiles; marks active with '*'.")
        }
        "use" => println!("usage: swipectl use <name>\nValidates <name> and makes it the active profile."),
        "check" => println!(
            "usage: swipectl check [name]\nLoads a profile (default: active) and prints the normalized swipe options."
        ),
        "doctor" => println!(
            "usage: swipectl doctor\nChecks permissions and lists detected multitouch devices."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}

fn print_response(v: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(v).unwrap_or_default());
}
