//! Pixel Arcade entry point
//!
//! Runs one demo headless with its autopilot input and prints a JSON run
//! summary. `RUST_LOG` controls log verbosity.

use std::process::ExitCode;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use pixel_arcade::audio::{AudioManager, SoundLog};
use pixel_arcade::cli::{CliCommand, CliError, RunOptions, USAGE};
use pixel_arcade::platform::{Demo, Runner};
use pixel_arcade::settings::Settings;
use pixel_arcade::{DemoKind, demos};
use serde_json::json;

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let result = CliCommand::from_env().and_then(|cmd| match cmd {
        CliCommand::Help => {
            println!("{USAGE}");
            Ok(())
        }
        CliCommand::List => {
            for kind in DemoKind::ALL {
                println!("{:<10} {}", kind.as_str(), kind.blurb());
            }
            Ok(())
        }
        CliCommand::Run(opts) => run(&opts),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            if matches!(err, CliError::UnknownFlag(_) | CliError::MissingValue { .. }) {
                eprintln!("{USAGE}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(opts: &RunOptions) -> Result<(), CliError> {
    let settings = match &opts.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    settings.validate()?;

    let seed = opts.seed.or(settings.seed).unwrap_or_else(seed_from_time);
    let mut demo = demos::build(opts.demo, &settings, seed);
    let mut runner = Runner::for_demo(demo.as_ref());

    let mut audio = AudioManager::new(SoundLog::default());
    audio.set_master_volume(settings.audio.master_volume);
    audio.set_sfx_volume(settings.audio.sfx_volume);
    audio.set_muted(settings.audio.muted);

    drive(&mut runner, demo.as_mut(), &mut audio, opts);

    let stats = &runner.stats;
    log::info!(
        "{} finished after {} frames ({:.1}s simulated){}",
        opts.demo.as_str(),
        stats.frames,
        runner.clock.elapsed_secs(),
        if stats.quit { ", quit by demo" } else { "" }
    );

    let mut report = json!({
        "demo": opts.demo.as_str(),
        "seed": seed,
        "stats": stats,
        "sounds_played": audio.sink().played.len(),
        "summary": demo.summary(),
    });
    if opts.dump {
        report["commands"] = serde_json::to_value(runner.canvas.commands())?;
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Tick the demo with autopilot input until it quits or the frame budget runs
/// out. In realtime mode ticks follow the wall clock through the fixed-step
/// accumulator.
fn drive(runner: &mut Runner, demo: &mut dyn Demo, audio: &mut AudioManager<SoundLog>, opts: &RunOptions) {
    let progress_every = u64::from(runner.clock.fps) * 5;
    let pause = Duration::from_secs_f32(runner.clock.dt / 4.0);
    let mut last = Instant::now();

    while runner.stats.frames < opts.frames {
        let ticks = if opts.realtime {
            let now = Instant::now();
            let ticks = runner.clock.advance(now.duration_since(last).as_secs_f32());
            last = now;
            ticks
        } else {
            1
        };

        for _ in 0..ticks {
            let ctx = runner.context();
            let sample = demo.autopilot(&ctx);
            if !runner.run_frame(demo, sample, audio) {
                return;
            }
            if runner.stats.frames % progress_every == 0 {
                log::info!("frame {}: {}", runner.stats.frames, demo.summary());
            }
            if runner.stats.frames >= opts.frames {
                return;
            }
        }

        if opts.realtime {
            std::thread::sleep(pause);
        }
    }
}

fn seed_from_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
