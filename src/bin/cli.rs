use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use fxslot::effect::EffectRegistry;
use fxslot::effect::units::register_builtin;
use fxslot::host::DisplayWatcher;
use fxslot::io::manager::Manager;
use fxslot::midi::{MidiEvent, MidiManager, start_midi_manager};
use fxslot::render::{RenderOptions, parse_knob, render_file};
use fxslot::settings::Settings;
use log::{debug, error, info, warn};
use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

#[derive(Parser, Debug)]
#[command(name = "fxslot")]
#[command(version)]
#[command(about = "A single-slot effect host with hot-swappable effects.")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered effects in selection order
    List,
    /// List MIDI input devices
    MidiDevices,
    /// Run the host against JACK
    Run {
        #[arg(
            long,
            env = "FXSLOT_EFFECT",
            default_value = "0",
            help = "Initial effect, by name or index"
        )]
        effect: String,
    },
    /// Process a WAV file offline
    Render {
        #[arg(long, default_value = "0", help = "Effect, by name or index")]
        effect: String,
        #[arg(long, help = "Input WAV file (mono or stereo)")]
        input: PathBuf,
        #[arg(long, help = "Output WAV file (stereo, 32-bit float)")]
        output: PathBuf,
        #[arg(
            long = "param",
            value_name = "KNOB=VALUE",
            help = "Set a knob before rendering: 0..1, or display text such as '-6 dB'"
        )]
        params: Vec<String>,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    info!("fxslot v{}", env!("CARGO_PKG_VERSION"));

    let mut registry = EffectRegistry::new();
    register_builtin(&mut registry).context("failed to register built-in effects")?;
    let registry = Arc::new(registry);

    match args.command {
        Command::List => {
            for (index, entry) in registry.iter().enumerate() {
                println!("{index:>2}  {:<14} {} params", entry.name(), entry.param_count());
            }
            Ok(())
        }
        Command::MidiDevices => {
            for device in MidiManager::list_devices() {
                println!("{device}");
            }
            Ok(())
        }
        Command::Run { effect } => {
            let index = resolve_effect(&registry, &effect)?;
            run(registry, index)
        }
        Command::Render {
            effect,
            input,
            output,
            params,
        } => {
            let knobs = params
                .iter()
                .map(|p| parse_knob(p))
                .collect::<Result<Vec<_>>>()?;
            let options = RenderOptions {
                input,
                output,
                effect: resolve_effect(&registry, &effect)?,
                knobs,
            };
            let summary = render_file(registry, &options)?;
            info!(
                "Done: {} frames at {} Hz through '{}'",
                summary.frames, summary.sample_rate, summary.effect_name
            );
            Ok(())
        }
    }
}

fn resolve_effect(registry: &EffectRegistry, arg: &str) -> Result<usize> {
    if let Ok(index) = arg.parse::<usize>() {
        if index >= registry.count() {
            bail!(
                "effect index {index} out of range ({} effects registered)",
                registry.count()
            );
        }
        return Ok(index);
    }
    registry
        .find(arg)
        .with_context(|| format!("unknown effect '{arg}'"))
}

fn run(registry: Arc<EffectRegistry>, initial_effect: usize) -> Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    info!("Settings:\n{settings}");
    settings.apply_to_environment();

    let manager = Manager::new(&settings.audio, registry, initial_effect)
        .context("failed to start audio")?;
    info!(
        "Running at {} Hz, {} frames per buffer",
        manager.sample_rate(),
        manager.buffer_size()
    );
    debug!("Available inputs: {:?}", manager.get_available_inputs());
    debug!("Available outputs: {:?}", manager.get_available_outputs());
    let host = manager.host().clone();

    let midi = start_midi_manager(settings.midi.mappings.clone(), settings.midi.program_change);
    if let Some(controller) = &settings.midi.controller_name {
        midi.connect(controller);
    }

    let running = Arc::new(AtomicBool::new(true));
    let shutdown_flag = Arc::clone(&running);

    ctrlc::set_handler(move || {
        info!("Ctrl+C received, shutting down...");
        shutdown_flag.store(false, Ordering::SeqCst);
    })
    .context("error setting Ctrl+C handler")?;

    let mut watcher = DisplayWatcher::new();
    while running.load(Ordering::SeqCst) {
        if let Some(info) = watcher.poll(&host) {
            host.reset_knobs_to_defaults();
            info!("Active effect: {} ({})", info.name, info.effect_name);
            for (i, label) in info.param_names.iter().enumerate() {
                info!("  knob {i}: {label} = {:.3}", host.knob(i).unwrap_or_default());
            }
        }

        while let Some(event) = midi.try_recv() {
            match event {
                MidiEvent::Input(input) => {
                    midi.dispatch(&input, &host);
                }
                MidiEvent::Error(e) => warn!("MIDI: {e}"),
            }
        }

        if host.is_faulted() {
            error!("Effect host stopped after a configuration error");
            bail!("effect host faulted");
        }

        thread::sleep(Duration::from_millis(20));
    }

    manager.disconnect_all();
    Ok(())
}
