//! Scripted audio session
//!
//! Loads an audio configuration (RON or TOML, `holy_demo/audio.ron` by
//! default), runs a short session of playback and volume calls against the
//! null backend, prints what the sources received and saves the mixer
//! settings. Built with `--features rodio` it plays through the default
//! output device when one is available.

use std::time::Duration;

use holy_audio::audio::backend::{CallLog, NullBackend};
use holy_audio::foundation::logging;
use holy_audio::prelude::*;

const DEFAULT_CONFIG: &str = "holy_demo/audio.ron";
const FRAME: Duration = Duration::from_millis(100);

fn load_config() -> Result<AudioConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => AudioConfig::load_from_file(path),
        None if std::path::Path::new(DEFAULT_CONFIG).exists() => AudioConfig::load_from_file(DEFAULT_CONFIG),
        None => {
            log::warn!("No config given and {} not found, using defaults", DEFAULT_CONFIG);
            Ok(AudioConfig::default())
        }
    }
}

/// One software mixer per configured mixer, exposing its groups' volumes
fn build_mixers(config: &AudioConfig) -> Vec<SoftwareMixer> {
    config
        .mixers
        .iter()
        .map(|info| {
            let groups: Vec<&str> = config
                .groups
                .iter()
                .filter(|group| group.mixer == info.name)
                .map(|group| group.name.as_str())
                .collect();
            SoftwareMixer::with_groups(info.name.as_str(), &groups)
        })
        .collect()
}

fn run_session(
    config: AudioConfig,
    backend: &mut dyn AudioBackend,
    mixers: Vec<SoftwareMixer>,
) -> Result<(), Box<dyn std::error::Error>> {
    let clock = ManualClock::new();
    let mut audio = AudioManager::new();
    audio.initialize(config, backend, mixers.into_iter().map(MixerBinding::new).collect())?;

    if audio.load_settings()? {
        log::info!("Restored saved mixer volumes");
    }

    audio.play("jump")?;
    audio.play("jump")?;
    audio.play_once("coin")?;
    audio.play("not_a_sound")?;

    audio.set_group_volume("Music", 60.0, VolumeUnit::Percent)?;
    audio.set_master_volume("Main", -6.0, VolumeUnit::Decibel)?;
    log::info!(
        "Music group at {:.1}% ({:.1} dB)",
        audio.group_volume("Music", VolumeUnit::Percent),
        audio.group_volume("Music", VolumeUnit::Decibel)
    );

    if let Some(key) = audio.play_repeated("coin", 3, backend, &clock)? {
        log::info!("Repeating coin: {:?}", key);
    }
    for _ in 0..30 {
        clock.advance(FRAME);
        audio.update(&clock);
        backend.update();
    }

    audio.pause_all_but_group("Music")?;
    audio.resume_all()?;
    if let Err(e) = audio.stop_all_from_group("Voice") {
        log::warn!("Expected failure: {}", e);
    }
    audio.stop_all_from_group("Sfx")?;

    if audio.save_settings()? {
        log::info!("Saved mixer settings");
    }
    audio.shutdown();
    backend.shutdown();
    Ok(())
}

fn print_calls(log: &CallLog) {
    for call in log.calls() {
        println!("{:<10} {}", call.transport.verb(), call.clip.display());
    }
    println!("{} transport calls", log.len());
}

#[cfg(feature = "rodio")]
fn run(config: AudioConfig) -> Result<(), Box<dyn std::error::Error>> {
    use holy_audio::audio::backend::rodio_backend::RodioBackend;

    match RodioBackend::new() {
        Ok(backend) => {
            let mixers = build_mixers(&config);
            let mut backend = mixers.iter().fold(backend, |backend, mixer| backend.with_mixer(mixer));
            run_session(config, &mut backend, mixers)
        }
        Err(e) => {
            log::warn!("{}, falling back to the null backend", e);
            run_null(config)
        }
    }
}

#[cfg(not(feature = "rodio"))]
fn run(config: AudioConfig) -> Result<(), Box<dyn std::error::Error>> {
    run_null(config)
}

fn run_null(config: AudioConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mixers = build_mixers(&config);
    let mut backend = NullBackend::new()
        .with_clip_length("assets/audio/coin.wav", Duration::from_millis(800))
        .with_clip_length("assets/audio/theme.ogg", Duration::from_secs(90));
    let log = backend.log();
    run_session(config, &mut backend, mixers)?;
    print_calls(&log);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default("info");

    log::info!("Starting holy_audio demo");

    let config = load_config()?;
    match run(config) {
        Ok(()) => {
            log::info!("Demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Demo failed: {}", e);
            Err(e)
        }
    }
}
