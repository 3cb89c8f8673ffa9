//! End-to-end tests of the audio manager over the null backend

use std::time::Duration;

use approx::assert_relative_eq;

use crate::audio::backend::{CallLog, NullBackend, NullSource, SoftwareMixer, Transport};
use crate::audio::*;
use crate::foundation::time::ManualClock;

struct Fixture {
    audio: AudioManager,
    backend: NullBackend,
    log: CallLog,
    _dir: tempfile::TempDir,
}

fn config(dir: &std::path::Path) -> AudioConfig {
    AudioConfig {
        audio_version: "1.0".to_string(),
        mixers_ready: true,
        settings_dir: Some(dir.to_path_buf()),
        groups: vec![
            MixerGroupInfo::new("Music", "Main"),
            MixerGroupInfo::new("Sfx", "Main"),
            MixerGroupInfo::new("Clicks", "Ui"),
        ],
        sounds: vec![
            SoundDescriptor::new("theme", "music/theme.ogg").with_group("Music"),
            SoundDescriptor::new("jump", "sfx/jump.wav").with_group("Sfx"),
            SoundDescriptor::new("land", "sfx/land.wav").with_group("Sfx"),
            SoundDescriptor::new("click", "ui/click.wav").with_group("Clicks"),
            SoundDescriptor::new("jump", "sfx/jump_dup.wav"),
        ],
        ..AudioConfig::default()
    }
}

fn bindings() -> Vec<MixerBinding> {
    vec![
        MixerBinding::new(SoftwareMixer::with_groups("Main", &["Music", "Sfx"])),
        MixerBinding::new(SoftwareMixer::with_groups("Ui", &["Clicks"])),
    ]
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = NullBackend::new().with_clip_length("sfx/jump.wav", Duration::from_millis(400));
    let log = backend.log();
    let mut audio = AudioManager::new();
    audio.initialize(config(dir.path()), &mut backend, bindings()).unwrap();
    Fixture {
        audio,
        backend,
        log,
        _dir: dir,
    }
}

#[test]
fn test_duplicate_sound_is_dropped() {
    let mut f = fixture();
    assert_eq!(f.audio.dispatcher().unwrap().sounds().len(), 4);

    f.audio.play("jump").unwrap();
    assert_eq!(f.log.count("sfx/jump.wav", Transport::Play), 1);
    assert_eq!(f.log.count("sfx/jump_dup.wav", Transport::Play), 0);
}

#[test]
fn test_missing_sound_makes_no_calls() {
    let mut f = fixture();
    assert_eq!(f.audio.play("missing").unwrap(), DispatchOutcome::NotFound);
    assert!(f.log.is_empty());
}

#[test]
fn test_group_scoped_stop() {
    let mut f = fixture();
    assert_eq!(f.audio.stop_all_from_group("Sfx").unwrap(), 2);
    assert_eq!(f.log.count("sfx/jump.wav", Transport::Stop), 1);
    assert_eq!(f.log.count("sfx/land.wav", Transport::Stop), 1);
    assert_eq!(f.log.len(), 2);

    f.log.clear();
    assert_eq!(f.audio.pause_all_but_group("Sfx").unwrap(), 2);
    assert_eq!(f.log.count("music/theme.ogg", Transport::Pause), 1);
    assert_eq!(f.log.count("ui/click.wav", Transport::Pause), 1);
}

#[test]
fn test_unknown_group_is_an_error() {
    let mut f = fixture();
    assert!(matches!(
        f.audio.stop_all_from_group("Voice"),
        Err(AudioError::GroupNotFound(_))
    ));
    assert!(f.log.is_empty());
}

#[test]
fn test_volume_by_name_handle_and_index() {
    let mut f = fixture();
    f.audio.set_master_volume("Ui", -20.0, VolumeUnit::Decibel).unwrap();
    let handle = f.audio.mixers().unwrap().mixer_handle("Ui").unwrap();
    assert_relative_eq!(f.audio.master_volume(handle, VolumeUnit::Decibel), -20.0);
    assert_relative_eq!(f.audio.master_volume(1usize, VolumeUnit::Percent), 75.0);

    f.audio.set_group_volume("Sfx", 50.0, VolumeUnit::Percent).unwrap();
    assert_relative_eq!(f.audio.group_volume("Sfx", VolumeUnit::Decibel), -40.0);
    assert_relative_eq!(f.audio.group_volume(1usize, VolumeUnit::Percent), 50.0);

    assert!(matches!(
        f.audio.set_group_volume(7usize, 0.0, VolumeUnit::Decibel),
        Err(AudioError::IndexOutOfBounds { index: 7, len: 3 })
    ));
}

#[test]
fn test_settings_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = NullBackend::new();

    let mut first = AudioManager::new();
    first.initialize(config(dir.path()), &mut backend, bindings()).unwrap();
    first.set_master_volume("Main", -8.0, VolumeUnit::Decibel).unwrap();
    first.set_group_volume("Clicks", -30.0, VolumeUnit::Decibel).unwrap();
    assert!(first.save_settings().unwrap());
    first.shutdown();

    let mut second = AudioManager::new();
    second.initialize(config(dir.path()), &mut backend, bindings()).unwrap();
    assert_relative_eq!(second.master_volume("Main", VolumeUnit::Decibel), 0.0);
    assert!(second.load_settings().unwrap());
    assert_relative_eq!(second.master_volume("Main", VolumeUnit::Decibel), -8.0);
    assert_relative_eq!(second.group_volume("Clicks", VolumeUnit::Decibel), -30.0);
}

#[test]
fn test_settings_from_other_version_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = NullBackend::new();

    let mut first = AudioManager::new();
    first.initialize(config(dir.path()), &mut backend, bindings()).unwrap();
    first.set_master_volume("Main", -8.0, VolumeUnit::Decibel).unwrap();
    first.save_settings().unwrap();
    first.shutdown();

    let mut cfg = config(dir.path());
    cfg.audio_version = "2.0".to_string();
    let mut second = AudioManager::new();
    second.initialize(cfg, &mut backend, bindings()).unwrap();
    assert!(matches!(second.load_settings(), Err(AudioError::VersionMismatch { .. })));
    assert_relative_eq!(second.master_volume("Main", VolumeUnit::Decibel), 0.0);
}

#[test]
fn test_settings_with_fewer_groups_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = NullBackend::new();

    let mut first = AudioManager::new();
    first.initialize(config(dir.path()), &mut backend, bindings()).unwrap();
    first.set_master_volume("Main", -8.0, VolumeUnit::Decibel).unwrap();
    first.save_settings().unwrap();
    first.shutdown();

    let mut cfg = config(dir.path());
    cfg.groups.push(MixerGroupInfo::new("Voice", "Main"));
    let mut mixers = bindings();
    mixers[0] = MixerBinding::new(SoftwareMixer::with_groups("Main", &["Music", "Sfx", "Voice"]));
    let mut second = AudioManager::new();
    second.initialize(cfg, &mut backend, mixers).unwrap();
    assert!(matches!(
        second.load_settings(),
        Err(AudioError::LengthMismatch { what: "group", .. })
    ));
    assert_relative_eq!(second.master_volume("Main", VolumeUnit::Decibel), 0.0);
}

#[test]
fn test_source_sounds_and_ambiguous_names() {
    let mut f = fixture();
    let door_log = CallLog::new();
    let door = NullSource::new(
        SourceSettings::from(&SoundDescriptor::new("door", "sfx/door.wav").with_group("Sfx")),
        door_log.clone(),
    );
    let twin = NullSource::new(
        SourceSettings::from(&SoundDescriptor::new("theme", "music/theme_src.ogg")),
        door_log.clone(),
    );
    let registered = f
        .audio
        .register_source_sounds(vec![
            SourceSoundDescriptor::new("door", Box::new(door)),
            SourceSoundDescriptor::new("theme", Box::new(twin)),
        ])
        .unwrap();
    assert_eq!(registered, 2);
    assert!(f.audio.contains_source_sound("door"));

    assert_eq!(f.audio.play_once("door").unwrap(), DispatchOutcome::SourceSound);
    assert_eq!(f.audio.stop("theme").unwrap(), DispatchOutcome::Both);
    assert_eq!(f.log.count("music/theme.ogg", Transport::Stop), 1);
    assert_eq!(door_log.count("music/theme_src.ogg", Transport::Stop), 1);

    assert_eq!(f.audio.stop_all_from_group("Sfx").unwrap(), 3);
    assert_eq!(door_log.count("sfx/door.wav", Transport::Stop), 1);
}

#[test]
fn test_play_repeated_uses_copy() {
    let mut f = fixture();
    let clock = ManualClock::new();
    let key = f
        .audio
        .play_repeated("jump", 3, &mut f.backend, &clock)
        .unwrap()
        .unwrap();
    assert_eq!(f.audio.active_repeats(), 1);

    for _ in 0..3 {
        clock.advance(Duration::from_millis(400));
        f.audio.update(&clock);
    }
    assert_eq!(f.log.count("sfx/jump.wav", Transport::PlayOnce), 3);
    assert_eq!(f.audio.active_repeats(), 0);
    assert!(!f.audio.cancel_repeat(key));

    // The registered sound itself was never touched
    assert!(!f.audio.dispatcher().unwrap().sounds().source("jump").unwrap().is_playing());
}

#[test]
fn test_play_repeated_unknown_length_is_dropped() {
    let mut f = fixture();
    let clock = ManualClock::new();
    f.audio.play_repeated("land", 4, &mut f.backend, &clock).unwrap();
    assert_eq!(f.log.count("sfx/land.wav", Transport::PlayOnce), 1);
    assert_eq!(f.audio.active_repeats(), 1);

    clock.advance(UNKNOWN_LENGTH_LIMIT);
    f.audio.update(&clock);
    assert_eq!(f.audio.active_repeats(), 0);
    assert_eq!(f.log.count("sfx/land.wav", Transport::PlayOnce), 1);
}

#[test]
fn test_play_repeated_missing_sound() {
    let mut f = fixture();
    let clock = ManualClock::new();
    assert!(matches!(
        f.audio.play_repeated("missing", 2, &mut f.backend, &clock),
        Err(AudioError::NotFound(_))
    ));
}

#[test]
fn test_local_dispatcher_shares_mixers() {
    let mut f = fixture();
    let mut local = f
        .audio
        .local_dispatcher(
            vec![SoundDescriptor::new("step", "sfx/step.wav").with_group("Sfx").with_spatial_blend(1.0)],
            Vec::new(),
            &mut f.backend,
            true,
        )
        .unwrap();
    assert_eq!(local.sounds().source("step").unwrap().settings().spatial_blend, 0.0);

    assert_eq!(local.play("step"), DispatchOutcome::Sound);
    assert_eq!(local.play("jump"), DispatchOutcome::NotFound);
    assert_eq!(local.stop_all_from_group(f.audio.mixers().unwrap(), "Sfx").unwrap(), 1);
    assert!(local
        .stop_all_from_group(f.audio.mixers().unwrap(), "Voice")
        .is_err());

    // Global sounds are untouched by the local dispatcher
    assert_eq!(f.log.count("sfx/jump.wav", Transport::Stop), 0);
    assert_eq!(f.log.count("sfx/step.wav", Transport::Stop), 1);
}

#[test]
fn test_disable_spatial_blend_applies_to_all() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = NullBackend::new();
    let mut cfg = config(dir.path());
    cfg.disable_spatial_blend = true;
    let mut audio = AudioManager::new();
    audio.initialize(cfg, &mut backend, bindings()).unwrap();
    audio
        .register_source_sounds(vec![SourceSoundDescriptor::new(
            "door",
            Box::new(backend.standalone_source(SourceSettings::from(&SoundDescriptor::new("door", "sfx/door.wav")))),
        )])
        .unwrap();

    let dispatcher = audio.dispatcher().unwrap();
    assert_eq!(dispatcher.sounds().source("theme").unwrap().settings().spatial_blend, 0.0);
    assert_eq!(dispatcher.source_sounds().get("door").unwrap().settings().spatial_blend, 0.0);
}
