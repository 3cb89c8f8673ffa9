//! Repeated playback
//!
//! Plays a transient copy of a sound a fixed number of times back to back.
//! Each replay is due one clip length after the previous one; the scheduler
//! only advances when [`RepeatScheduler::update`] is called. A copy whose
//! clip length is unknown plays once and is dropped when it stops, or after
//! [`UNKNOWN_LENGTH_LIMIT`] at the latest.

use std::time::Duration;

use crate::audio::backend::AudioSource;
use crate::audio::AudioError;
use crate::foundation::collections::{new_key_type, SlotMap};
use crate::foundation::time::Clock;

/// Longest a copy of unknown length is kept alive
pub const UNKNOWN_LENGTH_LIMIT: Duration = Duration::from_secs(60);

new_key_type! {
    /// Handle to a scheduled repeat job
    pub struct RepeatKey;
}

struct RepeatJob {
    name: String,
    source: Box<dyn AudioSource>,
    remaining: u32,
    interval: Option<Duration>,
    next_at: Duration,
}

impl RepeatJob {
    fn is_finished(&self, now: Duration) -> bool {
        if self.remaining > 0 {
            return false;
        }
        match self.interval {
            Some(_) => now >= self.next_at,
            None => now >= self.next_at || !self.source.is_playing(),
        }
    }
}

/// Clock-driven "play N times" jobs
#[derive(Default)]
pub struct RepeatScheduler {
    jobs: SlotMap<RepeatKey, RepeatJob>,
}

impl RepeatScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Play `source` now and queue `iterations - 1` replays
    ///
    /// A source whose clip length is unknown plays once.
    ///
    /// # Returns
    /// `None` when `iterations` is zero; nothing is played
    pub fn schedule(
        &mut self,
        name: impl Into<String>,
        mut source: Box<dyn AudioSource>,
        iterations: u32,
        clock: &dyn Clock,
    ) -> Result<Option<RepeatKey>, AudioError> {
        let name = name.into();
        if iterations == 0 {
            log::warn!("play_repeated: {} asked for zero iterations", name);
            return Ok(None);
        }

        source.play()?;
        let interval = source.clip_length();
        let remaining = match interval {
            Some(_) => iterations - 1,
            None => {
                if iterations > 1 {
                    log::warn!("play_repeated: clip length of {} is unknown, playing once", name);
                }
                0
            }
        };
        let now = clock.now();
        let job = RepeatJob {
            name,
            source,
            remaining,
            interval,
            next_at: now + interval.unwrap_or(UNKNOWN_LENGTH_LIMIT),
        };
        log::debug!("play_repeated: {} scheduled, {} replays left", job.name, job.remaining);
        Ok(Some(self.jobs.insert(job)))
    }

    /// Replay every due job and drop finished ones
    ///
    /// # Returns
    /// The number of replays started
    pub fn update(&mut self, clock: &dyn Clock) -> usize {
        let now = clock.now();
        let mut replays = 0;
        let mut finished = Vec::new();

        for (key, job) in &mut self.jobs {
            if job.is_finished(now) {
                finished.push(key);
                continue;
            }
            let Some(interval) = job.interval else { continue };
            if job.remaining > 0 && now >= job.next_at {
                match job.source.play() {
                    Ok(()) => replays += 1,
                    Err(e) => log::error!("play_repeated: {} failed: {}", job.name, e),
                }
                job.remaining -= 1;
                job.next_at += interval;
            }
        }

        for key in finished {
            if let Some(mut job) = self.jobs.remove(key) {
                // Looping copies never stop by themselves
                if job.source.is_playing() {
                    if let Err(e) = job.source.stop() {
                        log::warn!("play_repeated: {} failed to stop: {}", job.name, e);
                    }
                }
                log::debug!("play_repeated: {} done", job.name);
            }
        }
        replays
    }

    /// Stop a job and drop it
    ///
    /// # Returns
    /// `false` if the job already finished or was cancelled
    pub fn cancel(&mut self, key: RepeatKey) -> bool {
        match self.jobs.remove(key) {
            Some(mut job) => {
                if let Err(e) = job.source.stop() {
                    log::warn!("play_repeated: {} failed to stop: {}", job.name, e);
                }
                true
            }
            None => false,
        }
    }

    /// Replays still owed by a job
    pub fn remaining(&self, key: RepeatKey) -> Option<u32> {
        self.jobs.get(key).map(|job| job.remaining)
    }

    /// Number of jobs not yet dropped
    pub fn active_count(&self) -> usize {
        self.jobs.len()
    }

    /// Stop and drop every job
    pub fn clear(&mut self) {
        let keys: Vec<_> = self.jobs.keys().collect();
        for key in keys {
            self.cancel(key);
        }
    }
}
