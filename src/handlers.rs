use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::engine::Engine;
use crate::player::{Player, SongInfo};

pub const PODCAST_GENRE: &str = "Podcast";

pub const SEEK_RETRY_ATTEMPTS: usize = 10;
pub const SEEK_RETRY_DELAY: Duration = Duration::from_millis(100);

// A newly playing item that is already tracked gets claimed for this
// host and resumed at the stored position, unless it is within one
// second of the end and counts as finished.
pub fn song_changed(engine: &mut Engine, player: &mut dyn Player, entry: &SongInfo) {
    let Some(pos) = engine.resume_position(&entry.location) else {
        return;
    };

    if pos.saturating_add(1) >= entry.duration {
        return;
    }

    seek_with_retries(player, pos, SEEK_RETRY_ATTEMPTS, SEEK_RETRY_DELAY);
}

// Pausing or stopping a podcast captures the position immediately.
pub fn playing_changed(engine: &mut Engine, player: &dyn Player, playing: bool) {
    if playing {
        return;
    }
    let Some(entry) = player.playing_entry() else {
        return;
    };
    if entry.genre != PODCAST_GENRE {
        return;
    }
    if let Err(err) = engine.save() {
        warn!("save after playback stop failed: {err}");
    }
}

pub fn elapsed_changed(engine: &mut Engine, player: &dyn Player, pos: u32) {
    if pos == 0 {
        return;
    }
    let Some(entry) = player.playing_entry() else {
        return;
    };
    if entry.genre != PODCAST_GENRE || !entry.location.starts_with("file://") {
        return;
    }

    engine.track_elapsed(&entry.location, pos);

    if engine.save_due() {
        if let Err(err) = engine.save() {
            warn!("periodic save failed: {err}");
        }
    }
}

// The player rejects seeks issued before playback has fully started;
// retry a bounded number of times, then give up silently.
pub(crate) fn seek_with_retries(
    player: &mut dyn Player,
    pos: u32,
    attempts: usize,
    retry_delay: Duration,
) -> bool {
    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        match player.set_playing_time(pos) {
            Ok(()) => return true,
            Err(err) => {
                debug!("seek to {pos}s rejected on attempt {attempt}: {err}");
                if attempt < attempts {
                    thread::sleep(retry_delay);
                }
            }
        }
    }
    false
}
