use thiserror::Error;

// Fixed-shape snapshot of the playing entry; the adapter that reads
// these fields out of the host player's entry objects lives outside
// this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongInfo {
    pub genre: String,
    pub duration: u32,
    pub location: String,
    pub album: String,
    pub title: String,
}

#[derive(Debug, Error)]
#[error("player rejected the seek command: {0}")]
pub struct SeekRejected(pub String);

pub trait Player {
    fn playing_entry(&self) -> Option<SongInfo>;

    // May be rejected when playback has not fully started yet.
    fn set_playing_time(&mut self, pos: u32) -> Result<(), SeekRejected>;
}

pub trait Notifier {
    fn show_message(&self, message: &str);
}

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show_message(&self, message: &str) {
        println!("{message}");
    }
}

pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn show_message(&self, _message: &str) {}
}
