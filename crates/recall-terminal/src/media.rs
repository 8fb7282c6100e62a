//! External media commands.
//!
//! Sounds are played by spawning a configured player (e.g. `aplay {file}`)
//! and killing it on stop. Video lengths come from a configured probe whose
//! first output token is a number of seconds. Failures are logged and never
//! abort a session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

/// Placeholder replaced by the media path in command argv.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Configured media commands.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaCommands {
    /// Player argv. Empty disables audio.
    pub audio_player: Vec<String>,
    /// Duration probe argv. Empty means every clip uses `fallback`.
    pub duration_probe: Vec<String>,
    /// Length assumed for a video that cannot be probed.
    pub fallback: Duration,
}

impl Default for MediaCommands {
    fn default() -> Self {
        Self {
            audio_player: Vec::new(),
            duration_probe: Vec::new(),
            fallback: Duration::from_secs(3),
        }
    }
}

/// Build a command from `argv`, substituting `path` for `{file}`.
///
/// When no argument mentions `{file}` the path is appended. Returns `None`
/// for an empty argv.
pub fn command_for(argv: &[String], path: &Path) -> Option<Command> {
    let (program, args) = argv.split_first()?;
    let file = path.to_string_lossy();

    let mut command = Command::new(program);
    let mut substituted = false;
    for arg in args {
        if arg.contains(FILE_PLACEHOLDER) {
            substituted = true;
            command.arg(arg.replace(FILE_PLACEHOLDER, &file));
        } else {
            command.arg(arg);
        }
    }
    if !substituted {
        command.arg(path);
    }
    Some(command)
}

/// Plays one sound at a time through the configured player.
#[derive(Debug)]
pub struct AudioPlayer {
    argv: Vec<String>,
    child: Option<Child>,
}

impl AudioPlayer {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv, child: None }
    }

    /// Start `path`, stopping whatever was playing.
    pub fn play(&mut self, path: &Path) {
        self.stop();
        let Some(mut command) = command_for(&self.argv, path) else {
            tracing::debug!("no audio player configured; not playing {}", path.display());
            return;
        };

        match command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => self.child = Some(child),
            Err(e) => tracing::warn!("failed to play {}: {e}", path.display()),
        }
    }

    pub fn is_playing(&mut self) -> bool {
        matches!(self.child.as_mut().map(Child::try_wait), Some(Ok(None)))
    }

    pub fn stop(&mut self) {
        if self.is_playing() {
            tracing::debug!("stopping audio playback");
        }
        if let Some(mut child) = self.child.take() {
            // the player may already have exited
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Probes media lengths and remembers them.
#[derive(Debug)]
pub struct DurationProbe {
    argv: Vec<String>,
    fallback: Duration,
    cache: HashMap<PathBuf, Duration>,
}

impl DurationProbe {
    pub fn new(argv: Vec<String>, fallback: Duration) -> Self {
        Self {
            argv,
            fallback,
            cache: HashMap::new(),
        }
    }

    pub fn duration(&mut self, path: &Path) -> Duration {
        if let Some(d) = self.cache.get(path) {
            return *d;
        }
        let d = self.probe(path).unwrap_or(self.fallback);
        self.cache.insert(path.to_path_buf(), d);
        d
    }

    fn probe(&self, path: &Path) -> Option<Duration> {
        let mut command = command_for(&self.argv, path)?;
        let output = match command.stdin(Stdio::null()).stderr(Stdio::null()).output() {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("duration probe failed for {}: {e}", path.display());
                return None;
            }
        };
        if !output.status.success() {
            tracing::warn!(
                "duration probe exited with {} for {}",
                output.status,
                path.display()
            );
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_seconds(&stdout) {
            Some(d) => Some(d),
            None => {
                tracing::warn!(
                    "duration probe printed no duration for {}: {:?}",
                    path.display(),
                    stdout.trim()
                );
                None
            }
        }
    }
}

/// First whitespace-separated token as positive, finite seconds.
pub fn parse_seconds(output: &str) -> Option<Duration> {
    let secs: f64 = output.split_whitespace().next()?.parse().ok()?;
    if secs <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}
