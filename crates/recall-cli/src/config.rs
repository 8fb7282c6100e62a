//! Experiment configuration (`recall.toml`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use recall_core::catalog::MediaLayout;
use recall_core::model::{Hearing, PhaseCounts};
use recall_core::phase::PresentationTiming;
use recall_terminal::MediaCommands;

/// File name of the per-experiment config.
pub const CONFIG_FILE: &str = "recall.toml";

/// Top-level recall configuration.
///
/// Relative paths are resolved against the experiment directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Input table of associations.
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_sound_dir")]
    pub sound_dir: PathBuf,
    #[serde(default = "default_video_dir")]
    pub video_dir: PathBuf,
    /// Where `<id>-output.csv` and `<id>-session.json` are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Fixed RNG seed. Unseeded sessions draw from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub counts: GroupCounts,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

fn default_input() -> PathBuf {
    PathBuf::from("input.csv")
}
fn default_sound_dir() -> PathBuf {
    PathBuf::from("sound")
}
fn default_video_dir() -> PathBuf {
    PathBuf::from("video")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            sound_dir: default_sound_dir(),
            video_dir: default_video_dir(),
            output_dir: default_output_dir(),
            seed: None,
            counts: GroupCounts::default(),
            timing: TimingConfig::default(),
            media: MediaConfig::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn input_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.input)
    }

    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.output_dir)
    }

    pub fn layout(&self, dir: &Path) -> MediaLayout {
        MediaLayout::new(dir.join(&self.sound_dir), dir.join(&self.video_dir))
    }
}

/// Phase counts per participant group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCounts {
    #[serde(default = "default_hearing_counts")]
    pub hearing: PhaseCounts,
    #[serde(default = "default_deaf_counts")]
    pub deaf: PhaseCounts,
}

fn default_hearing_counts() -> PhaseCounts {
    PhaseCounts::new(4, 0)
}
fn default_deaf_counts() -> PhaseCounts {
    PhaseCounts::new(0, 36)
}

impl Default for GroupCounts {
    fn default() -> Self {
        Self {
            hearing: default_hearing_counts(),
            deaf: default_deaf_counts(),
        }
    }
}

impl GroupCounts {
    pub fn for_hearing(&self, hearing: Hearing) -> PhaseCounts {
        match hearing {
            Hearing::Hearing => self.hearing,
            Hearing::Deaf => self.deaf,
        }
    }
}

/// Presentation timing in seconds, except the frame interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub lead_in: f64,
    pub hold: f64,
    pub repetitions: u32,
    pub trail: f64,
    pub sign_loops: u32,
    pub replay_interval: f64,
    pub completion: f64,
    pub frame_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lead_in: 1.0,
            hold: 3.0,
            repetitions: 2,
            trail: 1.0,
            sign_loops: 2,
            replay_interval: 3.0,
            completion: 3.0,
            frame_interval_ms: 50,
        }
    }
}

fn seconds(name: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("timing.{name} must be a non-negative number of seconds"))
}

impl TimingConfig {
    pub fn to_timing(&self) -> Result<PresentationTiming> {
        anyhow::ensure!(
            self.frame_interval_ms > 0,
            "timing.frame_interval_ms must be positive"
        );
        let replay_interval = seconds("replay_interval", self.replay_interval)?;
        anyhow::ensure!(
            !replay_interval.is_zero(),
            "timing.replay_interval must be positive"
        );

        Ok(PresentationTiming {
            lead_in: seconds("lead_in", self.lead_in)?,
            hold: seconds("hold", self.hold)?,
            repetitions: self.repetitions,
            trail: seconds("trail", self.trail)?,
            sign_loops: self.sign_loops,
            replay_interval,
            completion: seconds("completion", self.completion)?,
            frame: Duration::from_millis(self.frame_interval_ms),
        })
    }
}

/// External media commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Player argv; `{file}` is replaced by the sound path.
    pub audio_player: Vec<String>,
    /// Prints a clip length in seconds; `{file}` is replaced by the video path.
    pub duration_probe: Vec<String>,
    /// Clip length used when probing is unavailable or fails.
    pub fallback_sign_secs: f64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            audio_player: Vec::new(),
            duration_probe: Vec::new(),
            fallback_sign_secs: 3.0,
        }
    }
}

impl MediaConfig {
    pub fn to_commands(&self) -> Result<MediaCommands> {
        let fallback = Duration::try_from_secs_f64(self.fallback_sign_secs)
            .context("media.fallback_sign_secs must be a non-negative number of seconds")?;
        Ok(MediaCommands {
            audio_player: self.audio_player.clone(),
            duration_probe: self.duration_probe.clone(),
            fallback,
        })
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

fn resolve_config_env(config: &mut ExperimentConfig) {
    config.input = resolve_path(&config.input);
    config.sound_dir = resolve_path(&config.sound_dir);
    config.video_dir = resolve_path(&config.video_dir);
    config.output_dir = resolve_path(&config.output_dir);
    for arg in config
        .media
        .audio_player
        .iter_mut()
        .chain(config.media.duration_probe.iter_mut())
    {
        *arg = resolve_env_vars(arg);
    }
}

/// Apply `RECALL_SEED` and `RECALL_OUTPUT_DIR` from `lookup`.
fn apply_overrides(
    config: &mut ExperimentConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(seed) = lookup("RECALL_SEED") {
        config.seed = Some(
            seed.trim()
                .parse()
                .with_context(|| format!("RECALL_SEED is not a valid seed: {seed}"))?,
        );
    }
    if let Some(dir) = lookup("RECALL_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    Ok(())
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `path`, when given
/// 2. `recall.toml` in the experiment directory
/// 3. `~/.config/recall/config.toml`
///
/// Environment variable overrides: `RECALL_SEED`, `RECALL_OUTPUT_DIR`.
pub fn load_config_from(path: Option<&Path>, dir: &Path) -> Result<ExperimentConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = dir.join(CONFIG_FILE);
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match &config_path {
        Some(path) => parse_config_file(path)?,
        None => ExperimentConfig::default(),
    };
    if let Some(path) = &config_path {
        tracing::debug!("loaded config from {}", path.display());
    }

    resolve_config_env(&mut config);
    apply_overrides(&mut config, |name| std::env::var(name).ok())?;
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<ExperimentConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<ExperimentConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("recall"))
}
