//! The `recall init` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::CONFIG_FILE;

pub fn execute(dir: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    write_if_missing(&dir, CONFIG_FILE, SAMPLE_CONFIG)?;
    write_if_missing(&dir, "input.csv", SAMPLE_INPUT)?;

    for media_dir in ["sound", "video"] {
        let path = dir.join(media_dir);
        if path.is_dir() {
            println!("{media_dir}/ already exists, skipping.");
        } else {
            std::fs::create_dir_all(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            println!("Created {media_dir}/");
        }
    }

    println!("\nNext steps:");
    println!("  1. Fill input.csv with your associations (meaning,word,sign[,word_difficulty,sign_difficulty])");
    println!("  2. Put the word sounds in sound/ and the sign videos in video/");
    println!("  3. Run: recall validate");
    println!("  4. Run: recall run");

    Ok(())
}

fn write_if_missing(dir: &Path, name: &str, content: &str) -> Result<()> {
    let path = dir.join(name);
    if path.exists() {
        println!("{name} already exists, skipping.");
    } else {
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {name}");
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# recall configuration
# Relative paths are resolved against the experiment directory.

input = "input.csv"
sound_dir = "sound"
video_dir = "video"
output_dir = "."
# seed = 1234

[counts.hearing]
words = 4
signs = 0

[counts.deaf]
words = 0
signs = 36

[timing]
lead_in = 1.0
hold = 3.0
repetitions = 2
trail = 1.0
sign_loops = 2
replay_interval = 3.0
completion = 3.0
frame_interval_ms = 50

[media]
# audio_player = ["aplay", "-q", "{file}"]
# duration_probe = ["ffprobe", "-v", "error", "-show_entries", "format=duration", "-of", "csv=p=0", "{file}"]
fallback_sign_secs = 3.0
"#;

const SAMPLE_INPUT: &str = "\
meaning,word,sign,word_difficulty,sign_difficulty
water,water.wav,water.mp4,easy,easy
tree,tree.wav,tree.mp4,easy,hard
house,house.wav,house.mp4,hard,easy
friend,friend.wav,friend.mp4,hard,hard
";
