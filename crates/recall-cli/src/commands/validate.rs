//! The `recall validate` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;

use recall_core::catalog::{self, bucket_sizes, find_missing_media, validate_catalog};
use recall_core::generator::generate;
use recall_core::model::{Association, Hearing, StimulusKind};

use crate::config::load_config_from;

pub fn execute(dir: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref(), &dir)?;
    let input = config.input_path(&dir);
    let layout = config.layout(&dir);

    let associations = catalog::load(&input)?;
    println!(
        "Input table: {} ({} associations)",
        input.display(),
        associations.len()
    );

    let mut problems = 0;

    let missing = find_missing_media(&associations, &layout);
    for m in &missing {
        println!("  MISSING: {m}");
    }
    problems += missing.len();

    let warnings = validate_catalog(&associations);
    for w in &warnings {
        let prefix = w
            .meaning
            .as_ref()
            .map(|m| format!("  [{m}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    println!("\n{}", bucket_table(&associations));

    // Draw once per group to check the counts are satisfiable.
    for hearing in [Hearing::Hearing, Hearing::Deaf] {
        let counts = config.counts.for_hearing(hearing);
        let mut rng = StdRng::seed_from_u64(0);
        match generate(&associations, counts.words, counts.signs, &mut rng) {
            Ok(_) => println!(
                "Hearing {hearing}: {} words, {} signs: OK",
                counts.words, counts.signs
            ),
            Err(e) => {
                println!(
                    "Hearing {hearing}: {} words, {} signs: {e}",
                    counts.words, counts.signs
                );
                problems += 1;
            }
        }
    }

    if problems > 0 {
        anyhow::bail!("{problems} problem(s) found in {}", dir.display());
    }
    if warnings.is_empty() {
        println!("\nCatalog valid.");
    } else {
        println!("\nCatalog valid with {} warning(s).", warnings.len());
    }
    Ok(())
}

fn bucket_table(associations: &[Association]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Kind", "Difficulty", "Associations"]);
    for kind in [StimulusKind::Word, StimulusKind::Sign] {
        for (bucket, size) in bucket_sizes(associations, kind) {
            let bucket = if bucket.is_empty() {
                "(none)".to_string()
            } else {
                bucket
            };
            table.add_row(vec![
                Cell::new(kind),
                Cell::new(bucket),
                Cell::new(size),
            ]);
        }
    }
    table
}
