//! The `recall plan` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use recall_core::catalog;
use recall_core::generator::SessionPlan;
use recall_core::model::{Hearing, Participant};

use crate::commands::run::session_rng;
use crate::config::load_config_from;

pub fn execute(
    hearing: Hearing,
    seed: Option<u64>,
    dir: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref(), &dir)?;
    let associations = catalog::load(&config.input_path(&dir))?;

    let counts = config.counts.for_hearing(hearing);
    let seed = seed.or(config.seed);
    let mut rng = session_rng(seed);
    let participant = Participant::new("plan", hearing)?;
    let plan = SessionPlan::build(&associations, participant, counts, &mut rng)?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Kind", "Meaning", "Stimulus", "Difficulty"]);
    for (i, phase) in plan.phases.iter().enumerate() {
        let difficulty = associations
            .iter()
            .find(|a| a.meaning == phase.meaning && a.stimulus(phase.kind) == phase.stimulus)
            .map(|a| a.difficulty(phase.kind).to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(phase.kind),
            Cell::new(&phase.meaning),
            Cell::new(&phase.stimulus),
            Cell::new(difficulty),
        ]);
    }

    println!(
        "Hearing {hearing}: {} words, {} signs",
        counts.words, counts.signs
    );
    println!("{table}");
    match seed {
        Some(seed) => println!("Seed: {seed}"),
        None => println!("Unseeded; pass --seed to reproduce a plan."),
    }
    Ok(())
}
