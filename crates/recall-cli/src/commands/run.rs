//! The `recall run` command.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use recall_core::catalog;
use recall_core::display::Display;
use recall_core::generator::SessionPlan;
use recall_core::model::{Association, Hearing, Participant};
use recall_core::phase::PhaseContext;
use recall_core::scripted::{ScriptedAnswer, ScriptedDisplay};
use recall_core::session::{SessionRunner, TracingObserver};
use recall_core::ExperimentError;
use recall_report::SummarySink;
use recall_terminal::{IntakeForm, TerminalDisplay};

use crate::config::{load_config_from, ExperimentConfig};

/// Headless input line that aborts the session.
pub const QUIT_LINE: &str = "#quit";

pub struct RunArgs {
    pub dir: PathBuf,
    pub config: Option<PathBuf>,
    pub participant: Option<String>,
    pub hearing: Option<Hearing>,
    pub seed: Option<u64>,
    pub headless: bool,
}

/// A seeded RNG, or one drawn from OS entropy.
pub fn session_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// One stdin line as a scripted answer.
pub fn parse_answer_line(line: &str) -> ScriptedAnswer {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim() == QUIT_LINE {
        ScriptedAnswer::Cancel
    } else {
        ScriptedAnswer::Text(line.to_string())
    }
}

pub fn execute(args: RunArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref(), &args.dir)?;
    let layout = config.layout(&args.dir);
    let associations = catalog::load_verified(&config.input_path(&args.dir), &layout)?;
    tracing::info!(
        associations = associations.len(),
        "loaded input table from {}",
        config.input_path(&args.dir).display()
    );

    let ctx = PhaseContext {
        layout,
        timing: config.timing.to_timing()?,
    };
    let seed = args.seed.or(config.seed);

    if args.headless {
        let participant = match (&args.participant, args.hearing) {
            (Some(id), Some(hearing)) => Participant::new(id, hearing)?,
            _ => anyhow::bail!("--headless requires --participant and --hearing"),
        };
        let display = ScriptedDisplay::from_answers(
            io::stdin()
                .lock()
                .lines()
                .map_while(Result::ok)
                .map(|line| parse_answer_line(&line)),
        )
        .with_echo(Box::new(io::stdout()))
        .with_default_duration(config.media.to_commands()?.fallback);
        run_session(display, participant, &associations, &config, &args.dir, ctx, seed)
    } else {
        let mut display = TerminalDisplay::open(config.media.to_commands()?)?;
        let participant = match (&args.participant, args.hearing) {
            (Some(id), Some(hearing)) => Participant::new(id, hearing)?,
            (id, _) => {
                let form = IntakeForm::new().with_id(id.as_deref().unwrap_or_default());
                match display.intake(form)? {
                    Some(participant) => participant,
                    None => {
                        display.close()?;
                        return Err(ExperimentError::Cancelled.into());
                    }
                }
            }
        };
        run_session(display, participant, &associations, &config, &args.dir, ctx, seed)
    }
}

fn run_session<D: Display>(
    display: D,
    participant: Participant,
    associations: &[Association],
    config: &ExperimentConfig,
    dir: &Path,
    ctx: PhaseContext,
    seed: Option<u64>,
) -> Result<()> {
    let counts = config.counts.for_hearing(participant.hearing);
    let mut rng = session_rng(seed);
    let plan = SessionPlan::build(associations, participant, counts, &mut rng)?;

    let output_dir = config.output_path(dir);
    let mut sink = SummarySink::new(&output_dir, counts, seed);
    let mut runner = SessionRunner::new(display, rng, ctx);
    let result = runner.run(&plan, &mut sink, &TracingObserver)?;

    let table = sink.table().path_for(&plan.participant);
    println!(
        "Wrote {} response(s) to {}",
        result.len(),
        table.display()
    );
    if let Some(summary) = sink.summary_path() {
        println!("Session summary: {}", summary.display());
    }
    Ok(())
}
