//! Stratified experiment generator.
//!
//! Draws a difficulty-balanced subset of associations for the word phases,
//! then draws the sign phases from whatever is left, so no association
//! contributes both a word and a sign.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::ExperimentError;
use crate::model::{Association, Participant, PhaseCounts, StimulusKind};
use crate::phase::Phase;

/// Build the phase list for a session.
///
/// Returns all word phases followed by all sign phases. Fails before any
/// sampling if there are fewer associations than requested phases.
pub fn generate<R: Rng + ?Sized>(
    associations: &[Association],
    word_count: usize,
    sign_count: usize,
    rng: &mut R,
) -> Result<Vec<Phase>, ExperimentError> {
    let requested = word_count + sign_count;
    if associations.len() < requested {
        return Err(ExperimentError::NotEnoughAssociations {
            requested,
            available: associations.len(),
        });
    }

    let (words, leftovers) = pick_from_each_bucket(
        associations.to_vec(),
        StimulusKind::Word,
        word_count,
        rng,
    )?;
    let (signs, _) = pick_from_each_bucket(leftovers, StimulusKind::Sign, sign_count, rng)?;

    tracing::debug!(
        words = words.len(),
        signs = signs.len(),
        "generated experiment phases"
    );

    Ok(words
        .iter()
        .map(|a| Phase::from_association(a, StimulusKind::Word))
        .chain(
            signs
                .iter()
                .map(|a| Phase::from_association(a, StimulusKind::Sign)),
        )
        .collect())
}

/// Draw `count` associations evenly across the `kind` difficulty buckets.
///
/// Returns `(picked, leftovers)`. All checks run before anything is drawn.
pub fn pick_from_each_bucket<R: Rng + ?Sized>(
    pool: Vec<Association>,
    kind: StimulusKind,
    count: usize,
    rng: &mut R,
) -> Result<(Vec<Association>, Vec<Association>), ExperimentError> {
    if count == 0 {
        return Ok((Vec::new(), pool));
    }

    let mut buckets: BTreeMap<String, Vec<Association>> = BTreeMap::new();
    for association in pool {
        buckets
            .entry(association.difficulty(kind).to_string())
            .or_default()
            .push(association);
    }

    if buckets.is_empty() {
        return Err(ExperimentError::NotEnoughAssociations {
            requested: count,
            available: 0,
        });
    }
    if count % buckets.len() != 0 {
        return Err(ExperimentError::ImbalancedRequest {
            kind,
            requested: count,
            buckets: buckets.len(),
        });
    }

    let per_bucket = count / buckets.len();
    if let Some((name, members)) = buckets.iter().find(|(_, m)| m.len() < per_bucket) {
        return Err(ExperimentError::InsufficientData {
            kind,
            bucket: name.clone(),
            available: members.len(),
            needed: per_bucket,
        });
    }

    let mut picked = Vec::with_capacity(count);
    let mut leftovers = Vec::new();
    for (_, mut members) in buckets {
        members.shuffle(rng);
        let rest = members.split_off(per_bucket);
        picked.extend(members);
        leftovers.extend(rest);
    }

    Ok((picked, leftovers))
}

/// A participant's itinerary: who, how many of each kind, and which phases.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub participant: Participant,
    pub counts: PhaseCounts,
    pub phases: Vec<Phase>,
}

impl SessionPlan {
    /// Generate the phases for `participant` with the given counts.
    pub fn build<R: Rng + ?Sized>(
        associations: &[Association],
        participant: Participant,
        counts: PhaseCounts,
        rng: &mut R,
    ) -> Result<Self, ExperimentError> {
        let phases = generate(associations, counts.words, counts.signs, rng)?;
        Ok(Self {
            participant,
            counts,
            phases,
        })
    }
}
