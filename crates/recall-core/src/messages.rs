//! Participant-facing session messages.

use crate::model::PhaseCounts;

pub fn welcome() -> String {
    "Welcome! Thank you for taking part in this experiment. It should take no more than \
     30 minutes. Press any key to continue."
        .to_string()
}

/// What the participant is about to see, e.g. "36 novel signs and 4 novel words".
fn itinerary_items(counts: &PhaseCounts) -> String {
    let item = |n: usize, noun: &str| {
        format!("{n} novel {noun}{}", if n == 1 { "" } else { "s" })
    };
    join_parts(
        (counts.signs > 0).then(|| item(counts.signs, "sign")),
        (counts.words > 0).then(|| item(counts.words, "word")),
    )
}

/// The kinds of stimuli in the session, e.g. "signs and words".
fn kinds(counts: &PhaseCounts) -> String {
    join_parts(
        (counts.signs > 0).then(|| "signs".to_string()),
        (counts.words > 0).then(|| "words".to_string()),
    )
}

fn join_parts(first: Option<String>, second: Option<String>) -> String {
    match (first, second) {
        (Some(a), Some(b)) => format!("{a} and {b}"),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => String::new(),
    }
}

pub fn itinerary(counts: &PhaseCounts) -> String {
    let repeat = if counts.signs > 0 {
        "Each sign will be shown twice. "
    } else {
        ""
    };
    format!(
        "You will now see {}. {repeat}Try to remember as many as possible. Press any key to begin.",
        itinerary_items(counts)
    )
}

pub fn break_message(counts: &PhaseCounts) -> String {
    format!(
        "You have now seen all the novel {} once. You will see them once more. \
         Feel free to take a short break. Press any key to continue.",
        kinds(counts)
    )
}

pub fn recall_instructions(counts: &PhaseCounts) -> String {
    format!(
        "In the next stage you will see all the novel {} again and be asked to recall their \
         meaning. Type in your answer using the keyboard and press enter when finished. \
         Press any key to begin.",
        kinds(counts)
    )
}

pub fn completion() -> String {
    "Congratulations, you have completed the experiment. Thank you for your contribution."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn itinerary_for_words_only() {
        let text = itinerary(&PhaseCounts::new(4, 0));
        assert!(text.starts_with("You will now see 4 novel words. Try to remember"));
        assert!(!text.contains("shown twice"));
    }

    #[test]
    fn itinerary_for_mixed_session() {
        let text = itinerary(&PhaseCounts::new(1, 36));
        assert!(text.contains("36 novel signs and 1 novel word."));
        assert!(text.contains("Each sign will be shown twice."));
    }

    #[test]
    fn break_and_recall_name_the_kinds() {
        assert!(break_message(&PhaseCounts::new(0, 36)).contains("all the novel signs once"));
        assert!(recall_instructions(&PhaseCounts::new(4, 2))
            .contains("all the novel signs and words again"));
    }
}
