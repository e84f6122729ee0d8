use rand::seq::SliceRandom;

use crate::finding::pluralize;

const COMPLIMENTS: &[&str] = &[
    "Well done.",
    "Congrats.",
    "Woo!",
    "Yay.",
    "Jolly good show.",
    "Good on 'ya.",
    "Nice work.",
];

/// One-line description for a commit status or pipeline summary.
pub fn describe(errors: usize, warnings: usize) -> String {
    if errors == 0 && warnings == 0 {
        let compliment = COMPLIMENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("Nice work.");
        return format!("All green. {compliment}");
    }

    let mut description = String::from("\u{26A0} ");
    if errors > 0 {
        description.push_str(&format!("{errors} {}. ", pluralize("Error", errors)));
    }
    if warnings > 0 {
        description.push_str(&format!("{warnings} {}. ", pluralize("Warning", warnings)));
    }
    description.push_str("Don't worry, everything is fixable.");
    description
}
