//! Feedback prompt

use std::io::{BufRead, Write};

use crate::{
    records::{FeedbackRecord, TransactionId},
    shell::{ShellError, prompt, read_line},
    store::FeedbackLog,
};

/// Ask whether the user wants to leave feedback and record it if so.
///
/// Only `yes` (or `y`) followed by a non-empty line records anything; end of input
/// counts as declining.
///
/// # Errors
///
/// Returns a [`ShellError`] on console IO failures or if the feedback log cannot be written.
pub fn collect_feedback(
    input: &mut impl BufRead,
    out: &mut impl Write,
    log: &dyn FeedbackLog,
    transaction_id: TransactionId,
) -> Result<Option<FeedbackRecord>, ShellError> {
    prompt(out, "Do you want to provide feedback? (yes/no): ")?;

    let wants_feedback = read_line(input)?
        .is_some_and(|answer| matches!(answer.to_ascii_lowercase().as_str(), "yes" | "y"));

    if !wants_feedback {
        writeln!(out, "No feedback provided.")?;
        return Ok(None);
    }

    prompt(out, "Please enter your feedback: ")?;

    let Some(text) = read_line(input)?.filter(|text| !text.is_empty()) else {
        writeln!(out, "No feedback provided.")?;
        return Ok(None);
    };

    let record = log.append(transaction_id, &text)?;
    writeln!(out, "Feedback saved successfully!")?;

    Ok(Some(record))
}
