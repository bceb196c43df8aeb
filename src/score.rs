use crate::types::{AnswerLabel, ScoreTally};

/// Scores `submitted` against `key`, question by question. Questions missing
/// from the submission count as blank and extra submitted answers are
/// ignored.
pub fn compare(key: &[AnswerLabel], submitted: &[AnswerLabel]) -> ScoreTally {
    key.iter()
        .enumerate()
        .fold(ScoreTally::default(), |mut tally, (i, expected)| {
            match submitted.get(i) {
                None => tally.blank += 1,
                Some(answer) if answer.is_blank() => tally.blank += 1,
                Some(answer) if answer == expected => tally.correct += 1,
                Some(_) => tally.incorrect += 1,
            }
            tally
        })
}
