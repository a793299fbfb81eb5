//! Score aggregation.
//!
//! Scores are reported with one decimal and rounded half-up. Sub-scores are
//! integers, so all arithmetic is done in integer tenths and converted to
//! `f64` only at the end.

use crate::models::restaurant::CriterionScores;

const CRITERIA: i64 = 4;

/// `n / d` rounded half-up, for `n >= 0` and `d > 0`.
fn round_half_up_div(n: i64, d: i64) -> i64 {
    (2 * n + d) / (2 * d)
}

/// Overall score of one rating in tenths (63 means 6.3).
pub fn overall_tenths(scores: &CriterionScores) -> i64 {
    round_half_up_div(i64::from(scores.sum()) * 10, CRITERIA)
}

/// Mean of the four sub-scores, rounded to one decimal.
pub fn overall_score(scores: &CriterionScores) -> f64 {
    overall_tenths(scores) as f64 / 10.0
}

/// Mean overall score across the ratings, rounded to one decimal.
///
/// Returns exactly `0.0` when there are no ratings.
pub fn average_rating<'a, I>(ratings: I) -> f64
where
    I: IntoIterator<Item = &'a CriterionScores>,
{
    let (total, count) = ratings
        .into_iter()
        .fold((0i64, 0i64), |(total, count), scores| {
            (total + overall_tenths(scores), count + 1)
        });

    if count == 0 {
        return 0.0;
    }
    round_half_up_div(total, count) as f64 / 10.0
}
