//! Role clarity quiz scoring

use crate::error::InputError;

/// Questions in the quiz
pub const QUESTION_COUNT: usize = 10;

/// Highest rating per question
pub const MAX_RATING: u8 = 10;

/// Percentage score of a full answer vector
///
/// `round(sum / (QUESTION_COUNT * MAX_RATING) * 100)`, rounding halves up.
/// Ratings above [`MAX_RATING`] count as [`MAX_RATING`].
#[must_use]
pub fn score(ratings: &[u8; QUESTION_COUNT]) -> u8 {
    let sum: u32 = ratings
        .iter()
        .map(|r| u32::from((*r).min(MAX_RATING)))
        .sum();
    let total = u32::from(MAX_RATING) * QUESTION_COUNT as u32;
    let percent = (sum * 100 + total / 2) / total;
    u8::try_from(percent).unwrap_or(100)
}

/// Validate and score an answer slice
///
/// # Errors
/// [`InputError::WrongRatingCount`] or [`InputError::RatingOutOfRange`]
pub fn score_slice(ratings: &[u8]) -> Result<u8, InputError> {
    let ratings: &[u8; QUESTION_COUNT] =
        ratings
            .try_into()
            .map_err(|_| InputError::WrongRatingCount {
                expected: QUESTION_COUNT,
                found: ratings.len(),
            })?;

    if let Some((index, value)) = ratings
        .iter()
        .enumerate()
        .find(|(_, r)| **r > MAX_RATING)
    {
        return Err(InputError::RatingOutOfRange {
            index,
            value: *value,
            max: MAX_RATING,
        });
    }

    Ok(score(ratings))
}
