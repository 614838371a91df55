//! Rationale generation for recommended titles.
//!
//! Reasons are derived from the same signals used for scoring and are
//! emitted in a fixed priority order:
//!
//! 1. experience / popularity fit
//! 2. matched genres
//! 3. mood
//! 4. community score
//! 5. episode count fit
//!
//! At most two reasons are joined with [`REASON_SEPARATOR`].

use std::borrow::Cow;

use smallvec::SmallVec;

use super::scoring::{matched_genres, matches_mood, popularity_bonus};
use crate::{
    clients::CatalogItem,
    questionnaire::{CompletedAnswers, Experience, Mood, TimeCommitment},
};

pub const REASON_SEPARATOR: &str = " • ";
pub const DEFAULT_EXPLANATION: &str = "Recommended based on your preferences";
const MAX_REASONS: usize = 2;

/// Trait for rationale generation.
pub trait RationaleGenerator: Send + Sync {
    /// Explain why `item` was recommended for `answers`.
    fn generate(&self, item: &CatalogItem, answers: &CompletedAnswers) -> String;
}

/// Default implementation of rationale generation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRationaleGenerator;

impl RationaleGenerator for DefaultRationaleGenerator {
    fn generate(&self, item: &CatalogItem, answers: &CompletedAnswers) -> String {
        let reasons = collect_reasons(item, answers);
        if reasons.is_empty() {
            return DEFAULT_EXPLANATION.to_string();
        }

        reasons
            .iter()
            .take(MAX_REASONS)
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(REASON_SEPARATOR)
    }
}

/// Collect every qualifying reason in priority order.
#[must_use]
pub fn collect_reasons(
    item: &CatalogItem,
    answers: &CompletedAnswers,
) -> SmallVec<[Cow<'static, str>; 5]> {
    let mut reasons: SmallVec<[Cow<'static, str>; 5]> = SmallVec::new();

    if popularity_bonus(answers.experience, item.popularity).is_some() {
        reasons.push(Cow::Borrowed(experience_reason(answers.experience)));
    }

    let matched = matched_genres(item, &answers.genres);
    if !matched.is_empty() {
        reasons.push(Cow::Owned(format!(
            "Matches your {} preferences",
            matched.join(", ")
        )));
    }

    if matches_mood(item, answers.mood) {
        reasons.push(Cow::Borrowed(mood_description(answers.mood)));
    }

    if let Some(score) = item.score {
        if score >= 8.5 {
            reasons.push(Cow::Borrowed(
                "Critically acclaimed with exceptional ratings",
            ));
        } else if score >= 7.5 {
            reasons.push(Cow::Borrowed("Highly rated by the community"));
        }
    }

    match (answers.time_commitment, item.episodes) {
        (TimeCommitment::Short, Some(episodes)) if episodes <= 13 => {
            reasons.push(Cow::Borrowed("Perfect length for a quick watch"));
        }
        (TimeCommitment::Long, Some(episodes)) if episodes >= 26 => {
            reasons.push(Cow::Borrowed(
                "Epic journey with deep character development",
            ));
        }
        _ => {}
    }

    reasons
}

fn experience_reason(experience: Experience) -> &'static str {
    match experience {
        Experience::Beginner => "A beloved classic perfect for newcomers",
        Experience::Casual => "A crowd favorite that is easy to get into",
        Experience::Experienced => "Off the beaten path for seasoned viewers",
        Experience::Expert => "An underrated gem for experienced viewers",
    }
}

/// Mood-specific phrase used when the item carries one of the mood's genres.
#[must_use]
pub const fn mood_description(mood: Mood) -> &'static str {
    match mood {
        Mood::Excited => "High-energy action matches your pumped up mood",
        Mood::Relaxed => "Perfect chill vibes for relaxed viewing",
        Mood::Thoughtful => "Thought-provoking narrative for contemplation",
        Mood::Emotional => "Heartfelt story that will make you feel",
        Mood::Adventurous => "Epic adventure awaits",
        Mood::Dark => "Dark and intense atmosphere",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pipeline::test_support::{answers, item},
        questionnaire::RatingCeiling,
    };

    #[test]
    fn joins_the_two_highest_priority_reasons() {
        let candidate = CatalogItem {
            score: Some(8.0),
            popularity: 300,
            episodes: Some(12),
            genres: vec!["Comedy".into()],
            ..item(1)
        };
        let profile = answers(
            Experience::Beginner,
            &["comedy"],
            Mood::Relaxed,
            RatingCeiling::Pg,
            TimeCommitment::Short,
        );

        let explanation = DefaultRationaleGenerator.generate(&candidate, &profile);

        assert_eq!(
            explanation,
            "A beloved classic perfect for newcomers • Matches your comedy preferences"
        );
        assert_eq!(collect_reasons(&candidate, &profile).len(), 5);
    }

    #[test]
    fn falls_back_to_generic_text_without_signals() {
        let candidate = CatalogItem {
            score: Some(6.0),
            popularity: 100,
            episodes: Some(24),
            genres: vec!["Music".into()],
            ..item(1)
        };
        let profile = answers(
            Experience::Experienced,
            &["horror"],
            Mood::Excited,
            RatingCeiling::R,
            TimeCommitment::Any,
        );

        assert_eq!(
            DefaultRationaleGenerator.generate(&candidate, &profile),
            DEFAULT_EXPLANATION
        );
    }

    #[test]
    fn score_and_length_reasons_follow_genre_and_mood() {
        let candidate = CatalogItem {
            score: Some(8.9),
            popularity: 100,
            episodes: Some(64),
            genres: vec!["Drama".into()],
            ..item(1)
        };
        let profile = answers(
            Experience::Experienced,
            &["action"],
            Mood::Thoughtful,
            RatingCeiling::R,
            TimeCommitment::Long,
        );

        assert_eq!(
            DefaultRationaleGenerator.generate(&candidate, &profile),
            "Critically acclaimed with exceptional ratings • Epic journey with deep character development"
        );
    }

    #[test]
    fn mood_description_is_used_for_matching_mood() {
        let candidate = CatalogItem {
            score: None,
            popularity: 100,
            genres: vec!["Mystery".into()],
            ..item(1)
        };
        let profile = answers(
            Experience::Experienced,
            &["sports"],
            Mood::Thoughtful,
            RatingCeiling::R,
            TimeCommitment::Any,
        );

        assert_eq!(
            DefaultRationaleGenerator.generate(&candidate, &profile),
            "Thought-provoking narrative for contemplation"
        );
    }
}
