use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rstest::rstest;

use anime_recommender::{
    clients::{CatalogItem, CatalogSource, MediaType},
    pipeline::{RecommendationPipeline, ScoredItem, fallback::fallback_recommendations},
    questionnaire::{
        AnswerSet, Experience, GenreSelection, Mood, RatingCeiling, TimeCommitment,
    },
    util::time::Season,
};

#[derive(Default)]
struct FixedCatalog {
    genre: Vec<CatalogItem>,
    top: Vec<CatalogItem>,
    season: Vec<CatalogItem>,
}

#[async_trait]
impl CatalogSource for FixedCatalog {
    async fn by_genres(&self, _: &[String], _: RatingCeiling) -> Vec<CatalogItem> {
        self.genre.clone()
    }

    async fn top_by_popularity(&self) -> Vec<CatalogItem> {
        self.top.clone()
    }

    async fn by_season(&self, _: i32, _: Season) -> Vec<CatalogItem> {
        self.season.clone()
    }

    async fn by_id(&self, id: u32) -> Option<CatalogItem> {
        self.genre.iter().find(|item| item.id == id).cloned()
    }

    async fn search(&self, _: &str) -> Vec<CatalogItem> {
        Vec::new()
    }
}

fn anime(
    id: u32,
    episodes: Option<u32>,
    score: Option<f64>,
    genres: &[&str],
    rating: Option<&str>,
    popularity: u32,
    media_type: MediaType,
) -> CatalogItem {
    CatalogItem {
        id,
        title: format!("Title {id}"),
        english_title: None,
        episodes,
        score,
        genres: genres.iter().map(|genre| (*genre).to_string()).collect(),
        rating: rating.map(str::to_string),
        popularity,
        image_url: Some(format!("https://img.example.com/{id}.jpg")),
        synopsis: None,
        media_type: Some(media_type),
        year: Some(2024),
        season: None,
        status: None,
    }
}

fn mixed_catalog() -> FixedCatalog {
    FixedCatalog {
        genre: vec![
            anime(1, Some(12), Some(8.0), &["Comedy"], Some("PG - Children"), 300, MediaType::Tv),
            anime(2, Some(26), Some(8.8), &["Action", "Drama"], Some("R - 17+ (violence & profanity)"), 40, MediaType::Tv),
            anime(3, Some(64), Some(9.1), &["Action", "Adventure", "Drama"], Some("R - 17+ (violence & profanity)"), 3, MediaType::Tv),
            anime(4, Some(1), Some(8.3), &["Adventure", "Fantasy"], Some("G - All Ages"), 150, MediaType::Movie),
            anime(5, None, Some(7.1), &["Mystery"], Some("PG-13 - Teens 13 or older"), 2500, MediaType::Tv),
        ],
        top: vec![
            anime(3, Some(64), Some(9.1), &["Action", "Adventure", "Drama"], Some("R - 17+ (violence & profanity)"), 3, MediaType::Tv),
            anime(6, Some(24), Some(8.5), &["Romance", "Slice of Life"], Some("PG-13 - Teens 13 or older"), 90, MediaType::Tv),
            anime(7, Some(13), Some(7.6), &["Sports"], Some("G - All Ages"), 800, MediaType::Tv),
        ],
        season: vec![
            anime(8, Some(12), None, &["Horror", "Psychological"], Some("R+ - Mild Nudity"), 4000, MediaType::Tv),
            anime(9, Some(11), Some(6.9), &["Slice of Life"], Some("G - All Ages"), 5200, MediaType::Ona),
            anime(10, Some(100), Some(7.4), &["Sci-Fi"], Some("PG-13 - Teens 13 or older"), 1200, MediaType::Tv),
            anime(11, Some(2), Some(7.0), &["Comedy"], Some("Rx - Hentai"), 9000, MediaType::Ova),
            anime(12, Some(40), Some(8.0), &["Drama"], None, 700, MediaType::Movie),
        ],
    }
}

fn answer_set(
    experience: Experience,
    genres: &[&str],
    mood: Mood,
    rating: RatingCeiling,
    time_commitment: TimeCommitment,
) -> AnswerSet {
    AnswerSet {
        experience: Some(experience),
        genres: GenreSelection::try_from(
            genres.iter().map(|genre| (*genre).to_string()).collect::<Vec<_>>(),
        )
        .expect("at most three genres"),
        mood: Some(mood),
        rating: Some(rating),
        time_commitment: Some(time_commitment),
    }
}

fn winter_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0)
        .single()
        .expect("valid date")
}

async fn run(catalog: FixedCatalog, answers: &AnswerSet) -> Vec<ScoredItem> {
    RecommendationPipeline::builder(Arc::new(catalog))
        .build()
        .generate_at(answers, winter_day())
        .await
}

const EXPERIENCES: [Experience; 4] = [
    Experience::Beginner,
    Experience::Casual,
    Experience::Experienced,
    Experience::Expert,
];
const MOODS: [Mood; 6] = [
    Mood::Excited,
    Mood::Relaxed,
    Mood::Thoughtful,
    Mood::Emotional,
    Mood::Adventurous,
    Mood::Dark,
];
const RATINGS: [RatingCeiling; 4] = [
    RatingCeiling::G,
    RatingCeiling::Pg,
    RatingCeiling::Pg13,
    RatingCeiling::R,
];
const LENGTHS: [TimeCommitment; 4] = [
    TimeCommitment::Short,
    TimeCommitment::Medium,
    TimeCommitment::Long,
    TimeCommitment::Any,
];

#[tokio::test]
async fn every_complete_answer_set_yields_a_valid_ranking() {
    for experience in EXPERIENCES {
        for mood in MOODS {
            for rating in RATINGS {
                for length in LENGTHS {
                    let answers =
                        answer_set(experience, &["action", "comedy"], mood, rating, length);
                    let result = run(mixed_catalog(), &answers).await;

                    assert!(
                        (1..=6).contains(&result.len()),
                        "length out of range for {answers:?}"
                    );
                    assert!(
                        result
                            .windows(2)
                            .all(|pair| pair[0].recommendation_score >= pair[1].recommendation_score),
                        "scores not non-increasing for {answers:?}"
                    );
                    for scored in &result {
                        assert!(!scored.explanation.is_empty());
                    }
                }
            }
        }
    }
}

#[rstest]
#[case(Experience::Beginner, Mood::Relaxed)]
#[case(Experience::Expert, Mood::Dark)]
#[tokio::test]
async fn short_commitment_only_returns_short_titles_or_movies(
    #[case] experience: Experience,
    #[case] mood: Mood,
) {
    let answers = answer_set(
        experience,
        &["drama"],
        mood,
        RatingCeiling::R,
        TimeCommitment::Short,
    );

    let result = run(mixed_catalog(), &answers).await;

    for scored in &result {
        let short = scored.item.episodes.is_some_and(|episodes| episodes <= 13);
        assert!(
            short || scored.item.media_type == Some(MediaType::Movie),
            "{} is too long",
            scored.item.title
        );
    }
}

#[tokio::test]
async fn g_ceiling_only_returns_all_ages_titles() {
    for length in LENGTHS {
        let answers = answer_set(
            Experience::Casual,
            &["adventure"],
            Mood::Adventurous,
            RatingCeiling::G,
            length,
        );

        let result = run(mixed_catalog(), &answers).await;

        for scored in &result {
            assert_eq!(scored.item.rating.as_deref(), Some("G - All Ages"));
        }
    }
}

#[tokio::test]
async fn identical_inputs_produce_identical_output() {
    let answers = answer_set(
        Experience::Experienced,
        &["action", "drama"],
        Mood::Emotional,
        RatingCeiling::R,
        TimeCommitment::Any,
    );

    let first = run(mixed_catalog(), &answers).await;
    let second = run(mixed_catalog(), &answers).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn beginner_comedy_scenario_scores_matching_item() {
    let answers = answer_set(
        Experience::Beginner,
        &["comedy"],
        Mood::Relaxed,
        RatingCeiling::Pg,
        TimeCommitment::Short,
    );

    let result = run(mixed_catalog(), &answers).await;

    let matching = result
        .iter()
        .find(|scored| scored.item.id == 1)
        .expect("comedy item is recommended");
    assert!((matching.recommendation_score - 12.5).abs() < 1e-9);
    assert!(!matching.explanation.is_empty());
    assert_eq!(result[0].item.id, 1);
}

#[tokio::test]
async fn empty_sources_return_the_fallback_list_unchanged() {
    let answers = answer_set(
        Experience::Beginner,
        &["sports"],
        Mood::Excited,
        RatingCeiling::Pg13,
        TimeCommitment::Medium,
    );

    let result = run(FixedCatalog::default(), &answers).await;

    assert_eq!(result, fallback_recommendations());
}

#[tokio::test]
async fn everything_filtered_out_returns_the_fallback_list() {
    let catalog = FixedCatalog {
        season: vec![anime(
            30,
            Some(200),
            Some(8.0),
            &["Action"],
            Some("R+ - Mild Nudity"),
            10,
            MediaType::Tv,
        )],
        ..FixedCatalog::default()
    };
    let answers = answer_set(
        Experience::Expert,
        &["action"],
        Mood::Excited,
        RatingCeiling::G,
        TimeCommitment::Short,
    );

    assert_eq!(run(catalog, &answers).await, fallback_recommendations());
}

#[rstest]
#[case(Some("R+ - Mild Nudity"), true)]
#[case(Some("Not Rated"), false)]
#[case(None, false)]
#[tokio::test]
async fn r_ceiling_keeps_mild_nudity_and_drops_unknown_ratings(
    #[case] rating: Option<&str>,
    #[case] retained: bool,
) {
    let catalog = FixedCatalog {
        season: vec![
            anime(50, Some(12), Some(7.5), &["Horror"], rating, 3000, MediaType::Tv),
            anime(51, Some(12), Some(6.0), &["Music"], Some("G - All Ages"), 3000, MediaType::Tv),
        ],
        ..FixedCatalog::default()
    };
    let answers = answer_set(
        Experience::Expert,
        &["horror"],
        Mood::Dark,
        RatingCeiling::R,
        TimeCommitment::Any,
    );

    let result = run(catalog, &answers).await;

    assert_eq!(result.iter().any(|scored| scored.item.id == 50), retained);
}

#[tokio::test]
async fn duplicates_across_sources_appear_once() {
    let answers = answer_set(
        Experience::Beginner,
        &["action"],
        Mood::Excited,
        RatingCeiling::R,
        TimeCommitment::Any,
    );

    let result = run(mixed_catalog(), &answers).await;

    let occurrences = result.iter().filter(|scored| scored.item.id == 3).count();
    assert_eq!(occurrences, 1);
}
