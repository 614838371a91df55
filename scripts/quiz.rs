use std::env;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use console::{Term, style};
use tokio::sync::oneshot;

use anime_recommender::{
    clients::{JikanClient, JikanConfig},
    config::Config,
    detail::episode_label,
    pipeline::RecommendationPipeline,
    questionnaire::{
        Answer, Experience, Mood, Questionnaire, RatingCeiling, Step, TimeCommitment, Transition,
        steps::{Question, question},
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    let catalog_url = parse_args()?;
    let config = Config::from_env().context("failed to load configuration")?;
    let mut jikan = config.jikan_config();
    if let Some(url) = catalog_url {
        jikan = JikanConfig { base_url: url, ..jikan };
    }
    let catalog = Arc::new(JikanClient::new(jikan).context("failed to build catalog client")?);
    let pipeline = RecommendationPipeline::builder(catalog)
        .with_source_timeout(config.catalog_source_timeout())
        .build();

    let term = Term::stdout();
    let (sender, receiver) = oneshot::channel();
    let mut questionnaire = Questionnaire::new(move |answers| {
        let _ = sender.send(answers);
    });

    term.write_line(&style("Anime recommendation quiz").bold().cyan().to_string())?;
    term.write_line("Answer with option numbers. Type b to go back, q to quit.")?;

    while let Some(step) = questionnaire.current_step() {
        let current = question(step);
        print_question(&term, &questionnaire, current)?;

        let input = term.read_line()?;
        let input = input.trim();
        match input {
            "q" | "Q" => {
                term.write_line("Bye.")?;
                return Ok(());
            }
            "b" | "B" => {
                if questionnaire.retreat() == Transition::Unchanged {
                    term.write_line(&style("Already at the first question.").dim().to_string())?;
                }
                continue;
            }
            _ => {}
        }

        match parse_answer(current, input) {
            Ok(answer) => questionnaire.answer(answer),
            Err(error) => {
                term.write_line(&style(format!("{error}")).red().to_string())?;
                continue;
            }
        }

        if questionnaire.advance() == Transition::Stalled {
            term.write_line(&style("Please pick an option first.").red().to_string())?;
        }
    }

    let answers = receiver
        .await
        .context("questionnaire finished without answers")?;

    term.write_line("")?;
    term.write_line(&style("Finding recommendations...").dim().to_string())?;
    let recommendations = pipeline.generate(&answers).await;

    for (rank, scored) in recommendations.iter().enumerate() {
        term.write_line(&format!(
            "{} {} ({}, {:.1})",
            style(format!("{}.", rank + 1)).bold(),
            style(&scored.item.title).bold().yellow(),
            episode_label(scored.item.episodes),
            scored.recommendation_score
        ))?;
        term.write_line(&format!("   {}", scored.explanation))?;
    }

    Ok(())
}

fn print_question(term: &Term, questionnaire: &Questionnaire, current: &Question) -> Result<()> {
    term.write_line("")?;
    term.write_line(&format!(
        "{} {}",
        style(format!("[{}/{}]", questionnaire.step_number(), Step::ALL.len())).dim(),
        style(current.title).bold()
    ))?;
    for (index, option) in current.options.iter().enumerate() {
        term.write_line(&format!("  {:>2}) {}", index + 1, option.label))?;
    }
    if current.max_selections > 1 {
        term.write_line(&format!(
            "  (up to {}, comma separated)",
            current.max_selections
        ))?;
    }
    Ok(())
}

/// 番号または選択肢IDを回答に変換する。
fn parse_answer(current: &Question, input: &str) -> Result<Answer> {
    let picks = input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| resolve_option(current, part))
        .collect::<Result<Vec<&'static str>>>()?;

    let answer = match current.step {
        Step::Genres => {
            if picks.len() > current.max_selections {
                bail!("pick at most {} genres", current.max_selections);
            }
            Answer::Genres(picks.into_iter().map(str::to_string).collect())
        }
        Step::Experience => Answer::Experience(single_pick::<Experience>(&picks)?),
        Step::Mood => Answer::Mood(single_pick::<Mood>(&picks)?),
        Step::Rating => Answer::Rating(single_pick::<RatingCeiling>(&picks)?),
        Step::TimeCommitment => Answer::TimeCommitment(single_pick::<TimeCommitment>(&picks)?),
    };
    Ok(answer)
}

/// 選択肢IDはそのまま回答値のシリアライズ名になっている。
fn single_pick<T: serde::de::DeserializeOwned>(picks: &[&str]) -> Result<T> {
    let [id] = picks else {
        bail!("pick exactly one option");
    };
    serde_json::from_value(serde_json::Value::String((*id).to_string()))
        .with_context(|| format!("unsupported option: {id}"))
}

fn resolve_option(current: &Question, part: &str) -> Result<&'static str> {
    if let Ok(number) = part.parse::<usize>() {
        return current
            .options
            .get(number.wrapping_sub(1))
            .map(|option| option.id)
            .with_context(|| format!("no option numbered {number}"));
    }
    current
        .options
        .iter()
        .find(|option| option.id.eq_ignore_ascii_case(part))
        .map(|option| option.id)
        .with_context(|| format!("unknown option: {part}"))
}

fn parse_args() -> Result<Option<String>> {
    let mut catalog_url = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--catalog-url" => {
                let value = args.next().context("--catalog-url requires a URL argument")?;
                catalog_url = Some(value);
            }
            "--help" => {
                print_usage();
                process::exit(0);
            }
            _ => {
                bail!("unknown argument: {}", arg);
            }
        }
    }

    Ok(catalog_url)
}

fn print_usage() {
    eprintln!("Usage: quiz [--catalog-url <url>]");
}
