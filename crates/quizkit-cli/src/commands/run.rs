//! The `quizkit run` command.
//!
//! Plays through a quiz with answers taken from a script file: a JSON
//! object mapping question ids to answer values. Questions with no scripted
//! answer are skipped.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use quizkit_core::engine::QuizEngine;
use quizkit_core::error::QuizError;
use quizkit_core::model::Question;
use quizkit_core::parser;
use quizkit_core::report::AttemptReport;
use quizkit_core::value::AnswerValue;
use quizkit_loaders::config::load_config_from;
use quizkit_loaders::PagedFileLoader;

pub async fn execute(
    quiz_path: PathBuf,
    answers_path: PathBuf,
    shuffle: bool,
    seed: Option<u64>,
    output: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let answers: HashMap<String, AnswerValue> = {
        let content = std::fs::read_to_string(&answers_path)
            .with_context(|| format!("failed to read answers file: {}", answers_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse answers JSON: {}", answers_path.display()))?
    };

    // A directory is a paged question bank; a file is a quiz definition.
    let mut engine = if quiz_path.is_dir() {
        let loader = PagedFileLoader::open(&quiz_path)?;
        QuizEngine::with_loader(Arc::new(loader), config.engine_config())?
    } else {
        let quiz = parser::parse_quiz(&quiz_path)?;
        QuizEngine::for_quiz(quiz, config.engine_config())?
    };

    if shuffle {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        engine.shuffle_questions(&mut rng)?;
    }

    engine.start().await?;

    loop {
        let Some(question) = engine.current_question().await? else {
            break;
        };

        let advanced = if question.is_composite() {
            submit_sub_answers(&mut engine, &question, &answers);
            engine.next_question().await
        } else if let Some(value) = answers.get(&question.id) {
            submit(&mut engine, &question.id, value.clone());
            engine.next_question().await
        } else {
            engine.skip_question().await
        };

        match advanced {
            Ok(()) => {}
            Err(QuizError::NavigationBoundary(_)) => break,
            Err(e) => return Err(e.into()),
        }
    }

    engine.end()?;

    let report = AttemptReport::from_engine(&engine);
    print_summary(&report);

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "markdown"]
    } else {
        format.split(',').collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("attempt-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Report saved to: {}", path.display());
            }
            "markdown" => {
                let path = output.join(format!("attempt-{timestamp}.md"));
                std::fs::write(&path, report.to_markdown())?;
                eprintln!("Markdown report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

/// Submit every scripted answer under a composite question, leaves first.
fn submit_sub_answers(
    engine: &mut QuizEngine,
    question: &Question,
    answers: &HashMap<String, AnswerValue>,
) {
    for sub in question.sub_questions() {
        if sub.is_composite() {
            submit_sub_answers(engine, sub, answers);
        } else if let Some(value) = answers.get(&sub.id) {
            submit(engine, &sub.id, value.clone());
        }
    }
}

/// Submit one answer; a rejected submission warns and moves on rather than
/// aborting the whole attempt.
fn submit(engine: &mut QuizEngine, question_id: &str, value: AnswerValue) {
    match engine.submit_answer(question_id, value) {
        Ok(validation) => {
            let verdict = if validation.is_correct {
                "correct"
            } else {
                "incorrect"
            };
            eprintln!("  {question_id}: {verdict} ({:.0}%)", validation.score * 100.0);
        }
        Err(e) => {
            eprintln!("  WARNING: {question_id}: {e}");
        }
    }
}

fn print_summary(report: &AttemptReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Question", "Type", "Result", "Points", "Attempts"]);

    for r in &report.results {
        table.add_row(vec![
            Cell::new(&r.question_id),
            Cell::new(&r.question_type),
            Cell::new(if r.is_correct { "correct" } else { "incorrect" }),
            Cell::new(format!("{:.1}/{:.1}", r.awarded, r.points_possible)),
            Cell::new(r.attempts),
        ]);
    }

    eprintln!("\n{table}");

    let total = report
        .total_points_possible
        .map(|t| format!("{t:.1}"))
        .unwrap_or_else(|| "?".into());
    eprintln!(
        "\nScore: {:.1} / {} ({} answered, {} skipped, {:.1}s)",
        report.score,
        total,
        report.answered,
        report.skipped.len(),
        report.duration_secs
    );
}
