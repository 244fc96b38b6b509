//! The `quizkit report` command.

use std::path::PathBuf;

use anyhow::Result;

use quizkit_core::report::AttemptReport;

pub fn execute(report_path: PathBuf, format: String) -> Result<()> {
    let report = AttemptReport::load_json(&report_path)?;

    match format.as_str() {
        "markdown" => {
            println!("{}", report.to_markdown());
        }
        "table" => {
            print_table(&report);
        }
        other => {
            anyhow::bail!("unknown format: {other} (expected table or markdown)");
        }
    }

    Ok(())
}

fn print_table(report: &AttemptReport) {
    use comfy_table::{Cell, Table};

    println!("Attempt {} [{:?}]", report.attempt_id, report.phase);
    if let Some(quiz_id) = &report.quiz_id {
        println!("Quiz: {quiz_id}");
    }

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
    println!("{table}");

    let total = report
        .total_points_possible
        .map(|t| format!("{t:.1}"))
        .unwrap_or_else(|| "?".into());
    println!(
        "Score: {:.1} / {} ({} answered, {} skipped)",
        report.score,
        total,
        report.answered,
        report.skipped.len()
    );
}
