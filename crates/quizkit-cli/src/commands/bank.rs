//! The `quizkit bank` command.

use std::path::PathBuf;

use anyhow::Result;

use quizkit_core::parser;
use quizkit_loaders::paged::write_bank;

pub fn execute(quiz_path: PathBuf, output: PathBuf, page_size: usize) -> Result<()> {
    anyhow::ensure!(page_size >= 1, "page size must be at least 1");

    let quiz = parser::parse_quiz(&quiz_path)?;
    let count = quiz.questions.len();
    write_bank(&output, &quiz.questions, page_size)?;

    let pages = count.div_ceil(page_size);
    println!(
        "Wrote {count} questions to {} ({pages} page(s) of up to {page_size})",
        output.display()
    );
    Ok(())
}
