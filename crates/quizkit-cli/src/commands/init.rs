//! The `quizkit init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizkit.toml
    if std::path::Path::new("quizkit.toml").exists() {
        println!("quizkit.toml already exists, skipping.");
    } else {
        std::fs::write("quizkit.toml", SAMPLE_CONFIG)?;
        println!("Created quizkit.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.json");
    if example_path.exists() {
        println!("quizzes/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.json");
    }

    // Create example answers
    let answers_path = std::path::Path::new("quizzes/example-answers.json");
    if answers_path.exists() {
        println!("quizzes/example-answers.json already exists, skipping.");
    } else {
        std::fs::write(answers_path, EXAMPLE_ANSWERS)?;
        println!("Created quizzes/example-answers.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizkit.toml to taste");
    println!("  2. Run: quizkit validate --quiz quizzes/example.json");
    println!("  3. Run: quizkit run --quiz quizzes/example.json --answers quizzes/example-answers.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizkit configuration

output_dir = "./quizkit-reports"

[engine]
partial_credit_enabled = false
coordinate_tolerance = 0.0
allow_out_of_order_submission = false
page_window_size = 10
max_composite_depth = 8
"#;

const EXAMPLE_QUIZ: &str = r#"{
  "id": "example",
  "name": "Example Quiz",
  "description": "A small quiz covering a few question types",
  "questions": [
    {
      "id": "capital",
      "text": "What is the capital of France?",
      "type": "MULTI_CHOICE",
      "options": [
        { "id": "a", "value": { "type": "text", "value": "Paris" } },
        { "id": "b", "value": { "type": "text", "value": "Lyon" } },
        { "id": "c", "value": { "type": "text", "value": "Marseille" } }
      ],
      "correct_answer": { "type": "text", "value": "Paris" },
      "metadata": { "difficulty": "easy", "points": 1, "hint": "The city of light." }
    },
    {
      "id": "rivers",
      "text": "Read the passage and answer the questions.",
      "type": "READING_COMPREHENSION",
      "passage": "The Seine flows through Paris toward the English Channel.",
      "subQuestions": [
        {
          "id": "rivers-a",
          "text": "Which river is mentioned?",
          "type": "MULTI_CHOICE",
          "options": [
            { "id": "a", "value": { "type": "text", "value": "Seine" } },
            { "id": "b", "value": { "type": "text", "value": "Loire" } }
          ],
          "correct_answer": { "type": "text", "value": "Seine" }
        },
        {
          "id": "rivers-b",
          "text": "Where does it flow?",
          "type": "DROPDOWN",
          "options": [
            { "id": "a", "value": { "type": "text", "value": "English Channel" } },
            { "id": "b", "value": { "type": "text", "value": "Mediterranean" } }
          ],
          "correct_answer": { "type": "text", "value": "English Channel" }
        }
      ],
      "metadata": { "points": 2 }
    },
    {
      "id": "feedback",
      "text": "Any feedback on this quiz?",
      "type": "OPEN_ENDED",
      "maxLength": 500
    }
  ]
}
"#;

const EXAMPLE_ANSWERS: &str = r#"{
  "capital": { "type": "text", "value": "Paris" },
  "rivers-a": { "type": "text", "value": "Seine" },
  "rivers-b": { "type": "text", "value": "English Channel" },
  "feedback": { "type": "text", "value": "Great quiz!" }
}
"#;
