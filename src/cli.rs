// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::Parser;
use mdquiz_core::Question;
use mdquiz_core::TinyRng;
use mdquiz_core::parse_questions;
use mdquiz_core::shuffle;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::prompter::ShufflePrompter;
use crate::quiz::Quiz;
use crate::results::ResultStore;
use crate::source::fetch_document;
use crate::source::question_section;

/// Where the question document lives upstream.
const DEFAULT_QUIZ_URL: &str = "https://raw.githubusercontent.com/Ditectrev/Professional-Scrum-Developer-I-PSD-I-Practice-Tests-Exams-Questions-Answers/master/README.md";

/// Exact text of the first question heading; everything above it is preamble.
const DEFAULT_FIRST_QUESTION: &str = "### When can Product Backlog Refinement occur?";

const DEFAULT_DOCUMENT: &str = "quiz.md";
const DEFAULT_RESULTS: &str = "results.txt";

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Take a quiz session in the terminal.
    Take {
        /// Path to the quiz document. Downloaded on first use.
        #[arg(default_value = DEFAULT_DOCUMENT)]
        document: String,
        /// Re-download the quiz document before parsing.
        #[arg(long)]
        update: bool,
        /// Ask the questions in document order (default: shuffle).
        #[arg(long)]
        ordered: bool,
        /// Number of questions to ask per session. 0 means all of them.
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
        /// URL to download the quiz document from.
        #[arg(long, default_value = DEFAULT_QUIZ_URL)]
        url: String,
        /// Exact line (after trimming) where the first question starts.
        #[arg(long, default_value = DEFAULT_FIRST_QUESTION)]
        first_question: String,
        /// Path to the result file.
        #[arg(long, default_value = DEFAULT_RESULTS)]
        results: String,
        /// Seed for shuffling. Defaults to the current time.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Download the quiz document and exit.
    Fetch {
        /// Path to save the quiz document to.
        #[arg(default_value = DEFAULT_DOCUMENT)]
        document: String,
        /// URL to download the quiz document from.
        #[arg(long, default_value = DEFAULT_QUIZ_URL)]
        url: String,
    },
    /// Parse the quiz document and print a summary.
    Check {
        /// Path to the quiz document.
        #[arg(default_value = DEFAULT_DOCUMENT)]
        document: String,
        /// Exact line (after trimming) where the first question starts.
        #[arg(long, default_value = DEFAULT_FIRST_QUESTION)]
        first_question: String,
    },
    /// Print pass/fail statistics for the current document.
    Stats {
        /// Path to the quiz document.
        #[arg(default_value = DEFAULT_DOCUMENT)]
        document: String,
        /// Exact line (after trimming) where the first question starts.
        #[arg(long, default_value = DEFAULT_FIRST_QUESTION)]
        first_question: String,
        /// Path to the result file.
        #[arg(long, default_value = DEFAULT_RESULTS)]
        results: String,
    },
    /// Export the parsed questions as JSON.
    Export {
        /// Path to the quiz document.
        #[arg(default_value = DEFAULT_DOCUMENT)]
        document: String,
        /// Exact line (after trimming) where the first question starts.
        #[arg(long, default_value = DEFAULT_FIRST_QUESTION)]
        first_question: String,
        /// Optional path to the output file. By default, the output is printed to stdout.
        #[arg(long)]
        output: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Take {
            document,
            update,
            ordered,
            limit,
            url,
            first_question,
            results,
            seed,
        } => {
            take(
                document,
                update,
                ordered,
                limit,
                url,
                first_question,
                results,
                seed,
            )
            .await
        }
        Command::Fetch { document, url } => fetch_document(&url, Path::new(&document)).await,
        Command::Check {
            document,
            first_question,
        } => check(&document, &first_question),
        Command::Stats {
            document,
            first_question,
            results,
        } => stats(&document, &first_question, &results),
        Command::Export {
            document,
            first_question,
            output,
        } => export(&document, &first_question, output),
    }
}

fn load_questions(document: &str, first_question: &str) -> Fallible<Vec<Question>> {
    let text = std::fs::read_to_string(document)?;
    let section = question_section(&text, first_question)?;
    let questions = parse_questions(document, &section)?;
    log::debug!("Read {} questions from {}", questions.len(), document);
    Ok(questions)
}

#[allow(clippy::too_many_arguments)]
async fn take(
    document: String,
    update: bool,
    ordered: bool,
    limit: usize,
    url: String,
    first_question: String,
    results: String,
    seed: Option<u64>,
) -> Fallible<()> {
    let path = PathBuf::from(&document);
    if update || !path.exists() {
        fetch_document(&url, &path).await?;
    }
    let mut questions = load_questions(&document, &first_question)?;

    // The sweep considers the whole document, so mastering one session's
    // sample cannot wipe progress on the rest.
    let mut store = ResultStore::load(&results, &questions)?;

    let seed = match seed {
        Some(seed) => seed,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64,
    };
    let mut rng = TinyRng::from_seed(seed);
    if !ordered {
        shuffle(&mut questions, &mut rng);
    }
    if limit > 0 && questions.len() > limit {
        questions.truncate(limit);
    }

    // The prompter continues the same RNG stream that shuffled the list.
    let mut quiz = Quiz::new(questions, ShufflePrompter::new(rng));
    let score = quiz.run(&mut store)?;

    if score.answered == 0 {
        println!("Nothing to ask: every selected question was already passed.");
    }
    log::info!(
        "Done! You answered {} of {} fresh questions correctly.",
        score.correct,
        score.answered
    );
    log::info!(
        "Final score: {}/{} ({:.2}%)",
        score.correct + score.skipped,
        score.total,
        100.0 * score.fraction()
    );
    Ok(())
}

fn check(document: &str, first_question: &str) -> Fallible<()> {
    let questions = load_questions(document, first_question)?;
    let multi = questions
        .iter()
        .filter(|q| q.correct_positions().len() > 1)
        .count();
    let widest = questions
        .iter()
        .map(|q| q.answers().len())
        .max()
        .unwrap_or(0);
    println!("Parsed {} questions from {}.", questions.len(), document);
    println!("{multi} questions accept more than one answer.");
    println!("The longest option list has {widest} entries.");
    Ok(())
}

fn stats(document: &str, first_question: &str, results: &str) -> Fallible<()> {
    let questions = load_questions(document, first_question)?;
    // Read-only: inspecting results must not trigger the all-passed sweep.
    let store = ResultStore::open(results);
    let passed = questions.iter().filter(|q| store.has_passed(q)).count();
    let total = questions.len();
    println!(
        "Passed {}/{} questions ({:.2}%).",
        passed,
        total,
        100.0 * passed as f64 / total as f64
    );
    println!("{} questions remaining.", total - passed);
    Ok(())
}

fn export(document: &str, first_question: &str, output: Option<String>) -> Fallible<()> {
    let questions = load_questions(document, first_question)?;
    let json = serde_json::to_string_pretty(&questions)
        .map_err(|e| ErrorReport::new(format!("JSON error: {e}")))?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
