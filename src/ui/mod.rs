//! Interactive terminal front-end.
//!
//! A menu-driven loop over the session dispatcher. Every session error is
//! rendered inline and the loop continues; nothing here is fatal to the
//! process except the terminal itself going away.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use console::style;
use dialoguer::{Input, Select};
use indicatif::ProgressBar;

use crate::app::{Panel, Session, chunk_summary, pagination};
use crate::qa::{AnswerResult, QaApi};

const ANSWER_FILE: &str = "answer.txt";

const MENU_ITEMS: [&str; 7] = [
    "Build the vector index",
    "Ask a question",
    "Browse supporting passages",
    "Save answer to answer.txt",
    "Show query history",
    "Show session status",
    "Quit",
];

/// Run the interactive menu loop until the user quits.
pub async fn run<S: QaApi>(session: &mut Session<S>, corpus_dir: &Path) -> Result<()> {
    eprintln!("{}", style("Document Q&A").bold().cyan());
    eprintln!(
        "Corpus directory: {}",
        style(corpus_dir.display()).cyan()
    );

    loop {
        eprintln!();
        render_status(session);
        let choice = Select::new()
            .with_prompt("What would you like to do?")
            .items(&MENU_ITEMS)
            .default(0)
            .interact()?;

        match choice {
            0 => build(session, corpus_dir).await,
            1 => ask(session).await?,
            2 => browse(session)?,
            3 => save(session),
            4 => history(session),
            5 => status(session),
            _ => break,
        }
    }

    Ok(())
}

async fn build<S: QaApi>(session: &mut Session<S>, corpus_dir: &Path) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Creating vector index...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = session.build_from_directory(corpus_dir).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(report) => {
            eprintln!("{}", style("Vector index is ready!").green());
            eprintln!(
                "  {} files, {} pages, {} chunks{}",
                report.files,
                report.pages,
                report.chunks,
                if report.replaced_previous {
                    " (replaced the previous index)"
                } else {
                    ""
                }
            );
        }
        Err(error) => show_error(&error),
    }
}

/// Render the panel chosen by the two readiness gates as a status line.
fn render_status<S: QaApi>(session: &Session<S>) {
    let question_submitted = !session.state().history().is_empty();
    match session.state().panel(question_submitted) {
        Panel::Idle => {
            eprintln!(
                "{}",
                style("Please enter a question to get started.").dim()
            );
        }
        Panel::IndexRequired => {
            eprintln!(
                "{}",
                style("Vector index not initialized. Build it before asking questions.").yellow()
            );
        }
        Panel::Processing => {}
        Panel::Results => {
            if let Some(answer) = session.state().last_answer() {
                eprintln!(
                    "{}",
                    style(format!(
                        "Last answer ready ({} supporting passages).",
                        answer.supporting_chunks.len()
                    ))
                    .dim()
                );
            }
        }
    }
}

async fn ask<S: QaApi>(session: &mut Session<S>) -> Result<()> {
    let question: String = Input::new()
        .with_prompt("What do you want to ask from the documents?")
        .allow_empty(true)
        .interact_text()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Processing your request...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = session.ask(&question).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(answer) => {
            eprintln!(
                "{}",
                style(format!(
                    "Response generated in {:.2} seconds",
                    answer.elapsed.as_secs_f64()
                ))
                .green()
            );
            eprintln!();
            eprintln!("{}", style("Answer:").bold());
            eprintln!("{}", answer.answer_text);
            let supporting = answer.supporting_chunks.len();
            eprintln!();
            eprintln!(
                "{} supporting passage(s) retrieved; use the menu to browse them.",
                supporting
            );
        }
        Err(error) => show_error(&error),
    }
    Ok(())
}

fn browse<S: QaApi>(session: &Session<S>) -> Result<()> {
    let Some(answer) = session.state().last_answer() else {
        eprintln!(
            "{}",
            style("No answer yet. Ask a question first.").yellow()
        );
        return Ok(());
    };

    let chunks = &answer.supporting_chunks;
    if chunks.is_empty() {
        eprintln!("{}", style("No relevant documents found.").yellow());
        return Ok(());
    }

    let pages = pagination::page_count(chunks.len());
    let requested: usize = Input::new()
        .with_prompt(format!("Page number (1-{pages})"))
        .default(1)
        .interact_text()?;
    let page = pagination::clamp_page(requested, chunks.len());

    render_page(answer, page);
    Ok(())
}

fn render_page(answer: &AnswerResult, page: usize) {
    let chunks = &answer.supporting_chunks;
    let offset = (page - 1) * pagination::PAGE_SIZE;
    for (i, chunk) in pagination::page_slice(chunks, page).iter().enumerate() {
        eprintln!();
        eprintln!(
            "{}",
            style(format!(
                "Passage {}: {} (page {})",
                offset + i + 1,
                chunk.source_path.display(),
                chunk.page_number
            ))
            .bold()
        );
        eprintln!("{}", chunk.text);
        eprintln!("{} {}", style("Summary:").bold(), chunk_summary(&chunk.text));
        eprintln!("---");
    }
}

fn save<S: QaApi>(session: &Session<S>) {
    match session.save_answer(Path::new(ANSWER_FILE)) {
        Ok(()) => {
            eprintln!(
                "{}",
                style(format!("Answer saved to {}", ANSWER_FILE)).green()
            );
        }
        Err(error) => show_error(&error),
    }
}

fn history<S: QaApi>(session: &Session<S>) {
    let shown = session.state().displayed_history();
    if shown.is_empty() {
        eprintln!("No questions asked yet.");
        return;
    }
    eprintln!("{}", style("Query history").bold());
    for question in shown {
        eprintln!("  {question}");
    }
    let total = session.state().history().len();
    if total > shown.len() {
        eprintln!("  ({} earlier entries not shown)", total - shown.len());
    }
}

fn status<S: QaApi>(session: &Session<S>) {
    let snapshot = session.metrics();
    eprintln!("{}", style("Session status").bold());
    eprintln!("  Builds completed: {}", snapshot.builds_completed);
    eprintln!("  Chunks indexed: {}", snapshot.chunks_indexed);
    eprintln!("  Questions answered: {}", snapshot.questions_answered);
    match session.state().index() {
        Some(index) => eprintln!(
            "  Current index: {} chunks ({}-dimensional)",
            index.len(),
            index.dimension()
        ),
        None => eprintln!("  Current index: not built"),
    }
}

fn show_error(error: &dyn std::error::Error) {
    eprintln!("{}", style(format!("Error: {error}")).red());
}

/// Resolve the corpus directory: an explicit flag wins over configuration.
pub fn resolve_corpus_dir(flag: Option<PathBuf>, configured: &str) -> PathBuf {
    flag.unwrap_or_else(|| PathBuf::from(configured))
}
