//! Review command handlers

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::warn;

use vocab_core::{notes_to_text, Category, Entry, ReviewSession, SessionState, Store};

use crate::editor::{confirm, prompt};
use crate::output::{print_json, Output, OutputFormat};
use crate::speech::Speaker;

/// Typed instead of an answer to end the session early
const QUIT: &str = ":q";

/// List the words due now
pub fn due(
    store: &Store,
    language: String,
    category: Option<Category>,
    output: &Output,
) -> Result<()> {
    let now = Utc::now();
    let entries = store.due(&language, category, now)?;

    if entries.is_empty() && output.format == OutputFormat::Human {
        println!("Nothing due for {}.", language);
        return Ok(());
    }
    output.print_entries(&entries, now);
    Ok(())
}

/// Run an interactive learning session
pub fn review(
    store: &mut Store,
    language: String,
    category: Option<Category>,
    speaker: &dyn Speaker,
    output: &Output,
) -> Result<()> {
    let mut session = ReviewSession::new(store, rand::rng());
    session
        .start(&language, category)
        .context("Failed to start review")?;

    if speaker.is_ready() {
        output.message("Speech enabled.");
    }
    output.message(&format!("Type the {} translation, or {} to stop.", language, QUIT));

    while let Some(entry) = session.state().entry().cloned() {
        println!();
        println!("{} ({})", entry.english_word, entry.category);

        let answer = match prompt(&language)? {
            Some(answer) if answer.trim() != QUIT => answer,
            _ => break,
        };

        let correct = session.submit_answer(&answer)?;
        show_feedback(&entry, correct);
        say(speaker, &entry);

        let correct_override = if !correct && confirm("I got this right")? {
            Some(true)
        } else {
            None
        };
        session
            .confirm(correct_override)
            .context("Failed to record review")?;
    }

    let summary = session.summary();
    let complete = matches!(session.state(), SessionState::Complete);

    match output.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "reviewed": summary.reviewed,
            "correct": summary.correct,
            "complete": complete,
        })),
        OutputFormat::Human => {
            println!();
            if complete {
                println!("Learning complete!");
            } else {
                println!("Session stopped.");
            }
            println!("{} of {} correct", summary.correct, summary.reviewed);
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

fn show_feedback(entry: &Entry, correct: bool) {
    if correct {
        println!("✓ Correct: {}", entry.single_translation);
    } else {
        println!("✗ Incorrect. The answer is: {}", entry.single_translation);
    }

    let notes = notes_to_text(&entry.long_translation);
    if !notes.is_empty() {
        println!("{}", notes);
    }
}

fn say(speaker: &dyn Speaker, entry: &Entry) {
    if !speaker.is_ready() {
        return;
    }
    if let Err(e) = speaker.speak(&entry.single_translation, &entry.learning_language) {
        warn!("Speech failed: {:#}", e);
    }
}
