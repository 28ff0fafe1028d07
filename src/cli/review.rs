use anyhow::Result;
use console::{style, Term};
use std::io;

use crate::pipeline::Pipeline;
use crate::suggest::SuggestedMetadata;
use crate::utils::join_tags;
use crate::ReindexError;

/// Suggestion fields after the operator had a chance to edit them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedMetadata {
    pub title: String,
    pub description: String,

    /// Comma-separated, as typed
    pub tags: String,
}

impl From<&SuggestedMetadata> for EditedMetadata {
    fn from(suggestion: &SuggestedMetadata) -> Self {
        Self {
            title: suggestion.title.clone(),
            description: suggestion.description.clone(),
            tags: join_tags(&suggestion.tags),
        }
    }
}

/// Line input with pre-filled text
pub trait LineEditor {
    fn edit(&mut self, label: &str, initial: &str) -> io::Result<String>;
    fn confirm(&mut self, question: &str) -> io::Result<bool>;

    /// Operator-facing message, kept off stdout
    fn say(&mut self, message: &str) -> io::Result<()>;
}

/// Terminal-backed editor
pub struct TermEditor {
    term: Term,
}

impl TermEditor {
    pub fn stderr() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

impl LineEditor for TermEditor {
    fn edit(&mut self, label: &str, initial: &str) -> io::Result<String> {
        self.term.write_line(&format!("{}", style(label).cyan().bold()))?;
        self.term.read_line_initial_text(initial)
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.term
            .write_str(&format!("{} [y/N] ", style(question).yellow()))?;
        let answer = self.term.read_line()?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        self.term.write_line(message)
    }
}

/// Let the operator edit each suggested field. Answers are taken as typed, so a
/// cleared field stays empty.
pub fn review_suggestion(
    editor: &mut dyn LineEditor,
    suggestion: &SuggestedMetadata,
) -> io::Result<EditedMetadata> {
    let prefilled = EditedMetadata::from(suggestion);

    let title = editor.edit("Suggested New Title:", &prefilled.title)?;
    let description = editor.edit("Suggested New Description:", &prefilled.description)?;
    let tags = editor.edit("Suggested New Tags (comma-separated):", &prefilled.tags)?;

    Ok(EditedMetadata {
        title,
        description,
        tags,
    })
}

/// Whether the operator is asked before and between update attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Confirm first, offer a retry after each failure
    Prompt,
    /// One attempt, no questions
    Unattended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied,
    Skipped,
}

/// Shell command that repeats an update by hand
pub fn apply_command_line(video_id: &str, edited: &EditedMetadata) -> String {
    fn quote(value: &str) -> String {
        format!("'{}'", value.replace('\'', r"'\''"))
    }

    format!(
        "reindexer apply {} --title {} --description {} --tags {}",
        video_id,
        quote(&edited.title),
        quote(&edited.description),
        quote(&edited.tags)
    )
}

/// Write edited metadata to the video.
///
/// A failed update keeps the edits: the error and an equivalent `apply` command are
/// shown, and in prompt mode the operator may retry as often as they like.
pub async fn commit_with_retry(
    pipeline: &Pipeline,
    editor: &mut dyn LineEditor,
    mode: CommitMode,
    video_id: &str,
    edited: &EditedMetadata,
    category_id: Option<&str>,
) -> Result<CommitOutcome> {
    if mode == CommitMode::Prompt && !editor.confirm("Update Video Metadata?")? {
        editor.say("Update skipped.")?;
        return Ok(CommitOutcome::Skipped);
    }

    loop {
        let result = pipeline
            .apply_update(
                video_id,
                &edited.title,
                &edited.description,
                &edited.tags,
                category_id.map(str::to_string),
            )
            .await;

        match result {
            Ok(()) => {
                editor.say(&format!(
                    "{}",
                    style("Video metadata updated successfully!").green()
                ))?;
                return Ok(CommitOutcome::Applied);
            }
            Err(err @ ReindexError::UpdateFailure { .. }) => {
                editor.say(&format!("{}", style(&err).red()))?;
                editor.say(&format!(
                    "To retry later: {}",
                    apply_command_line(video_id, edited)
                ))?;

                if mode == CommitMode::Unattended || !editor.confirm("Retry update?")? {
                    return Err(err.into());
                }
            }
            Err(err) => return Err(err.into()),
        }
    }
}
