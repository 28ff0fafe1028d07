use anyhow::Result;
use console::style;
use std::fmt::Write;

use crate::cli::OutputFormat;
use crate::pipeline::{PipelineRun, Severity};
use crate::utils::{join_tags, preview};

/// Characters of transcript shown in the report
const TRANSCRIPT_PREVIEW_CHARS: usize = 500;

/// Render a run as a human-readable report
pub fn format_as_text(run: &PipelineRun) -> String {
    let mut out = String::new();

    if let Some(video) = &run.video {
        let _ = writeln!(out, "{} {}", style("Video:").bold(), video.watch_url());
    }

    if let Some(metadata) = &run.metadata {
        let _ = writeln!(out, "\n{}", style("Current Video Data").bold().underlined());
        let _ = writeln!(out, "Title: {}", metadata.title);
        let _ = writeln!(out, "Description: {}", metadata.description);
        let _ = writeln!(out, "Tags: {}", join_tags(&metadata.tags));
    }

    if let Some(transcript) = &run.transcript {
        let _ = writeln!(
            out,
            "\n{}",
            style(format!(
                "Transcript (First {} characters):",
                TRANSCRIPT_PREVIEW_CHARS
            ))
            .bold()
            .underlined()
        );
        let text = preview(transcript.text(), TRANSCRIPT_PREVIEW_CHARS);
        if transcript.is_available() {
            let _ = writeln!(out, "{}", text);
        } else {
            let _ = writeln!(out, "{}", style(text).dim());
        }
    }

    if !run.headlines.is_empty() {
        let _ = writeln!(out, "\n{}", style("News Articles Found").bold().underlined());
        for headline in &run.headlines {
            let _ = writeln!(out, "- {}", headline);
        }
    }

    if !run.relevant_headlines.is_empty() {
        let _ = writeln!(out, "\n{}", style("Trending Topics Detected").bold().underlined());
        for headline in &run.relevant_headlines {
            let _ = writeln!(out, "-> {}", headline);
        }
    }

    if let Some(suggestion) = &run.suggestion {
        let _ = writeln!(out, "\n{}", style("AI-Suggested Metadata").bold().underlined());
        let _ = writeln!(out, "Title: {}", suggestion.title);
        let _ = writeln!(out, "Description: {}", suggestion.description);
        let _ = writeln!(out, "Tags: {}", join_tags(&suggestion.tags));
    }

    let _ = writeln!(out, "\n{}", status_line(run));
    out
}

/// Render a run as pretty JSON
pub fn format_as_json(run: &PipelineRun) -> Result<String> {
    Ok(serde_json::to_string_pretty(run)?)
}

/// Status message styled by severity
pub fn status_line(run: &PipelineRun) -> String {
    let message = run.status.message();
    match run.status.severity() {
        Severity::Success => style(message).green().to_string(),
        Severity::Info => style(message).blue().to_string(),
        Severity::Warning => style(message).yellow().to_string(),
        Severity::Error => style(message).red().bold().to_string(),
    }
}

/// Print a run to stdout
pub fn print_to_console(run: &PipelineRun, format: &OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Text => format_as_text(run),
        OutputFormat::Json => format_as_json(run)?,
    };

    println!("{}", content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::{Transcript, UnavailableReason};
    use crate::extractors::extract_video_id;
    use crate::pipeline::RunStatus;
    use crate::platform::VideoMetadata;

    fn run() -> PipelineRun {
        PipelineRun {
            run_id: uuid::Uuid::new_v4(),
            started_at: chrono::Utc::now(),
            url: "https://youtu.be/abc".to_string(),
            status: RunStatus::NoRelevantNews,
            video: extract_video_id("https://youtu.be/abc"),
            metadata: Some(VideoMetadata {
                title: "Title".to_string(),
                description: "Description".to_string(),
                tags: vec!["one".to_string(), "two".to_string()],
                category_id: None,
            }),
            transcript: Some(Transcript::Available {
                text: "word ".repeat(200),
            }),
            headlines: vec!["First headline".to_string()],
            relevant_headlines: Vec::new(),
            suggestion: None,
        }
    }

    #[test]
    fn test_text_report() {
        console::set_colors_enabled(false);
        let text = format_as_text(&run());

        assert!(text.contains("Video: https://www.youtube.com/watch?v=abc"));
        assert!(text.contains("Tags: one, two"));
        assert!(text.contains("- First headline"));
        assert!(!text.contains("Trending Topics Detected"));
        assert!(text.contains("No trending topics detected for re-indexing."));
        // 200 * "word " is 1000 chars, so the preview is cut
        assert!(text.contains("..."));
    }

    #[test]
    fn test_text_report_without_transcript() {
        console::set_colors_enabled(false);
        let mut run = run();
        run.transcript = Some(Transcript::Unavailable {
            reason: UnavailableReason::NoCaptions,
        });

        let text = format_as_text(&run);
        assert!(text.contains("Transcript not available."));
        assert!(!text.contains("..."));
    }

    #[test]
    fn test_json_report() {
        let json = format_as_json(&run()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "no_relevant_news");
        assert_eq!(value["video"]["id"], "abc");
        assert_eq!(value["video"]["shape"], "short_link");
        assert_eq!(value["transcript"]["status"], "available");
        assert_eq!(value["metadata"]["tags"][1], "two");
        assert!(value["suggestion"].is_null());
    }
}
