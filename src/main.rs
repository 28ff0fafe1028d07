use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trend_reindexer::cli::review::{
    commit_with_retry, review_suggestion, CommitMode, EditedMetadata, TermEditor,
};
use trend_reindexer::cli::{Cli, Commands, OutputFormat};
use trend_reindexer::pipeline::progress::StageReporter;
use trend_reindexer::pipeline::Severity;
use trend_reindexer::{
    extract_video_id, output, Config, Pipeline, PipelineClients, ReindexError, RunStatus,
    VideoReference,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "trend_reindexer=debug,reindexer=debug"
    } else {
        "trend_reindexer=warn,reindexer=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run {
            url,
            format,
            no_apply,
            yes,
        } => {
            let config = Config::load().await?;
            let show_progress = !cli.quiet && format == OutputFormat::Text;
            run_command(config, &url, &format, show_progress, no_apply, yes).await?;
        }
        Commands::Apply {
            video,
            title,
            description,
            tags,
        } => {
            let config = Config::load().await?;
            apply_command(config, &video, &title, &description, &tags, !cli.quiet).await?;
        }
        Commands::Extract { url } => match extract_video_id(&url) {
            Some(reference) => println!("{}", reference.id),
            None => return Err(ReindexError::InvalidUrl(url).into()),
        },
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                println!("Configuration file: {}", Config::config_path()?.display());
                println!("Use --show to print the current values.");
            }
        }
    }

    Ok(())
}

fn reporter(show_progress: bool) -> StageReporter {
    if show_progress {
        StageReporter::spinners()
    } else {
        StageReporter::hidden()
    }
}

async fn run_command(
    config: Config,
    url: &str,
    format: &OutputFormat,
    show_progress: bool,
    no_apply: bool,
    yes: bool,
) -> Result<()> {
    let clients = PipelineClients::from_config(&config)?;
    let pipeline =
        Pipeline::new(clients, config.pipeline.clone()).with_reporter(reporter(show_progress));

    tracing::info!("Starting pipeline for URL: {}", url);
    let run = pipeline.run(url).await.context("Pipeline run failed")?;

    output::print_to_console(&run, format)?;

    if run.status != RunStatus::Completed {
        if run.status.severity() == Severity::Error {
            if let Some(err) = run.error() {
                return Err(err.into());
            }
        }
        return Ok(());
    }

    let (Some(video), Some(suggestion)) = (&run.video, &run.suggestion) else {
        return Ok(());
    };
    if no_apply {
        return Ok(());
    }

    let mut editor = TermEditor::stderr();
    let (edited, mode) = if yes {
        (EditedMetadata::from(suggestion), CommitMode::Unattended)
    } else {
        if !editor.is_interactive() {
            tracing::info!("Not attached to a terminal; skipping metadata update");
            return Ok(());
        }
        (
            review_suggestion(&mut editor, suggestion)?,
            CommitMode::Prompt,
        )
    };

    let category_id = run
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.category_id.as_deref());

    commit_with_retry(&pipeline, &mut editor, mode, &video.id, &edited, category_id).await?;
    Ok(())
}

async fn apply_command(
    config: Config,
    video: &str,
    title: &str,
    description: &str,
    tags: &str,
    show_progress: bool,
) -> Result<()> {
    let reference = VideoReference::from_input(video)
        .ok_or_else(|| ReindexError::InvalidUrl(video.to_string()))?;

    let clients = PipelineClients::from_config(&config)?;

    // The update must echo the current category back
    let current = clients
        .platform
        .fetch_metadata(&reference.id)
        .await?
        .ok_or_else(|| ReindexError::MetadataNotFound(reference.id.clone()))?;

    let pipeline =
        Pipeline::new(clients, config.pipeline.clone()).with_reporter(reporter(show_progress));
    let edited = EditedMetadata {
        title: title.to_string(),
        description: description.to_string(),
        tags: tags.to_string(),
    };
    commit_with_retry(
        &pipeline,
        &mut TermEditor::stderr(),
        CommitMode::Unattended,
        &reference.id,
        &edited,
        current.category_id.as_deref(),
    )
    .await?;
    Ok(())
}
