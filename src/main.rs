use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use colloquy::io::{read_transcript, write_analysis_json, AnalysisReport};
use colloquy::{
    analyze_transcript, split_transcript, AnalyzerConfig, AnthropicClient, AnthropicConfig,
    Language, SegmenterConfig,
};

#[derive(Parser)]
#[command(name = "colloquy")]
#[command(author, version, about = "Meeting transcript analysis pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a transcript into a structured meeting summary
    Analyze {
        /// Input transcript file (plain text)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the analysis (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for a human-readable report (text)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Target output language (en, he, fr, es, ar)
        #[arg(short, long, default_value = "en")]
        language: Language,

        /// Character length above which chunked processing is used
        #[arg(long, default_value = "15000")]
        threshold: usize,

        /// Target segment size in characters
        #[arg(long, default_value = "7000")]
        segment_size: usize,

        /// Overlap between consecutive segments in characters
        #[arg(long, default_value = "500")]
        overlap: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show how a transcript would be segmented, without any API calls
    Plan {
        /// Input transcript file (plain text)
        #[arg(short, long)]
        input: PathBuf,

        /// Character length above which chunked processing is used
        #[arg(long, default_value = "15000")]
        threshold: usize,

        /// Target segment size in characters
        #[arg(long, default_value = "7000")]
        segment_size: usize,

        /// Overlap between consecutive segments in characters
        #[arg(long, default_value = "500")]
        overlap: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            output,
            report,
            language,
            threshold,
            segment_size,
            overlap,
            verbose,
        } => {
            setup_logging(verbose);
            run_analysis(
                input,
                output,
                report,
                language,
                build_config(threshold, segment_size, overlap),
            )
            .await
        }
        Commands::Plan {
            input,
            threshold,
            segment_size,
            overlap,
            verbose,
        } => {
            setup_logging(verbose);
            plan_segmentation(input, build_config(threshold, segment_size, overlap))
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn build_config(threshold: usize, segment_size: usize, overlap: usize) -> AnalyzerConfig {
    AnalyzerConfig {
        long_transcript_threshold: threshold,
        segmenter: SegmenterConfig {
            max_chars: segment_size,
            overlap_chars: overlap,
        },
        ..Default::default()
    }
}

async fn run_analysis(
    input: PathBuf,
    output: PathBuf,
    report: Option<PathBuf>,
    language: Language,
    config: AnalyzerConfig,
) -> Result<()> {
    info!("Loading transcript from {:?}", input);
    let transcript = read_transcript(&input)?;
    info!("Loaded {} characters", transcript.chars().count());

    let api_config = AnthropicConfig::from_env()?;
    let client = AnthropicClient::new(api_config);

    let result = analyze_transcript(&client, &transcript, language, &config)
        .await
        .context("Transcript analysis failed")?;

    write_analysis_json(&result, &output)?;
    info!("Analysis written to {:?}", output);

    if let Some(report_path) = report {
        AnalysisReport::new(&result).write_file(&report_path)?;
        info!("Report written to {:?}", report_path);
    }

    info!(
        "Complete: {} participants, {} decisions, {} action items{}",
        result.participants.len(),
        result.decisions.len(),
        result.action_items.len(),
        if result.is_condensed { " (condensed)" } else { "" }
    );

    Ok(())
}

fn plan_segmentation(input: PathBuf, config: AnalyzerConfig) -> Result<()> {
    let transcript = read_transcript(&input)?;
    let chars = transcript.trim().chars().count();

    println!("Segmentation Plan");
    println!("=================");
    println!("Transcript length: {} characters", chars);

    if chars == 0 {
        println!("Empty transcript: no analysis would run.");
        return Ok(());
    }

    if chars <= config.long_transcript_threshold {
        println!(
            "At or below the {}-character threshold: single-pass analysis, 1 completion call.",
            config.long_transcript_threshold
        );
        return Ok(());
    }

    let segments = split_transcript(&transcript, &config.segmenter);
    println!(
        "Above the {}-character threshold: chunked analysis.",
        config.long_transcript_threshold
    );
    println!(
        "{} segments + 1 synthesis = {} completion calls minimum",
        segments.len(),
        segments.len() + 1
    );
    println!();

    for segment in &segments {
        let preview: String = segment.text.chars().take(60).collect();
        println!(
            "Segment {:>3}: {:>6} chars | {}...",
            segment.index + 1,
            segment.char_len(),
            preview.replace('\n', " ")
        );
    }

    Ok(())
}
