use anyhow::Result;
use clap::{CommandFactory, Parser};
use praisecharts_downloader::input::{classify_input, read_list_file, InputKind};
use praisecharts_downloader::model::RunSummary;
use praisecharts_downloader::render::ImagePdfRenderer;
use praisecharts_downloader::resolve::{ConsoleDecisions, DecisionProvider};
use praisecharts_downloader::source::HttpPageSource;
use praisecharts_downloader::{console, DownloadPipeline, RunConfig, RunStatus};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "praisecharts-downloader")]
#[command(about = "Downloads sheet music previews from PraiseCharts", long_about = None)]
struct Args {
    /// A single URL or a .txt file with one URL per line
    input: Option<String>,

    /// A single URL to download (same as positional)
    #[arg(long = "url")]
    url: Option<String>,

    /// A file containing a list of URLs
    #[arg(long)]
    file: Option<String>,

    /// Output directory for downloads
    #[arg(short = 'o', long, default_value = "charts")]
    outdir: String,

    /// Timeout in seconds for page and image downloads (default: 20)
    #[arg(long, default_value = "20")]
    timeout: u64,

    /// Timeout in seconds for the song page existence check (default: 10)
    #[arg(long, default_value = "10")]
    probe_timeout: u64,

    /// JPEG quality of the pages embedded in PDFs, 1-100 (default: 90)
    #[arg(long, default_value = "90")]
    jpeg_quality: u8,

    /// Enable detailed debug logging
    #[arg(short = 'v', long)]
    debug: bool,
}

fn main() -> Result<ExitCode> {
    let mut args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = RunConfig::new(PathBuf::from(shellexpand::tilde(&args.outdir).as_ref()))
        .with_http_timeout(Duration::from_secs(args.timeout))
        .with_probe_timeout(Duration::from_secs(args.probe_timeout));

    if let Some(raw) = args.input.take() {
        if args.file.is_none() {
            match classify_input(&raw, &config.list_extension) {
                Ok(InputKind::ListFile(path)) => args.file = Some(path.to_string_lossy().into_owned()),
                Ok(InputKind::SongUrl(url)) => {
                    let (chosen, ignored) = prefer_positional(url, args.url.take());
                    if let Some(ignored) = ignored {
                        console::warning(&format!(
                            "Both a positional URL and --url provided; ignoring --url '{}'.",
                            ignored
                        ));
                    }
                    args.url = Some(chosen);
                }
                Err(e) => {
                    console::error(&e.to_string());
                    return Ok(ExitCode::from(2));
                }
            }
        } else if args.url.is_none() {
            args.url = Some(raw);
        } else {
            console::warning(&format!("Both --file and --url provided; ignoring positional input '{}'.", raw));
        }
    }

    let mut decisions = ConsoleDecisions::new();

    if args.file.is_none() && args.url.is_none() {
        console::header("Interactive Mode");
        let answer = decisions.ask("Enter PraiseCharts URL or path to a file with URLs:");
        match classify_input(&answer, &config.list_extension) {
            Ok(InputKind::ListFile(path)) => args.file = Some(path.to_string_lossy().into_owned()),
            Ok(InputKind::SongUrl(url)) => args.url = Some(url),
            Err(e) => {
                console::error(&e.to_string());
                Args::command().print_help()?;
                return Ok(ExitCode::from(2));
            }
        }
    }

    if args.file.is_some() && args.url.is_some() {
        console::warning(
            "Both --file and --url provided. The --file list will be processed; the single URL will be ignored.",
        );
    }

    log::info!("Output directory: {:?}", config.output_root);
    let source = HttpPageSource::new(&config);
    let renderer = ImagePdfRenderer::new().with_quality(args.jpeg_quality);
    let mut pipeline = DownloadPipeline::new(config, source, renderer, decisions);
    let mut summary = RunSummary::new();

    let status = match (args.file, args.url) {
        (Some(file), _) => {
            let path = PathBuf::from(shellexpand::tilde(&file).as_ref());
            let entries = match read_list_file(&path) {
                Ok(entries) => entries,
                Err(e) => {
                    console::error(&format!("{:#}", e));
                    return Ok(ExitCode::from(1));
                }
            };
            pipeline.run_batch(entries, &mut summary)?
        }
        (None, Some(url)) => pipeline.run_single(&url, &mut summary)?,
        (None, None) => RunStatus::Rejected,
    };

    console::print_summary(&summary);

    Ok(match status {
        RunStatus::Completed => ExitCode::SUCCESS,
        RunStatus::Aborted => ExitCode::from(1),
        RunStatus::Rejected => ExitCode::from(2),
    })
}

/// A positional URL wins over `--url`; returns the URL to use and the one dropped
fn prefer_positional(positional: String, flagged: Option<String>) -> (String, Option<String>) {
    let ignored = flagged.filter(|flagged| *flagged != positional);
    (positional, ignored)
}
