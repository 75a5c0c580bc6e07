use std::{path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framegrid::{
    CatalogOptions, CatalogProcessor, FfmpegLogLevel, FrameSampler, FrameSource,
    OutputEncoding, ProgressCallback, ProgressInfo, SamplerOptions, SamplingPlan, VideoFile,
    configuration::{
        DEFAULT_COLUMNS, DEFAULT_HEAD_TAIL_PERCENT, DEFAULT_JPEG_QUALITY, DEFAULT_PREVIEW_SUFFIX,
        DEFAULT_SAMPLE_COUNT, DEFAULT_SCALE_FACTOR,
    },
    preview_path,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framegrid process input_data.xlsx output_data.json --progress\n  framegrid process videos.csv out.json --samples 12 --columns 3 --timeout 60\n  framegrid sheet holiday.mp4 --out holiday_preview.jpg\n  framegrid plan 100 --samples 16\n  framegrid completions zsh > _framegrid";

#[derive(Debug, Parser)]
#[command(
    name = "framegrid",
    version,
    about = "Build contact-sheet thumbnail grids for the videos of a catalog",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Log debug output (RUST_LOG overrides).
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while processing a catalog.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Parser, Clone)]
struct SheetOptions {
    /// Frames sampled from each video.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_COUNT)]
    samples: usize,

    /// Requested grid columns.
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    columns: usize,

    /// Scale applied to both frame dimensions.
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
    scale: f64,

    /// Percentage of frames skipped at each end.
    #[arg(long, default_value_t = DEFAULT_HEAD_TAIL_PERCENT)]
    trim_percent: u64,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    quality: u8,
}

impl SheetOptions {
    fn sampler(&self) -> SamplerOptions {
        SamplerOptions::new()
            .with_scale_factor(self.scale)
            .with_head_tail_percent(self.trim_percent)
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build a contact sheet for every video of a catalog.
    #[command(
        about = "Process a video catalog",
        after_help = "Examples:\n  framegrid process input_data.xlsx output_data.json\n  framegrid process videos.csv out.json --timeout 120"
    )]
    Process {
        /// Catalog with a `filepath` column (.csv, .xlsx, .xls, .ods).
        input: PathBuf,
        /// JSON file receiving the catalog entries.
        output: PathBuf,
        #[command(flatten)]
        sheet: SheetOptions,
        /// Skip a video that takes longer than this many seconds.
        #[arg(long)]
        timeout: Option<u64>,
        /// Write the entry list as a JSON string holding the JSON text.
        #[arg(long)]
        legacy_double_encoding: bool,
    },

    /// Build the contact sheet of a single video.
    #[command(
        about = "Build one contact sheet",
        after_help = "Examples:\n  framegrid sheet input.mp4\n  framegrid sheet input.mp4 --out grid.jpg --samples 9 --columns 3"
    )]
    Sheet {
        /// Input video path.
        input: PathBuf,
        /// Output JPEG path (defaults to `<stem>_preview.jpg` next to the video).
        #[arg(long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        sheet: SheetOptions,
    },

    /// Print the frame indices that would be sampled.
    #[command(
        about = "Show a sampling plan",
        after_help = "Examples:\n  framegrid plan 100\n  framegrid plan 2400 --samples 9 --trim-percent 10 --json"
    )]
    Plan {
        /// Total frame count of the video.
        total: u64,
        #[arg(long, default_value_t = DEFAULT_SAMPLE_COUNT)]
        samples: usize,
        #[arg(long, default_value_t = DEFAULT_HEAD_TAIL_PERCENT)]
        trim_percent: u64,
        #[arg(long, default_value_t = DEFAULT_COLUMNS)]
        columns: usize,
        /// Output the plan as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(global.verbose);

    if let Some(level) = &global.log_level {
        let parsed = FfmpegLogLevel::from_str(level)
            .map_err(|_| format!("unsupported --log-level: {level}"))?;
        framegrid::set_ffmpeg_log_level(parsed);
    }

    Ok(())
}

struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        if let Some(path) = &info.current_path {
            self.bar.set_message(path.display().to_string());
        }
        if info.total == Some(info.current) {
            self.bar.finish_and_clear();
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Process {
            input,
            output,
            sheet,
            timeout,
            legacy_double_encoding,
        } => {
            let encoding = if legacy_double_encoding {
                OutputEncoding::DoubleEncoded
            } else {
                OutputEncoding::Document
            };

            let mut options = CatalogOptions::new()
                .with_sample_count(sheet.samples)
                .with_columns(sheet.columns)
                .with_sampler(sheet.sampler())
                .with_jpeg_quality(sheet.quality)
                .with_output_encoding(encoding);
            if let Some(seconds) = timeout {
                options = options.with_timeout(Duration::from_secs(seconds));
            }
            if cli.global.progress {
                options = options.with_progress(Arc::new(BarProgress::new()?));
            }

            let report = CatalogProcessor::new(options).process(&input, &output)?;

            for (path, error) in report.failures() {
                eprintln!(
                    "{} {}",
                    "skipped:".yellow().bold(),
                    format!("{}: {error}", path.display()).yellow()
                );
            }
            println!(
                "{} {} contact sheets, {} skipped -> {}",
                "done:".green().bold(),
                report.processed(),
                report.skipped(),
                output.display()
            );
        }
        Commands::Sheet { input, out, sheet } => {
            let frames = FrameSampler::new(sheet.sampler()).sample(&input, sheet.samples)?;
            let contact_sheet = framegrid::resolve(&frames, sheet.columns)?;

            let out = out.unwrap_or_else(|| preview_path(&input, DEFAULT_PREVIEW_SUFFIX));
            contact_sheet.save_jpeg(&out, sheet.quality)?;

            let layout = contact_sheet.layout();
            if layout.is_fallback() {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!(
                        "{} columns requested, used {}",
                        layout.requested_columns(),
                        layout.columns()
                    )
                    .yellow()
                );
            }
            println!(
                "{} {}x{} grid -> {}",
                "done:".green().bold(),
                layout.columns(),
                layout.rows(),
                out.display()
            );

            if cli.global.verbose {
                let video = VideoFile::open(&input)?;
                let metadata = video.metadata();
                println!(
                    "{} {}x{}, {} frames at {:.3} fps ({})",
                    "source:".cyan().bold(),
                    metadata.width,
                    metadata.height,
                    video.frame_count(),
                    metadata.frames_per_second,
                    metadata.codec
                );
            }
        }
        Commands::Plan {
            total,
            samples,
            trim_percent,
            columns,
            json,
        } => {
            let trim_percent = SamplerOptions::new()
                .with_head_tail_percent(trim_percent)
                .head_tail_percent();
            let plan = SamplingPlan::new(total, samples, trim_percent)?;
            let layout = framegrid::resolve_layout(plan.positions().len(), columns)?;

            if json {
                let payload = json!({
                    "total": plan.total(),
                    "offset": plan.offset(),
                    "usable": plan.usable(),
                    "step": plan.step(),
                    "positions": plan.positions(),
                    "columns": layout.columns(),
                    "rows": layout.rows(),
                    "dropped": layout.dropped(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "offset {}, usable {}, step {}",
                    plan.offset(),
                    plan.usable(),
                    plan.step()
                );
                println!("positions: {}", format_positions(plan.positions()));
                println!(
                    "grid: {} columns x {} rows{}",
                    layout.columns(),
                    layout.rows(),
                    if layout.dropped() > 0 {
                        format!(" ({} dropped)", layout.dropped())
                    } else {
                        String::new()
                    }
                );
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framegrid", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn format_positions(positions: &[u64]) -> String {
    positions
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands, format_positions};

    #[test]
    fn process_flags_parse() {
        let cli = Cli::try_parse_from([
            "framegrid",
            "process",
            "in.csv",
            "out.json",
            "--samples",
            "12",
            "--columns",
            "3",
            "--timeout",
            "30",
            "--legacy-double-encoding",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.global.verbose);
        match cli.command {
            Commands::Process {
                sheet,
                timeout,
                legacy_double_encoding,
                ..
            } => {
                assert_eq!(sheet.samples, 12);
                assert_eq!(sheet.columns, 3);
                assert_eq!(sheet.scale, 0.7);
                assert_eq!(timeout, Some(30));
                assert!(legacy_double_encoding);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn plan_defaults() {
        let cli = Cli::try_parse_from(["framegrid", "plan", "100"]).unwrap();
        match cli.command {
            Commands::Plan {
                total,
                samples,
                trim_percent,
                columns,
                json,
            } => {
                assert_eq!((total, samples, trim_percent, columns), (100, 16, 5, 4));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn positions_are_space_separated() {
        assert_eq!(format_positions(&[5, 11, 17]), "5 11 17");
        assert_eq!(format_positions(&[]), "");
    }
}
