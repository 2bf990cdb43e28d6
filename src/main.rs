//! cbz2epub - CBZ to EPUB converter

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cbz2epub::{ConvertConfig, Converter, Dimensions, ResizeFilter, default_output_path};

#[derive(Parser)]
#[command(name = "cbz2epub")]
#[command(version, about = "Convert CBZ comic archives to EPUB", long_about = None)]
#[command(after_help = "EXAMPLES:
    cbz2epub comic.cbz                       Convert to comic.epub at 800x800
    cbz2epub comic.cbz out.epub -r 1200      Convert at 1200x1200
    cbz2epub comic.cbz -W 1072 -H 1448       Convert at 1072x1448
    cbz2epub -i comic.epub                   Show package structure")]
struct Cli {
    /// Input file (CBZ, or EPUB with --info)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output EPUB (defaults to INPUT with an .epub extension)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Square page size in pixels
    #[arg(short, long, default_value_t = 800, allow_hyphen_values = true)]
    #[arg(conflicts_with_all = ["width", "height"])]
    resolution: i64,

    /// Page width in pixels
    #[arg(short = 'W', long, requires = "height", allow_hyphen_values = true)]
    width: Option<i64>,

    /// Page height in pixels
    #[arg(short = 'H', long, requires = "width", allow_hyphen_values = true)]
    height: Option<i64>,

    /// JPEG quality (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Resampling filter
    #[arg(long, value_enum, default_value_t = ResizeFilter::Triangle)]
    filter: ResizeFilter,

    /// Package title
    #[arg(long)]
    title: Option<String>,

    /// Package author
    #[arg(long)]
    author: Option<String>,

    /// Deflate level for package entries (0-9, 0 stores uncompressed)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=9))]
    compression_level: Option<u32>,

    /// Show the structure of an EPUB instead of converting
    #[arg(short, long)]
    info: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let result = if cli.info {
        show_info(&cli.input, cli.json)
    } else {
        run_convert(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "error" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_convert(cli: &Cli) -> Result<(), String> {
    let dimensions = match (cli.width, cli.height) {
        (Some(w), Some(h)) => Dimensions::new(w, h),
        _ => Dimensions::square(cli.resolution),
    }
    .map_err(|e| e.to_string())?;

    let mut config = ConvertConfig::new(dimensions).with_filter(cli.filter);
    if let Some(quality) = cli.quality {
        config = config.with_quality(quality);
    }
    if let Some(ref title) = cli.title {
        config = config.with_title(title);
    }
    if let Some(ref author) = cli.author {
        config = config.with_author(author);
    }
    if let Some(level) = cli.compression_level {
        config = config.with_compression_level(level);
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    let report = Converter::new(config)
        .convert(&cli.input, &output)
        .map_err(|e| e.to_string())?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{json}");
    } else if !cli.quiet {
        println!("Conversion complete!");
        println!("Saved as: {}", report.output.display());
        println!("Pages: {}", report.page_count());
    }

    Ok(())
}

fn show_info(path: &Path, json: bool) -> Result<(), String> {
    let summary = cbz2epub::inspect_epub(path).map_err(|e| e.to_string())?;

    if json {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    println!("File: {}", path.display());
    println!("Mimetype: {}", summary.mimetype);
    println!("Package: {}", summary.opf_path);
    println!("Title: {}", summary.opf.title);
    if !summary.opf.creators.is_empty() {
        println!("Authors: {}", summary.opf.creators.join(", "));
    }
    println!("Manifest items: {}", summary.opf.manifest.len());
    println!("Spine: {}", summary.opf.spine.join(", "));
    println!("Entries: {}", summary.entries.len());

    Ok(())
}
