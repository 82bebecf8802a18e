use clap::{Parser, Subcommand};
use retouch::config::{self, EditorConfig};
use retouch::imaging::{ExportFormat, ExportRequest, Quality, RustCodec, estimate_encoded_size};
use retouch::presets::FilterCategory;
use retouch::recipe::{self, Recipe};
use retouch::session::EditSession;
use retouch::{logger, output};
use std::path::{Path, PathBuf};
use tracing::info;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        let dirty = if env!("GIT_DIRTY") == "true" { "+dirty" } else { "" };
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}{dirty}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "retouch")]
#[command(about = "Deterministic raster image editor")]
#[command(long_about = "\
Deterministic raster image editor

Applies slider adjustments, preset filters, crop, resize and mosaic
redaction to an image and exports the result. Edits are described by a
TOML recipe; the same recipe on the same input always gives the same bytes.

Recipe steps always run in this order:

  crop → resize → preset → adjustments → mosaic → export

Export formats: png, jpg, webp (lossless), avif, bmp, gif (written as PNG).

Run 'retouch gen-recipe' for a documented example recipe and
'retouch gen-config' for a documented retouch.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Editor config file (stock defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Output container (else recipe, output extension, config)
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Lossy quality 0-100
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    quality: Option<u32>,

    /// Output width; height follows unless given
    #[arg(long)]
    width: Option<u32>,

    /// Output height; width follows unless given
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Decode an image, run a recipe on it and export the result
    Apply {
        input: PathBuf,
        /// Where to write the exported image
        #[arg(long, short)]
        output: PathBuf,
        /// Edit recipe (TOML)
        #[arg(long)]
        recipe: Option<PathBuf>,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Print the heuristic encoded size for given dimensions
    Estimate {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(long, default_value = "webp")]
        format: ExportFormat,
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
        quality: Option<u32>,
    },
    /// List the preset filters
    Filters {
        /// Only show one category (basic, film, bw, color, creative)
        #[arg(long)]
        category: Option<FilterCategory>,
    },
    /// Show dimensions, pixel digest and size estimates for an image
    Inspect {
        input: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock retouch.toml with all options documented
    GenConfig,
    /// Print an example recipe with all steps documented
    GenRecipe,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::init(cli.quiet);
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Apply {
            input,
            output: out_path,
            recipe: recipe_path,
            export,
        } => {
            let recipe = match recipe_path {
                Some(path) => Recipe::load(&path)?,
                None => Recipe::default(),
            };
            run_apply(&config, &input, &out_path, &recipe, &export)?;
        }
        Command::Estimate {
            width,
            height,
            format,
            quality,
        } => {
            let quality = quality.map(Quality::new).unwrap_or(config.export_quality());
            let bytes = estimate_encoded_size(width, height, format, quality);
            println!(
                "{}",
                output::format_estimate(width, height, format, quality, bytes)
            );
        }
        Command::Filters { category } => {
            output::print_filter_catalog(category);
        }
        Command::Inspect { input, json } => {
            let buffer = RustCodec::new().decode_file(&input)?;
            let report = output::inspect_report(&input, &buffer, config.export_quality());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_inspect(&report);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::GenRecipe => {
            print!("{}", recipe::stock_recipe_toml());
        }
    }

    Ok(())
}

fn run_apply(
    config: &EditorConfig,
    input: &Path,
    out_path: &Path,
    recipe: &Recipe,
    args: &ExportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let codec = RustCodec::new();
    let bitmap = codec.decode_file(input)?;
    info!(input = %input.display(), "decoded");

    let mut session = EditSession::with_options(bitmap, config.session_options());
    let (tx, rx) = std::sync::mpsc::channel();
    session.set_event_sink(tx);
    let printer = std::thread::spawn(move || {
        for event in rx {
            println!("{}", output::format_session_event(&event));
        }
    });

    let report = recipe.apply(&mut session, config.filters.intensity)?;

    let format = args
        .format
        .or(recipe.export.format)
        .or_else(|| {
            out_path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(ExportFormat::from_extension)
        })
        .unwrap_or(config.export.format);
    let quality = args
        .quality
        .or(recipe.export.quality)
        .map(Quality::new)
        .unwrap_or(config.export_quality());
    let request = ExportRequest {
        format,
        quality,
        width: args.width.or(recipe.export.width),
        height: args.height.or(recipe.export.height),
    };

    let encoded = session.export(&codec, &request)?;
    std::fs::write(out_path, &encoded.bytes)?;
    let summary = output::format_recipe_report(session.pristine(), &report);

    // Dropping the session closes the event channel.
    drop(session);
    printer
        .join()
        .map_err(|_| "event printer thread panicked")?;

    for line in summary {
        println!("{}", line);
    }
    output::print_export(&encoded, out_path);
    Ok(())
}
