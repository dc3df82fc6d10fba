use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use eml_itinerary::{
    Branding, CommandRenderer, Composer, ComposerConfig, Converter, HtmlRenderer, Renderer,
    Stylesheet, batch, itinerary_from_bytes,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Convert airline booking confirmation emails (.eml) into PDF itineraries
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// An .eml file, or a directory of them with --batch
    input: PathBuf,

    /// Output file, or output directory in batch mode
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Convert every .eml file in the input directory
    #[arg(long)]
    batch: bool,

    /// Descend into subdirectories, mirroring the tree (requires --batch)
    #[arg(short, long, requires = "batch")]
    recursive: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Pdf)]
    format: Format,

    /// HTML-to-PDF program
    #[arg(long, env = "EML2PDF_RENDERER", default_value = "weasyprint")]
    renderer: String,

    /// Renderer argument; `{input}` and `{output}` are substituted. Repeat
    /// for several arguments.
    #[arg(long = "renderer-arg", allow_hyphen_values = true)]
    renderer_args: Vec<String>,

    /// JSON file overriding the company contact block
    #[arg(long)]
    branding: Option<PathBuf>,

    /// CSS file replacing the built-in stylesheet
    #[arg(long)]
    stylesheet: Option<PathBuf>,

    /// Print the extracted itinerary as JSON instead of rendering
    #[arg(long, conflicts_with = "batch")]
    json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Pdf,
    Html,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    if args.json {
        return print_json(&args.input);
    }

    let composer = Composer::new(composer_config(args)?);

    match args.format {
        Format::Html => convert(args, &Converter::new(composer, HtmlRenderer)),
        Format::Pdf => {
            let renderer = if args.renderer_args.is_empty() && args.renderer == "weasyprint" {
                CommandRenderer::weasyprint()
            } else if args.renderer_args.is_empty() {
                CommandRenderer::new(&args.renderer, ["{input}", "{output}"])
            } else {
                CommandRenderer::new(&args.renderer, args.renderer_args.iter().cloned())
            };
            convert(args, &Converter::new(composer, renderer))
        }
    }
}

fn composer_config(args: &Args) -> Result<ComposerConfig> {
    let branding = match &args.branding {
        Some(path) => Branding::from_json_file(path)?,
        None => Branding::default(),
    };
    let stylesheet = match &args.stylesheet {
        Some(path) => Stylesheet::from_file(path)?,
        None => Stylesheet::default(),
    };
    Ok(ComposerConfig {
        branding,
        stylesheet,
    })
}

fn print_json(input: &Path) -> Result<ExitCode> {
    let raw = fs::read(input).with_context(|| format!("read {}", input.display()))?;
    let (itinerary, _) = itinerary_from_bytes(&raw)?;
    println!("{}", serde_json::to_string_pretty(&itinerary)?);
    Ok(ExitCode::SUCCESS)
}

fn convert<R: Renderer>(args: &Args, converter: &Converter<R>) -> Result<ExitCode> {
    let ext = converter.renderer().extension();

    if args.input.is_file() {
        if args.batch {
            bail!("--batch cannot be used with a single file input");
        }
        let destination = args
            .output
            .clone()
            .unwrap_or_else(|| args.input.with_extension(ext));
        let written = converter.convert_file(&args.input, &destination)?;
        println!("Created {}", written.display());
        return Ok(ExitCode::SUCCESS);
    }

    if !args.input.is_dir() {
        bail!(
            "input must be an .eml file or a directory: {}",
            args.input.display()
        );
    }
    if !args.batch {
        bail!(
            "{} is a directory; use --batch to convert every .eml file in it",
            args.input.display()
        );
    }

    let (inputs, output_dir) = if args.recursive {
        let output_dir = args
            .output
            .clone()
            .unwrap_or_else(|| batch::default_recursive_output(&args.input));
        let inputs = batch::mirror_tree(&args.input, &output_dir)
            .with_context(|| format!("mirror into {}", output_dir.display()))?;
        (inputs, output_dir)
    } else {
        let output_dir = args
            .output
            .clone()
            .unwrap_or_else(|| batch::default_batch_output(&args.input));
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("create {}", output_dir.display()))?;
        let inputs = batch::list_eml_files(&args.input)
            .with_context(|| format!("read {}", args.input.display()))?;
        (inputs, output_dir)
    };

    if inputs.is_empty() {
        println!("No .eml files found in {}", args.input.display());
        return Ok(ExitCode::FAILURE);
    }
    info!("Found {} .eml files", inputs.len());

    let report = converter.convert_batch(inputs, |input| {
        batch::destination_for(&args.input, &output_dir, input, ext)
    });

    println!(
        "Converted {} of {} files into {}",
        report.converted.len(),
        report.total(),
        output_dir.display()
    );
    for failure in &report.failed {
        println!("Failed: {failure}");
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
