use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "plumage", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve thumbnails over HTTP under `/thumb/<identifier>`.
    Serve(ServeArgs),
    /// Composite one thumbnail and write it to disk.
    Render(RenderArgs),
    /// Print the slot layout as JSON.
    Layout,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatChoice::Jpeg)]
    format: FormatChoice,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = 95)]
    quality: u8,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:8080")]
    addr: String,

    /// Asset root directory.
    #[arg(long, default_value = "img")]
    assets: PathBuf,

    /// Worker threads (defaults to available parallelism).
    #[arg(long)]
    workers: Option<usize>,

    /// Load all assets before accepting connections; exit if any is missing.
    #[arg(long, default_value_t = false)]
    eager: bool,

    /// Response to malformed identifiers.
    #[arg(long, value_enum, default_value_t = BadIdChoice::Status)]
    on_bad_id: BadIdChoice,

    #[command(flatten)]
    encode: EncodeArgs,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Identifier, one hex digit per slot.
    identifier: String,

    /// Asset root directory.
    #[arg(long, default_value = "img")]
    assets: PathBuf,

    /// Output path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    encode: EncodeArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Jpeg,
    Png,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BadIdChoice {
    Status,
    DefaultImage,
}

impl From<FormatChoice> for plumage::OutputFormat {
    fn from(v: FormatChoice) -> Self {
        match v {
            FormatChoice::Jpeg => plumage::OutputFormat::Jpeg,
            FormatChoice::Png => plumage::OutputFormat::Png,
        }
    }
}

impl From<BadIdChoice> for plumage::BadIdPolicy {
    fn from(v: BadIdChoice) -> Self {
        match v {
            BadIdChoice::Status => plumage::BadIdPolicy::Status,
            BadIdChoice::DefaultImage => plumage::BadIdPolicy::DefaultImage,
        }
    }
}

impl From<&EncodeArgs> for plumage::EncodeOpts {
    fn from(args: &EncodeArgs) -> Self {
        Self {
            format: args.format.into(),
            quality: args.quality,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Render(args) => cmd_render(args),
        Command::Layout => cmd_layout(),
    }
}

fn build_service(
    assets: PathBuf,
    encode: &EncodeArgs,
) -> anyhow::Result<Arc<plumage::ThumbnailService>> {
    let source = Arc::new(plumage::DirSource::new(assets));
    let loader = plumage::AssetLoader::new(source, Arc::new(plumage::Layout::reference()));
    let encoder = plumage::EncodeOpts::from(encode)
        .build()
        .context("configure encoder")?;
    Ok(Arc::new(plumage::ThumbnailService::new(
        Arc::new(loader),
        encoder,
    )))
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let service = build_service(args.assets, &args.encode)?;

    let mut opts = plumage::ServeOpts {
        addr: args.addr,
        eager: args.eager,
        bad_id: args.on_bad_id.into(),
        ..Default::default()
    };
    if let Some(workers) = args.workers {
        opts.workers = workers;
    }

    plumage::serve(service, &opts)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let service = build_service(args.assets, &args.encode)?;
    let img = service
        .thumbnail(&args.identifier)
        .with_context(|| format!("render thumbnail '{}'", args.identifier))?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &img.bytes)
        .with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_layout() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&plumage::Layout::reference())
        .context("serialize layout")?;
    println!("{json}");
    Ok(())
}
