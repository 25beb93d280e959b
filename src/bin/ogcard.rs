use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ogcard::{Deadline, RenderConfig, RenderRequest, Renderer, Variant, select_geometry};

#[derive(Parser, Debug)]
#[command(name = "ogcard", version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a card from command-line fields.
    Render(RenderArgs),
    /// Render a card from a request JSON file.
    Request(RequestArgs),
    /// Print the layout geometry of a variant as JSON.
    Geometry(GeometryArgs),
}

#[derive(Parser, Debug)]
struct OutputArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Render config JSON (theme, brand, fetch limits, fonts dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Budget for fetching the source image; defaults to the config's fetch timeout.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Allow `file://` source images.
    #[arg(long)]
    allow_file_urls: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[arg(long)]
    title: String,

    /// Body text; `- ` starts a bullet line, `**...**` makes a line bold.
    #[arg(long, conflicts_with = "content_file", required_unless_present = "content_file")]
    content: Option<String>,

    /// Read the body text from a file.
    #[arg(long)]
    content_file: Option<PathBuf>,

    /// Source image URI (http or https; file with --allow-file-urls).
    #[arg(long)]
    image: Option<String>,

    #[arg(long, default_value = "Default")]
    variant: String,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct RequestArgs {
    /// Request JSON: {"title", "content", "sourceImage"?, "variant"?}.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct GeometryArgs {
    #[arg(long)]
    variant: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Request(args) => cmd_request(args),
        Command::Geometry(args) => cmd_geometry(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "ogcard=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let content = match (args.content, &args.content_file) {
        (Some(c), _) => c,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("read content file '{}'", path.display()))?,
        (None, None) => anyhow::bail!("either --content or --content-file is required"),
    };
    let variant: Variant = args.variant.parse()?;
    let req = RenderRequest::new(args.title, content, args.image.as_deref(), variant)?;
    render_to_file(&req, &args.output)
}

fn cmd_request(args: RequestArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read request '{}'", args.in_path.display()))?;
    let req = RenderRequest::from_json_str(&json)?;
    render_to_file(&req, &args.output)
}

fn cmd_geometry(args: GeometryArgs) -> anyhow::Result<()> {
    let variant: Variant = args.variant.parse()?;
    let json = serde_json::to_string_pretty(&select_geometry(variant))?;
    println!("{json}");
    Ok(())
}

fn render_to_file(req: &RenderRequest, output: &OutputArgs) -> anyhow::Result<()> {
    let mut config = match &output.config {
        Some(path) => RenderConfig::from_path(path)?,
        None => RenderConfig::default(),
    };
    config.fetch.allow_file_urls |= output.allow_file_urls;
    let budget = Duration::from_millis(output.timeout_ms.unwrap_or(config.fetch.timeout_ms));
    let renderer = Renderer::new(config)?;

    let result = renderer.render_until(req, &Deadline::after(budget))?;
    write_output(&output.out, &result.bytes)?;

    eprintln!("wrote {}", output.out.display());
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))
}
