use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use captionfx::manifest::{load_and_validate_manifest, LoadedOverlay};
use captionfx::page::PageRenderer;
use captionfx::schema::TemplateId;
use captionfx::templates::{bottom_bar, resolve_template, story, tiktok, RenderContext};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CAPTIONFX_GIT_HASH"),
    ")"
);

#[derive(Debug, Parser)]
#[command(name = "captionfx")]
#[command(version = VERSION, about = "Word-synchronized caption overlays")]
struct Cli {
    /// Suppress progress output on stderr.
    #[arg(long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a manifest and its captions.
    Check { manifest: PathBuf },
    /// List caption templates.
    Templates,
    /// Print the visual tree of one frame as JSON.
    Frame {
        manifest: PathBuf,
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long, default_value_t = 0)]
        frame: u32,
        #[arg(long)]
        template: Option<String>,
    },
    /// Emit one JSON line per frame of a page.
    Sample {
        manifest: PathBuf,
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long)]
        template: Option<String>,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Report clamped font sizes per page.
    Fit {
        manifest: PathBuf,
        #[arg(long)]
        template: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    debug!(version = VERSION, "captionfx starting");

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { manifest } => run_check(&manifest),
        Commands::Templates => run_templates(),
        Commands::Frame {
            manifest,
            page,
            frame,
            template,
        } => run_frame(&manifest, page, frame, template.as_deref()),
        Commands::Sample {
            manifest,
            page,
            template,
            output,
        } => run_sample(
            &manifest,
            page,
            template.as_deref(),
            output.as_deref(),
            cli.quiet,
        ),
        Commands::Fit { manifest, template } => run_fit(&manifest, template.as_deref()),
    }
}

fn template_for<'a>(overlay: &'a LoadedOverlay, requested: Option<&'a str>) -> &'a str {
    requested.unwrap_or_else(|| overlay.manifest.template.as_str())
}

fn run_check(manifest_path: &Path) -> Result<()> {
    let overlay = load_and_validate_manifest(manifest_path)?;
    let environment = &overlay.manifest.environment;
    let requested = overlay.manifest.template.as_str();
    let resolved = resolve_template(requested);

    println!(
        "OK: {} ({}x{}, {} fps)",
        manifest_path.display(),
        environment.resolution.width,
        environment.resolution.height,
        environment.fps
    );
    if resolved.as_str() == requested {
        println!("Template: {resolved}");
    } else {
        println!("Template: {resolved} (fallback from '{requested}')");
    }
    println!(
        "Pages: {} ({} tokens)",
        overlay.pages.len(),
        overlay.token_count()
    );
    Ok(())
}

fn run_templates() -> Result<()> {
    for id in TemplateId::ALL {
        let marker = if id == TemplateId::DEFAULT {
            " (default)"
        } else {
            ""
        };
        println!("{:<16}{}{}", id.as_str(), id.description(), marker);
    }
    Ok(())
}

fn run_frame(
    manifest_path: &Path,
    page_index: usize,
    frame: u32,
    template: Option<&str>,
) -> Result<()> {
    let overlay = load_and_validate_manifest(manifest_path)?;
    let page = overlay.page(page_index)?;
    let environment = &overlay.manifest.environment;
    let measurer = overlay.measurer()?;
    let context = RenderContext::new(
        environment.resolution.width,
        environment.resolution.height,
        measurer.as_ref(),
    );

    let mut renderer = PageRenderer::new(context, environment.fps);
    let sample = renderer.render_frame(page, template_for(&overlay, template), frame);
    let json = serde_json::to_string_pretty(&sample).context("failed to serialize frame")?;
    println!("{json}");
    Ok(())
}

fn run_sample(
    manifest_path: &Path,
    page_index: usize,
    template: Option<&str>,
    output: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let overlay = load_and_validate_manifest(manifest_path)?;
    let page = overlay.page(page_index)?;
    let environment = &overlay.manifest.environment;
    let measurer = overlay.measurer()?;
    let context = RenderContext::new(
        environment.resolution.width,
        environment.resolution.height,
        measurer.as_ref(),
    );

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("failed to create output {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let template = template_for(&overlay, template);
    let mut renderer = PageRenderer::new(context, environment.fps);
    let total_frames = page.frame_count(environment.fps);
    for frame in 0..total_frames {
        let sample = renderer.render_frame(page, template, frame);
        serde_json::to_writer(&mut writer, &sample).context("failed to serialize frame")?;
        writeln!(writer).context("failed to write frame")?;

        if !quiet && frame % environment.fps == 0 {
            eprintln!("sampled frame {}/{}", frame + 1, total_frames);
        }
    }
    writer.flush().context("failed to flush output")?;

    if let Some(path) = output {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn run_fit(manifest_path: &Path, template: Option<&str>) -> Result<()> {
    let overlay = load_and_validate_manifest(manifest_path)?;
    let environment = &overlay.manifest.environment;
    let measurer = overlay.measurer()?;
    let context = RenderContext::new(
        environment.resolution.width,
        environment.resolution.height,
        measurer.as_ref(),
    );
    let id = resolve_template(template_for(&overlay, template));

    for (index, page) in overlay.pages.iter().enumerate() {
        let sizes = match id {
            TemplateId::Tiktok => vec![("tiktok", tiktok::font_size(&context, page))],
            TemplateId::BottomBar => vec![("bottom_bar", bottom_bar::font_size(&context, page))],
            TemplateId::TiktokStory => vec![("tiktok_story", story::font_size(&context, page))],
            TemplateId::BottomKaraoke => vec![
                ("tiktok", tiktok::font_size(&context, page)),
                ("bottom_bar", bottom_bar::font_size(&context, page)),
            ],
        };
        let listed = sizes
            .iter()
            .map(|(name, size)| format!("{name}={size:.1}px"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("page {index}: {listed} \"{}\"", page.text.trim());
    }
    Ok(())
}
