use crate::config::{Config, load_config};
use crate::engine::Engine;
use crate::input::{build_store, load_mask, load_words};
use crate::render::{render_svg, write_output_svg};
use crate::text_metrics::MeasureSurface;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "cumulus", version, about = "Word cloud renderer in Rust")]
pub struct Args {
    /// Input file (free text or word<TAB>count lines) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width (defaults to 800, or the config file's value)
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height (defaults to 600, or the config file's value)
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// JSON file with exclusion rects reserved before placement
    #[arg(short = 'm', long = "mask")]
    pub mask: Option<PathBuf>,

    /// Seed for the random-placement fallback
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Uniform random placement instead of the center-biased search
    #[arg(long = "random-placement", default_value_t = false)]
    pub random_placement: bool,

    /// Stroke obstacle and placement boxes into the output
    #[arg(long = "debug", default_value_t = false)]
    pub debug: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&args, &mut config);

    let input = read_input(args.input.as_deref())?;
    let pairs = load_words(
        &input,
        config.input.min_word_length,
        config.input.max_words,
    );
    if pairs.is_empty() {
        return Err(anyhow::anyhow!("No words found in input"));
    }

    let mut words = build_store(&pairs);
    words.apply_palette_size(config.theme.palette.len() as u16);
    words.assign_sizes(
        config.engine.sizing,
        config.engine.font_min_size,
        config.engine.font_max_size,
    )?;

    let mut engine = Engine::new(config.engine.clone());
    let mask = match args.mask.as_deref() {
        Some(path) => load_mask(path)?,
        None => Vec::new(),
    };
    engine.seed_obstacles(&mask);

    let placed = match args.output_format {
        OutputFormat::Svg => {
            let mut surface = MeasureSurface::new(config.theme.font_family.clone());
            let placed = engine.run_all(&mut words, &mut surface);
            let debug_rects = config.debug.then(|| {
                let mut rects = mask.clone();
                rects.extend(words.placed().map(|i| {
                    let p = words.placement(i).expect("placed index");
                    crate::engine::Rect::new(p.y + p.height, p.x, p.x + p.width, p.y)
                }));
                rects
            });
            let svg = render_svg(
                &words,
                &config.theme,
                config.engine.width,
                config.engine.height,
                debug_rects.as_deref(),
            );
            write_output_svg(&svg, args.output.as_deref())?;
            placed
        }
        OutputFormat::Png => {
            #[cfg(feature = "png")]
            {
                let output = args
                    .output
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("PNG output requires --output"))?;
                let mut canvas = crate::canvas::PngCanvas::new(
                    config.engine.width as u32,
                    config.engine.height as u32,
                    &config.theme,
                )?;
                let placed = engine.run_all(&mut words, &mut canvas);
                canvas.save_png(output)?;
                placed
            }
            #[cfg(not(feature = "png"))]
            {
                return Err(anyhow::anyhow!(
                    "PNG support not compiled in (enable the 'png' feature)"
                ));
            }
        }
    };

    eprintln!("placed {placed}/{} words", words.len());
    Ok(())
}

/// Flags beat the config file, but only when actually passed.
fn apply_overrides(args: &Args, config: &mut Config) {
    if let Some(v) = args.width {
        config.engine.width = v;
    }
    if let Some(v) = args.height {
        config.engine.height = v;
    }
    if args.seed.is_some() {
        config.engine.seed = args.seed;
    }
    if args.random_placement {
        config.engine.random_placement = true;
    }
    if args.debug {
        config.debug = true;
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() == "-" => read_stdin(),
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => read_stdin(),
    }
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
