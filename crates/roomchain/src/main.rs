//! roomchain
//!
//! Generate a chain of non-overlapping rooms from the command line and print
//! it as a character map or as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rc_core::geom::{Dir, Rect, Size};
use rc_core::picker::NodeConfig;
use rc_core::{DEFAULT_ROOM, DEFAULT_TUNNEL, GeneratorConfig, generate};

/// Room-chain arrangement generator
#[derive(Parser, Debug)]
#[command(name = "roomchain")]
#[command(author, version, about = "Lay out a chain of rooms without overlaps", long_about = None)]
struct Args {
    /// Seed string (same seed, same layout)
    #[arg(short = 's', long = "seed")]
    seed: Option<String>,

    /// JSON generator config; the options below override it
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Number of rooms in the chain
    #[arg(short = 'n', long = "rooms")]
    rooms: Option<u32>,

    /// Arrangement used for every room
    #[arg(short = 'k', long = "kind", value_enum)]
    kind: Option<Kind>,

    /// Room size as WIDTHxHEIGHT
    #[arg(long = "room", value_parser = parse_size)]
    room: Option<Size>,

    /// Tunnel size as BREADTHxLENGTH
    #[arg(long = "tunnel", value_parser = parse_size)]
    tunnel: Option<Size>,

    /// Force every exit this way
    #[arg(short = 'd', long = "direction", value_enum)]
    direction: Option<Heading>,

    /// Try exits in fixed clockwise order instead of shuffling
    #[arg(long = "no-shuffle")]
    no_shuffle: bool,

    /// Keep everything inside X,Y,WIDTH,HEIGHT
    #[arg(short = 'b', long = "bounds", value_parser = parse_bounds)]
    bounds: Option<Rect>,

    /// Give up after this many search steps
    #[arg(long = "max-steps")]
    max_steps: Option<u64>,

    /// Print the layout as JSON instead of a map
    #[arg(long = "json")]
    json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Simple,
    Tunnel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Heading {
    North,
    East,
    South,
    West,
}

impl From<Heading> for Dir {
    fn from(heading: Heading) -> Self {
        match heading {
            Heading::North => Dir::North,
            Heading::East => Dir::East,
            Heading::South => Dir::South,
            Heading::West => Dir::West,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = build_config(&args)?;
    debug!(?config, "resolved generator config");

    let layout = generate(&config).with_context(|| format!("generating with seed '{}'", config.seed))?;
    info!(
        rooms = layout.rooms().count(),
        steps = layout.stats.steps,
        pops = layout.stats.pops,
        "done"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
    } else {
        println!("{}", layout.render_ascii());
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_config(args: &Args) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => GeneratorConfig::default(),
    };

    if let Some(seed) = &args.seed {
        config.seed = seed.clone();
    }
    if args.no_shuffle {
        config.shuffle = false;
    }
    if args.bounds.is_some() {
        config.bounds = args.bounds;
    }
    if args.max_steps.is_some() {
        config.queue.max_steps = args.max_steps;
    }

    let shapes_chain = args.rooms.is_some()
        || args.kind.is_some()
        || args.room.is_some()
        || args.tunnel.is_some()
        || args.direction.is_some();
    if shapes_chain {
        config.chain = chain_from_args(args);
    }
    Ok(config)
}

fn chain_from_args(args: &Args) -> NodeConfig {
    let room = args.room.unwrap_or(DEFAULT_ROOM);
    let count = args.rooms.unwrap_or(8);
    let mut chain = match args.kind.unwrap_or(Kind::Simple) {
        Kind::Simple => NodeConfig::simple(room, count),
        Kind::Tunnel => NodeConfig::tunnel(room, args.tunnel.unwrap_or(DEFAULT_TUNNEL), count),
    };
    if let Some(heading) = args.direction {
        chain = chain.toward(heading.into());
    }
    chain
}

fn parse_size(text: &str) -> Result<Size> {
    let Some((width, height)) = text.split_once(['x', 'X']) else {
        bail!("expected WIDTHxHEIGHT, got '{text}'");
    };
    let size = Size::new(width.trim().parse()?, height.trim().parse()?);
    if !size.is_positive() {
        bail!("size must be positive, got '{text}'");
    }
    Ok(size)
}

fn parse_bounds(text: &str) -> Result<Rect> {
    let parts = text
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("expected X,Y,WIDTH,HEIGHT, got '{text}'"))?;
    let [x, y, width, height] = parts[..] else {
        bail!("expected four numbers, got '{text}'");
    };
    Ok(Rect::try_new(x, y, width, height)?)
}
