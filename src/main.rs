use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use roadtruth::evaluation::display_metric;
use roadtruth::{Area, Config, Evaluator, Georeference, Track};

#[derive(Parser)]
#[command(name = "roadtruth")]
#[command(about = "Evaluate road detections against delineated ground truth")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GeoArgs {
    /// Canvas origin X coordinate (millimeters)
    #[arg(long, allow_hyphen_values = true)]
    origin_x: i64,

    /// Canvas origin Y coordinate (millimeters)
    #[arg(long, allow_hyphen_values = true)]
    origin_y: i64,

    /// Pixel to millimeter ratio (defaults to the configured scale)
    #[arg(long)]
    scale: Option<i64>,
}

#[derive(Subcommand)]
enum Command {
    /// Compare a sector's detection map with its road set
    Evaluate {
        /// Sector name used to resolve input and output files
        #[arg(value_name = "SECTOR")]
        sector: String,

        /// Canvas width in pixels
        #[arg(long)]
        width: u32,

        /// Canvas height in pixels
        #[arg(long)]
        height: u32,

        #[command(flatten)]
        geo: GeoArgs,

        /// Stroke width of the buffered ground truth
        #[arg(long)]
        tolerance: Option<u32>,

        /// Also write the discarded-area mask
        #[arg(long)]
        mask: bool,

        /// Data root directory (overrides the configuration)
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,

        /// Detection map (defaults to the sector's detection file)
        #[arg(long, value_name = "IMAGE")]
        detection: Option<PathBuf>,
    },

    /// Print a summary of a track file
    Track {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        geo: GeoArgs,
    },

    /// Print the rectangles of an area file
    Area {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        geo: GeoArgs,
    },
}

fn georeference(geo: &GeoArgs, config: &Config) -> anyhow::Result<Georeference> {
    let scale = geo.scale.unwrap_or(config.evaluation.scale);
    Ok(Georeference::new(geo.origin_x, geo.origin_y, scale)?)
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match args.command {
        Command::Evaluate {
            sector,
            width,
            height,
            geo,
            tolerance,
            mask,
            data_dir,
            detection,
        } => {
            if let Some(dir) = data_dir {
                config.data.root = dir;
            }
            if let Some(tolerance) = tolerance {
                config.evaluation.tolerance_width = tolerance;
            }
            let georef = georeference(&geo, &config)?;
            let layout = config.data.clone();

            log::debug!("Evaluating sector {} ({}x{})", sector, width, height);
            let mut evaluator = Evaluator::from_config(&config).with_diagnostics(true);
            evaluator.configure(width, height, georef);
            evaluator.set_sector_name(&sector);

            let detection = detection.unwrap_or_else(|| layout.detection_map(&sector));
            evaluator.load_detection_map(&detection)?;
            let loaded = evaluator.load_road_set(layout.road_set(&sector))?;
            log::info!("{} ground truth tracks loaded", loaded);
            evaluator.load_discarded_areas(layout.discarded_areas(&sector))?;

            let scores = evaluator.evaluate(mask || config.evaluation.write_mask)?;
            println!("{}", scores);
        }

        Command::Track { file, geo } => {
            let georef = georeference(&geo, &config)?;
            let track = Track::from_file(&file, &georef)?;
            println!("Track {}", file.display());
            println!("  points: {}", track.points().len());
            println!("  cuts:   {}", track.cuts().len());
            println!("  width:  {}", track.width());
            println!("  length: {}", display_metric(Some(track.length())));
        }

        Command::Area { file, geo } => {
            let georef = georeference(&geo, &config)?;
            let area = Area::from_file(&file, &georef)?;
            println!("Area {} ({} rectangles)", file.display(), area.rectangles().len());
            for (i, rect) in area.rectangles().iter().enumerate() {
                let (min, max) = rect.normalized();
                println!("  {}: ({}, {}) - ({}, {})", i + 1, min.x, min.y, max.x, max.y);
            }
        }
    }

    Ok(())
}
