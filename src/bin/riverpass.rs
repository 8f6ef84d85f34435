//! Command line tool for resampling river discharge onto satellite overpass
//! times.
//!
//! Three subcommands cover the pipeline:
//! - `overlay`: intersect reach and swath shapefiles into an overlay table
//! - `resample`: extend an overlay table across repeat cycles and join model
//!   discharge
//! - `run`: both stages in one pass

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;

use riverpass::core::{
    count_overlays_per_reach, cycles_to_cover, extend_cycles, match_and_join, IndexSide,
    OverlayEngine, OverlayOptions, OverlayPredicate, SWOT_CYCLE_SECONDS,
};
use riverpass::io::{
    read_overlay_csv, write_overlay_counts_csv, write_overlay_csv, write_resampled_csv,
    DischargeReader, ReachReader, SwathReader, DEFAULT_MODEL_DT_SECONDS,
};
use riverpass::types::{ModelSeries, OverlayRecord, PassError};

/// Exit code for unreadable or malformed inputs, matching the convention of
/// the RRR toolchain this tool interoperates with.
const EXIT_BAD_INPUT: i32 = 22;

fn parse_predicate(s: &str) -> Result<OverlayPredicate, String> {
    s.parse()
}

fn parse_index_side(s: &str) -> Result<IndexSide, String> {
    s.parse()
}

/// Resample river discharge onto satellite overpass times
#[derive(Parser, Debug)]
#[command(name = "riverpass")]
#[command(about = "Overlay river reaches with satellite swaths and resample discharge")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the reach/swath overlay table
    Overlay(OverlayArgs),
    /// Extend an overlay table across repeat cycles and join discharge
    Resample(ResampleArgs),
    /// Overlay and resample in one pass
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct OverlayArgs {
    /// River reach polyline shapefile (COMID or ARCID attribute)
    #[arg(long)]
    reaches: PathBuf,

    /// Swath footprint polygon shapefile (Mean_time attribute)
    #[arg(long)]
    swaths: PathBuf,

    /// Output overlay CSV
    #[arg(long)]
    output: PathBuf,

    #[command(flatten)]
    overlay: OverlayFlags,

    /// Also write per-reach overlay counts to this CSV
    #[arg(long)]
    counts: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ResampleArgs {
    /// Overlay CSV produced by the overlay subcommand
    #[arg(long)]
    overlay: PathBuf,

    /// Model discharge output (RAPID NetCDF or reach/time/discharge CSV)
    #[arg(long)]
    discharge: PathBuf,

    /// Output resampled CSV
    #[arg(long)]
    output: PathBuf,

    #[command(flatten)]
    timing: TimingFlags,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// River reach polyline shapefile (COMID or ARCID attribute)
    #[arg(long)]
    reaches: PathBuf,

    /// Swath footprint polygon shapefile (Mean_time attribute)
    #[arg(long)]
    swaths: PathBuf,

    /// Model discharge output (RAPID NetCDF or reach/time/discharge CSV)
    #[arg(long)]
    discharge: PathBuf,

    /// Output resampled CSV
    #[arg(long)]
    output: PathBuf,

    #[command(flatten)]
    overlay: OverlayFlags,

    #[command(flatten)]
    timing: TimingFlags,

    /// Also write the intermediate overlay table to this CSV
    #[arg(long)]
    overlay_csv: Option<PathBuf>,

    /// Also write per-reach overlay counts to this CSV
    #[arg(long)]
    counts: Option<PathBuf>,
}

/// Overlay options shared by the overlay and run subcommands
#[derive(Args, Debug, Clone)]
struct OverlayFlags {
    /// Geometric test pairing a swath with a reach
    #[arg(long, default_value = "contains", value_parser = parse_predicate)]
    predicate: OverlayPredicate,

    /// Feature collection to build the spatial index over
    #[arg(long, default_value = "reaches", value_parser = parse_index_side)]
    index_side: IndexSide,

    /// Skip pairs at equal positions, for running a file against itself
    #[arg(long)]
    exclude_self: bool,
}

/// Cycle and model timing shared by the resample and run subcommands
#[derive(Args, Debug, Clone)]
struct TimingFlags {
    /// Orbit repeat cycle in seconds
    #[arg(long, default_value_t = SWOT_CYCLE_SECONDS)]
    cycle_period: f64,

    /// Number of cycles to replicate; derived from the model time span when
    /// omitted
    #[arg(long)]
    cycle_count: Option<usize>,

    /// Model time step in seconds, used for NetCDF discharge input
    #[arg(long, default_value_t = DEFAULT_MODEL_DT_SECONDS)]
    model_dt: f64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("ERROR - {err:#}");
        process::exit(exit_code(&err));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<PassError>() {
        Some(PassError::Processing(_)) | None => 1,
        Some(_) => EXIT_BAD_INPUT,
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Overlay(args) => cmd_overlay(args),
        Command::Resample(args) => cmd_resample(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn require_file(path: &Path) -> Result<(), PassError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PassError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Unable to open {}", path.display()),
        )))
    }
}

fn compute_overlay(
    reaches_path: &Path,
    swaths_path: &Path,
    flags: &OverlayFlags,
    counts_path: Option<&Path>,
) -> Result<Vec<OverlayRecord>> {
    info!("Command line inputs");
    info!("- {}", reaches_path.display());
    info!("- {}", swaths_path.display());

    require_file(reaches_path)?;
    require_file(swaths_path)?;

    let reaches = ReachReader::read(reaches_path)?;
    let swaths = SwathReader::read(swaths_path)?;

    let engine = OverlayEngine::with_options(OverlayOptions {
        predicate: flags.predicate,
        index_side: flags.index_side,
        exclude_self: flags.exclude_self,
    });
    let records = engine.overlay(&reaches, &swaths);

    if let Some(path) = counts_path {
        let counts = count_overlays_per_reach(&reaches, &records);
        write_overlay_counts_csv(path, &counts)?;
    }

    Ok(records)
}

fn resample_records(
    base: &[OverlayRecord],
    series: &ModelSeries,
    timing: &TimingFlags,
    output: &Path,
) -> Result<()> {
    series.validate_uniform_schedule()?;

    let cycle_count = match timing.cycle_count {
        Some(count) => count,
        None => {
            let span = series
                .time_span()
                .map(|(lo, hi)| hi - lo)
                .unwrap_or_default();
            let count = cycles_to_cover(span, timing.cycle_period);
            info!(
                "Covering a {} s model span with {} cycles of {} s",
                span, count, timing.cycle_period
            );
            count
        }
    };

    let extended = extend_cycles(base, timing.cycle_period, cycle_count);
    let resampled = match_and_join(&extended, series);
    write_resampled_csv(output, &resampled.records)?;
    Ok(())
}

fn cmd_overlay(args: OverlayArgs) -> Result<()> {
    let records = compute_overlay(
        &args.reaches,
        &args.swaths,
        &args.overlay,
        args.counts.as_deref(),
    )?;
    write_overlay_csv(&args.output, &records)?;
    Ok(())
}

fn cmd_resample(args: ResampleArgs) -> Result<()> {
    info!("Command line inputs");
    info!("- {}", args.overlay.display());
    info!("- {}", args.discharge.display());

    require_file(&args.overlay)?;
    require_file(&args.discharge)?;

    let base = read_overlay_csv(&args.overlay)?;
    let series = DischargeReader::read(&args.discharge, args.timing.model_dt)?;
    resample_records(&base, &series, &args.timing, &args.output)
}

fn cmd_run(args: RunArgs) -> Result<()> {
    // All inputs are checked before any stage runs.
    require_file(&args.discharge)?;

    let records = compute_overlay(
        &args.reaches,
        &args.swaths,
        &args.overlay,
        args.counts.as_deref(),
    )?;
    if let Some(path) = &args.overlay_csv {
        write_overlay_csv(path, &records)?;
    }

    let series = DischargeReader::read(&args.discharge, args.timing.model_dt)?;
    resample_records(&records, &series, &args.timing, &args.output)
}
