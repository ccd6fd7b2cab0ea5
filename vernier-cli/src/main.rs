//! Sweep the track model over reader positions and print the resulting
//! curve to stdout, for plotting elsewhere.

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use vernier::{
    CrossingDirection, GapPolicy, OverlapRule, PhaseEstimator, Settings, ShiftMode, SweepDriver,
};

use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "vernier-sweep")]
#[command(author, version, about = "Sweep a sliding-window track model and print position/feature curves")]
struct Cli {
    /// YAML or JSON settings file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of positive-signal tracks (N)
    #[arg(short = 'n', long)]
    tracks: Option<usize>,

    /// Phase offset between neighbouring tracks
    #[arg(long, value_enum)]
    shift: Option<ShiftArg>,

    /// Explicit phase offset in radians (overrides --shift)
    #[arg(long)]
    shift_radians: Option<f64>,

    #[arg(long, value_enum)]
    overlap_rule: Option<OverlapArg>,

    /// Samples in the time grid
    #[arg(long)]
    time_samples: Option<usize>,

    /// End of the time grid (starts at 0)
    #[arg(long)]
    time_end: Option<f64>,

    /// Number of reader positions
    #[arg(short, long)]
    positions: Option<usize>,

    #[arg(long)]
    position_start: Option<f64>,

    #[arg(long)]
    position_end: Option<f64>,

    #[arg(long, value_enum)]
    direction: Option<DirectionArg>,

    /// What to do with positions that never cross zero
    #[arg(long, value_enum)]
    gap_policy: Option<GapArg>,

    /// Feature to extract per position
    #[arg(short, long, value_enum, default_value = "crossing")]
    feature: Feature,

    /// Phase estimator for the phase and decode features
    #[arg(long, value_enum, default_value = "quadrature")]
    estimator: EstimatorArg,

    /// Distance per phase cycle for decode; defaults to the ring length 2N
    #[arg(long)]
    distance_per_cycle: Option<f64>,

    /// Phase steps below this are ignored when decoding (radians)
    #[arg(long, default_value = "0.01")]
    hysteresis: f64,

    #[arg(long, value_enum, default_value = "csv")]
    format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ShiftArg {
    Degrees85,
    TwoPiOverN,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OverlapArg {
    Containment,
    OpenSpan,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DirectionArg {
    Falling,
    Rising,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GapArg {
    Abort,
    Skip,
    Mark,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Feature {
    /// First zero-crossing time
    Crossing,
    /// Wrapped composite phase
    Phase,
    /// Unwrapped phase and displacement
    Decode,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EstimatorArg {
    Quadrature,
    Spectral,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("reading settings from {}", path.display()))?,
            None => Settings::default(),
        };

        let model = &mut settings.model;
        if let Some(n) = self.tracks {
            model.tracks = n;
        }
        if let Some(shift) = self.shift {
            model.shift = match shift {
                ShiftArg::Degrees85 => ShiftMode::Degrees85,
                ShiftArg::TwoPiOverN => ShiftMode::TwoPiOverN,
            };
        }
        if let Some(r) = self.shift_radians {
            model.shift = ShiftMode::Radians(r);
        }
        if let Some(rule) = self.overlap_rule {
            model.overlap_rule = match rule {
                OverlapArg::Containment => OverlapRule::Containment,
                OverlapArg::OpenSpan => OverlapRule::OpenSpan,
            };
        }

        let sampling = &mut settings.sampling;
        if let Some(n) = self.time_samples {
            sampling.time_samples = n;
        }
        if let Some(end) = self.time_end {
            sampling.time_end = end;
        }
        if let Some(n) = self.positions {
            sampling.position_samples = n;
        }
        if let Some(start) = self.position_start {
            sampling.position_start = start;
        }
        if let Some(end) = self.position_end {
            sampling.position_end = end;
        }
        if let Some(direction) = self.direction {
            sampling.direction = match direction {
                DirectionArg::Falling => CrossingDirection::Falling,
                DirectionArg::Rising => CrossingDirection::Rising,
            };
        }
        if let Some(policy) = self.gap_policy {
            sampling.gap_policy = match policy {
                GapArg::Abort => GapPolicy::Abort,
                GapArg::Skip => GapPolicy::Skip,
                GapArg::Mark => GapPolicy::Mark,
            };
        }
        Ok(settings)
    }

    fn estimator(&self) -> PhaseEstimator {
        match self.estimator {
            EstimatorArg::Quadrature => PhaseEstimator::Quadrature,
            EstimatorArg::Spectral => PhaseEstimator::Spectral,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let driver = SweepDriver::from_settings(&settings).context("invalid settings")?;
    let positions = settings.sampling.position_grid();

    log::info!(
        "{} tracks, shift {:.4} rad, {} positions in [{}, {}]",
        driver.model().tracks(),
        driver.model().shift(),
        positions.len(),
        settings.sampling.position_start,
        settings.sampling.position_end
    );

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());

    match cli.feature {
        Feature::Crossing => {
            let curve = driver.sweep(&positions).context("sweep failed")?;
            output::write_curve(&mut out, cli.format, &curve)?;
        }
        Feature::Phase => {
            let phases = driver
                .phase_sweep(&positions, cli.estimator())
                .context("phase sweep failed")?;
            output::write_phases(&mut out, cli.format, &phases)?;
        }
        Feature::Decode => {
            let distance = cli
                .distance_per_cycle
                .unwrap_or(driver.model().ring() as f64);
            let decoded = driver
                .decode(&positions, cli.estimator(), distance, cli.hysteresis)
                .context("decode failed")?;
            output::write_decoded(&mut out, cli.format, &decoded)?;
        }
    }
    Ok(())
}
