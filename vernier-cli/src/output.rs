use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use vernier::{DecodedPosition, PhaseSample, SweepCurve};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// Gaps print as an empty CSV field or JSON `null`.
pub fn write_curve<W: Write>(out: &mut W, format: OutputFormat, curve: &SweepCurve) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, curve),
        OutputFormat::Csv => {
            writeln!(out, "position,crossing_time")?;
            for p in &curve.points {
                match p.crossing_time {
                    Some(t) => writeln!(out, "{},{}", p.position, t)?,
                    None => writeln!(out, "{},", p.position)?,
                }
            }
            out.flush()?;
            Ok(())
        }
    }
}

pub fn write_phases<W: Write>(
    out: &mut W,
    format: OutputFormat,
    phases: &[PhaseSample],
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, &phases),
        OutputFormat::Csv => {
            writeln!(out, "position,phase")?;
            for p in phases {
                writeln!(out, "{},{}", p.position, p.phase)?;
            }
            out.flush()?;
            Ok(())
        }
    }
}

pub fn write_decoded<W: Write>(
    out: &mut W,
    format: OutputFormat,
    decoded: &[DecodedPosition],
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, &decoded),
        OutputFormat::Csv => {
            writeln!(out, "position,unwrapped_phase,displacement")?;
            for d in decoded {
                writeln!(out, "{},{},{}", d.position, d.unwrapped_phase, d.displacement)?;
            }
            out.flush()?;
            Ok(())
        }
    }
}

fn write_json<W: Write, T: serde::Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
