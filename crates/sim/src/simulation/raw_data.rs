//! Per-trial raw samples written alongside the accumulated statistics.
//!
//! Each sink writes one line per finished trial. Unset times are written as
//! `-1` so the files stay purely numeric.

use crate::errors::{Result, SimError};
use crate::process::Process;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Receives the terminal state of every trial.
pub trait RawDataSink: Send {
    fn record(&mut self, process: &Process) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

fn format_time(time: Option<f64>) -> String {
    match time {
        Some(t) => format!("{t:>20}"),
        None => format!("{:>20}", -1),
    }
}

/// Writes the first-arrival time of one species in one sub-population.
pub struct MutationTimeSink<W: Write + Send> {
    writer: W,
    pop: usize,
    species: usize,
}

impl MutationTimeSink<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>, pop: usize, species: usize) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?), pop, species))
    }
}

impl<W: Write + Send> MutationTimeSink<W> {
    pub fn new(writer: W, pop: usize, species: usize) -> Self {
        Self { writer, pop, species }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> RawDataSink for MutationTimeSink<W> {
    fn record(&mut self, process: &Process) -> Result<()> {
        let time = process.first_mutation_time(self.pop, self.species)?;
        writeln!(self.writer, "{}", format_time(time))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }
}

/// Writes the double-mutant arrival time in sub-population 0 of a diamond
/// branching process, and which single mutant produced it.
pub struct DiamondRouteSink<W: Write + Send> {
    writer: W,
}

impl DiamondRouteSink<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write + Send> DiamondRouteSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> RawDataSink for DiamondRouteSink<W> {
    fn record(&mut self, process: &Process) -> Result<()> {
        let routes = process
            .routes()
            .ok_or_else(|| SimError::mismatch("route data needs a diamond branching process"))?;
        let last = process.number_species().saturating_sub(1);
        let time = process.first_mutation_time(0, last)?;
        writeln!(
            self.writer,
            "{}{:>20}{:>20}",
            format_time(time),
            u8::from(routes.a_yielded_ab(0)),
            u8::from(routes.b_yielded_ab(0))
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }
}
