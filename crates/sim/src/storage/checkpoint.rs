//! Periodic JSON snapshots of histogram results.
//!
//! A checkpoint file holds one [`SampleSpaceProbability`]. Files are written
//! to a temporary sibling and renamed into place, so a reader never sees a
//! partially written snapshot.

use crate::errors::{Result, SimError};
use crate::probability::sample_space::{Sample, SampleSpaceProbability};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default interval between checkpoint writes.
pub const DEFAULT_CHECKPOINT_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Destination and schedule for one histogram's snapshots.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    path: PathBuf,
    interval: Duration,
    next: Instant,
}

impl Checkpoint {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            interval,
            next: Instant::now() + interval,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the scheduled time has passed. Moves the schedule forward past now.
    pub fn just_passed(&mut self) -> bool {
        let now = Instant::now();
        if self.next >= now {
            return false;
        }
        if self.interval.is_zero() {
            self.next = now;
        } else {
            while self.next < now {
                self.next += self.interval;
            }
        }
        true
    }

    /// Write `data` to the checkpoint file.
    pub fn store<S: Sample>(&self, data: &SampleSpaceProbability<S>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            SimError::Checkpoint(format!("Failed to move checkpoint into {}: {e}", self.path.display()))
        })
    }
}

/// Read a checkpoint written by [`Checkpoint::store`].
pub fn load<S: Sample + DeserializeOwned>(path: impl AsRef<Path>) -> Result<SampleSpaceProbability<S>> {
    let text = fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&text)?)
}

/// File name of a per-sub-population histogram.
pub fn histogram_file_name(pop: usize, row_label: &str, row: usize, col_label: &str, col: usize) -> String {
    format!("histogram__pop{pop}__{row_label}{row}__{col_label}{col}.json")
}

/// File name of a whole-population histogram.
pub fn histogram_whole_file_name(row_label: &str, row: usize, col_label: &str, col: usize) -> String {
    format!("histogramWhole__{row_label}{row}__{col_label}{col}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_store_and_load() {
        let dir = tempdir().unwrap();
        let checkpoint = Checkpoint::new(dir.path().join("nested").join("cdf.json"), DEFAULT_CHECKPOINT_INTERVAL);
        let data = SampleSpaceProbability::new(vec![0.0, 1.0, 2.0], vec![0.1, 0.5, 1.0]);
        checkpoint.store(&data).unwrap();
        let back: SampleSpaceProbability<f64> = load(checkpoint.path()).unwrap();
        assert_eq!(back, data);
        assert!(!dir.path().join("nested").join("cdf.json.tmp").exists());
    }

    #[test]
    fn test_schedule() {
        let mut later = Checkpoint::new("unused.json", Duration::from_secs(3600));
        assert!(!later.just_passed());
        let mut now = Checkpoint::new("unused.json", Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        assert!(now.just_passed());
    }

    #[test]
    fn test_file_names() {
        assert_eq!(histogram_file_name(0, "spe", 2, "xxx", 0), "histogram__pop0__spe2__xxx0.json");
        assert_eq!(histogram_whole_file_name("spe", 1, "node", 3), "histogramWhole__spe1__node3.json");
    }
}
