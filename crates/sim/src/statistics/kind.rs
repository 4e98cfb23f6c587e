//! Runtime choice among the concrete gatherers.

use crate::base::{Array2D, Array3D};
use crate::errors::Result;
use crate::probability::SampleSpaceProbability;
use crate::process::Process;
use crate::statistics::distribution::{CdfStatistics, PmfStatistics};
use crate::statistics::gatherer::StatisticsGatherer;
use crate::statistics::moment::MomentStatistics;
use serde::{Deserialize, Serialize};

/// Which statistic a run gathers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticKind {
    #[default]
    MutationTime,
    MutationTimeLogarithmic,
    ExtinctionTime,
    Fate,
    LifetimeRisk,
    Population,
    MutationTimeMoment,
    PopulationMoment,
}

/// One gatherer picked at runtime.
#[derive(Debug)]
pub enum Statistics {
    Cdf(CdfStatistics),
    Pmf(PmfStatistics),
    Moment(MomentStatistics),
}

/// Result held by one accumulator of [`Statistics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatisticsResult {
    Distribution(SampleSpaceProbability<f64>),
    Bernoulli(SampleSpaceProbability<bool>),
    Moment(Option<f64>),
}

/// Flat record of one accumulator, `pop` unset for whole-population results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub pop: Option<usize>,
    pub row: usize,
    pub col: usize,
    pub result: StatisticsResult,
}

impl Statistics {
    /// All results flattened, per-sub-population first.
    pub fn records(&self) -> Result<Vec<ResultRecord>> {
        let results = self.results()?;
        let whole = self.results_whole()?;
        let [pops, rows, cols] = results.dims();
        let mut records = Vec::with_capacity(results.len() + whole.len());
        for pop in 0..pops {
            for row in 0..rows {
                for col in 0..cols {
                    records.push(ResultRecord {
                        pop: Some(pop),
                        row,
                        col,
                        result: results.at([pop, row, col])?.clone(),
                    });
                }
            }
        }
        let [rows, cols] = whole.dims();
        for row in 0..rows {
            for col in 0..cols {
                records.push(ResultRecord {
                    pop: None,
                    row,
                    col,
                    result: whole.at([row, col])?.clone(),
                });
            }
        }
        Ok(records)
    }
}

impl StatisticsGatherer for Statistics {
    type Results = StatisticsResult;

    fn dump(&mut self, process: &Process) -> Result<()> {
        match self {
            Statistics::Cdf(s) => s.dump(process),
            Statistics::Pmf(s) => s.dump(process),
            Statistics::Moment(s) => s.dump(process),
        }
    }

    fn converged(&self) -> bool {
        match self {
            Statistics::Cdf(s) => s.converged(),
            Statistics::Pmf(s) => s.converged(),
            Statistics::Moment(s) => s.converged(),
        }
    }

    fn results(&self) -> Result<Array3D<StatisticsResult>> {
        Ok(match self {
            Statistics::Cdf(s) => s.results()?.map(|r| StatisticsResult::Distribution(r.clone())),
            Statistics::Pmf(s) => s.results()?.map(|r| StatisticsResult::Bernoulli(r.clone())),
            Statistics::Moment(s) => s.results()?.map(|r| StatisticsResult::Moment(*r)),
        })
    }

    fn results_whole(&self) -> Result<Array2D<StatisticsResult>> {
        Ok(match self {
            Statistics::Cdf(s) => s.results_whole()?.map(|r| StatisticsResult::Distribution(r.clone())),
            Statistics::Pmf(s) => s.results_whole()?.map(|r| StatisticsResult::Bernoulli(r.clone())),
            Statistics::Moment(s) => s.results_whole()?.map(|r| StatisticsResult::Moment(*r)),
        })
    }

    fn trials(&self) -> u64 {
        match self {
            Statistics::Cdf(s) => s.trials(),
            Statistics::Pmf(s) => s.trials(),
            Statistics::Moment(s) => s.trials(),
        }
    }
}
