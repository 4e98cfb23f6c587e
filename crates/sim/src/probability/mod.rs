//! Empirical distributions accumulated across Monte Carlo trials.
//!
//! Histograms count outcomes over a fixed support, notify registered
//! listeners when a sample satisfies their notification rule, and
//! periodically checkpoint themselves to disk.

pub mod cdf;
pub mod histogram;
pub mod moment;
pub mod notify;
pub mod observer;
pub mod pmf;
pub mod sample_space;

pub use cdf::Cdf;
pub use histogram::{Accumulator, Histogram, HistogramStatus, Listener};
pub use moment::{Mean, Moment};
pub use notify::Notification;
pub use observer::HistogramLogger;
pub use pmf::PmfBool;
pub use sample_space::{
    Sample, SampleSpaceProbability, bernoulli_sample_space, logarithmic_sample_space, uniform_sample_space,
};
