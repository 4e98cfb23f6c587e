//! Base data structures shared by every process: dense arrays, the
//! population matrix, sample grids and random sampling.

pub mod array;
pub mod grid;
pub mod population;
pub mod random;

pub use array::{Array, Array1D, Array2D, Array3D, Array4D};
pub use population::{Count, PopulationMatrix};
pub use random::{SimRng, multinomial, rng_from_seed};
