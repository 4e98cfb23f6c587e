//! Dense fixed-size N-dimensional arrays over a flat buffer.
//!
//! Elements are laid out so that the first index varies fastest:
//! `flat = i0 + d0*i1 + d0*d1*i2 + d0*d1*d2*i3`. Iterating the buffer in
//! order therefore visits `i0` innermost, which is also the order used by
//! [`Array::cumulative_sum`].

use crate::errors::{Result, SimError};

/// A dense array with `D` dimensions fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Array<T, const D: usize> {
    dims: [usize; D],
    data: Vec<T>,
}

pub type Array1D<T> = Array<T, 1>;
pub type Array2D<T> = Array<T, 2>;
pub type Array3D<T> = Array<T, 3>;
pub type Array4D<T> = Array<T, 4>;

impl<T: Clone, const D: usize> Array<T, D> {
    /// Create an array with every element set to `value`.
    pub fn filled(dims: [usize; D], value: T) -> Self {
        let len = dims.iter().product();
        Self {
            dims,
            data: vec![value; len],
        }
    }
}

impl<T: Clone + Default, const D: usize> Array<T, D> {
    /// Create an array of default-valued elements (zero for numbers).
    pub fn new(dims: [usize; D]) -> Self {
        Self::filled(dims, T::default())
    }
}

impl<T, const D: usize> Array<T, D> {
    /// Wrap an existing flat buffer. The buffer length must match the dimensions.
    pub fn from_vec(dims: [usize; D], data: Vec<T>) -> Result<Self> {
        let len: usize = dims.iter().product();
        if data.len() != len {
            return Err(SimError::mismatch(format!(
                "buffer of length {} does not fit dimensions {dims:?}",
                data.len()
            )));
        }
        Ok(Self { dims, data })
    }

    /// Build an array by evaluating `f` at every multi-index.
    pub fn from_fn(dims: [usize; D], mut f: impl FnMut([usize; D]) -> T) -> Self {
        let len: usize = dims.iter().product();
        let mut data = Vec::with_capacity(len);
        for flat in 0..len {
            data.push(f(unravel(&dims, flat)));
        }
        Self { dims, data }
    }

    /// Fallible [`Array::from_fn`]. Stops at the first error.
    pub fn try_from_fn(dims: [usize; D], mut f: impl FnMut([usize; D]) -> Result<T>) -> Result<Self> {
        let len: usize = dims.iter().product();
        let mut data = Vec::with_capacity(len);
        for flat in 0..len {
            data.push(f(unravel(&dims, flat))?);
        }
        Ok(Self { dims, data })
    }

    /// Get the array dimensions.
    pub fn dims(&self) -> [usize; D] {
        self.dims
    }

    /// Get the extent of dimension `k`.
    pub fn dim(&self, k: usize) -> usize {
        self.dims[k]
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Translate a multi-index into a position in the flat buffer.
    pub fn flat_index(&self, index: [usize; D]) -> Result<usize> {
        let mut flat = 0;
        let mut stride = 1;
        for (k, (&i, &d)) in index.iter().zip(self.dims.iter()).enumerate() {
            if i >= d {
                return Err(SimError::InvalidIndex {
                    index: index.to_vec(),
                    dims: self.dims.to_vec(),
                });
            }
            flat += i * stride;
            stride *= self.dims[k];
        }
        Ok(flat)
    }

    /// Translate a flat position back into a multi-index.
    pub fn unravel(&self, flat: usize) -> [usize; D] {
        unravel(&self.dims, flat)
    }

    /// Bounds-checked shared access.
    pub fn at(&self, index: [usize; D]) -> Result<&T> {
        let flat = self.flat_index(index)?;
        Ok(&self.data[flat])
    }

    /// Bounds-checked mutable access.
    pub fn at_mut(&mut self, index: [usize; D]) -> Result<&mut T> {
        let flat = self.flat_index(index)?;
        Ok(&mut self.data[flat])
    }

    /// Overwrite the element at `index`.
    pub fn set(&mut self, index: [usize; D], value: T) -> Result<()> {
        *self.at_mut(index)? = value;
        Ok(())
    }

    /// Elements in flat order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Fallible [`Array::map`].
    pub fn try_map<U>(&self, f: impl FnMut(&T) -> Result<U>) -> Result<Array<U, D>> {
        Ok(Array {
            dims: self.dims,
            data: self.data.iter().map(f).collect::<Result<_>>()?,
        })
    }

    /// Apply `f` elementwise, keeping the shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Array<U, D> {
        Array {
            dims: self.dims,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Copy + std::iter::Sum<T>, const D: usize> Array<T, D> {
    /// Sum of all elements.
    pub fn sum(&self) -> T {
        self.data.iter().copied().sum()
    }
}

impl<const D: usize> Array<f64, D> {
    /// Weighted selection over the elements.
    ///
    /// Scans the flat buffer accumulating a running sum and returns the
    /// multi-index of the first element at which `threshold < running_sum`.
    /// Returns `None` for a negative or NaN threshold, or when the threshold is
    /// not below the total sum.
    pub fn cumulative_sum(&self, threshold: f64) -> Option<[usize; D]> {
        if threshold.is_nan() || threshold < 0.0 {
            return None;
        }
        let mut running = 0.0;
        for (flat, &value) in self.data.iter().enumerate() {
            running += value;
            if threshold < running {
                return Some(unravel(&self.dims, flat));
            }
        }
        None
    }
}

impl<T> Array<T, 2> {
    /// Shared access by row and column.
    pub fn at2(&self, i: usize, j: usize) -> Result<&T> {
        self.at([i, j])
    }

    /// Elements of row `i` (fixed first index).
    pub fn row(&self, i: usize) -> Result<Vec<&T>> {
        (0..self.dims[1]).map(|j| self.at([i, j])).collect()
    }
}

impl<T> Array<T, 4> {
    /// Shared access by four indices.
    pub fn at4(&self, i: usize, j: usize, k: usize, l: usize) -> Result<&T> {
        self.at([i, j, k, l])
    }
}

impl<'a, T, const D: usize> IntoIterator for &'a Array<T, D> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

fn unravel<const D: usize>(dims: &[usize; D], mut flat: usize) -> [usize; D] {
    let mut index = [0; D];
    for (k, &d) in dims.iter().enumerate() {
        if d == 0 {
            break;
        }
        index[k] = flat % d;
        flat /= d;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_layout_first_index_fastest() {
        let arr = Array3D::from_fn([2, 3, 4], |[i, j, k]| i + 10 * j + 100 * k);
        assert_eq!(arr.as_slice()[0], 0);
        assert_eq!(arr.as_slice()[1], 1);
        assert_eq!(arr.as_slice()[2], 10);
        assert_eq!(arr.flat_index([1, 2, 3]).unwrap(), 1 + 2 * 2 + 2 * 3 * 3);
        assert_eq!(*arr.at([1, 2, 3]).unwrap(), 321);
    }

    #[test]
    fn test_out_of_range_access_fails() {
        let mut arr: Array2D<i64> = Array2D::new([2, 2]);
        assert!(matches!(
            arr.at([2, 0]),
            Err(SimError::InvalidIndex { .. })
        ));
        assert!(arr.set([0, 5], 1).is_err());
        assert!(arr.set([1, 1], 7).is_ok());
        assert_eq!(*arr.at2(1, 1).unwrap(), 7);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(Array1D::from_vec([3], vec![1.0, 2.0]).is_err());
        assert!(Array1D::from_vec([2], vec![1.0, 2.0]).is_ok());
    }

    #[test]
    fn test_unravel_inverts_flat_index() {
        let arr: Array4D<f64> = Array4D::new([2, 3, 2, 5]);
        for flat in 0..arr.len() {
            let idx = arr.unravel(flat);
            assert_eq!(arr.flat_index(idx).unwrap(), flat);
        }
    }

    #[test]
    fn test_sum() {
        let arr = Array2D::from_vec([2, 2], vec![1_i64, 2, 3, 4]).unwrap();
        assert_eq!(arr.sum(), 10);
    }

    #[test]
    fn test_cumulative_sum_out_of_range_thresholds() {
        let arr = Array1D::from_vec([3], vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(arr.cumulative_sum(-0.5), None);
        assert_eq!(arr.cumulative_sum(6.0), None);
        assert_eq!(arr.cumulative_sum(7.0), None);
        assert_eq!(arr.cumulative_sum(f64::NAN), None);
    }

    #[test]
    fn test_cumulative_sum_boundaries_exhaustive() {
        // running sums: 1, 1, 3, 6
        let arr = Array2D::from_vec([2, 2], vec![1.0, 0.0, 2.0, 3.0]).unwrap();
        let cases = [
            (0.0, [0, 0]),
            (0.999, [0, 0]),
            (1.0, [0, 1]),
            (2.5, [0, 1]),
            (3.0, [1, 1]),
            (5.999, [1, 1]),
        ];
        for (threshold, expected) in cases {
            assert_eq!(arr.cumulative_sum(threshold), Some(expected), "{threshold}");
        }
    }

    #[test]
    fn test_cumulative_sum_skips_zero_weights() {
        let arr = Array4D::from_fn([2, 2, 2, 2], |idx| {
            if idx == [1, 0, 1, 1] { 4.0 } else { 0.0 }
        });
        for t in [0.0, 1.0, 3.99] {
            assert_eq!(arr.cumulative_sum(t), Some([1, 0, 1, 1]));
        }
        assert_eq!(arr.cumulative_sum(4.0), None);
    }

    #[test]
    fn test_cumulative_sum_monotone_in_threshold() {
        let arr = Array3D::from_fn([3, 2, 2], |[i, j, k]| (i + j + k) as f64 * 0.5);
        let total = arr.sum();
        let mut last = 0;
        let mut t = 0.0;
        while t < total {
            let idx = arr.cumulative_sum(t).unwrap();
            let flat = arr.flat_index(idx).unwrap();
            assert!(flat >= last);
            last = flat;
            t += 0.05;
        }
    }
}
