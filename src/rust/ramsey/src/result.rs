// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::hardware::Acquisition;
use crate::schedule::BRANCHES;
use crate::{Error, Result};

/// Number of recorded quadratures (I and Q).
pub const QUADRATURES: usize = 2;

/// Measured traces of the whole sweep.
///
/// Row-major with shape [detuning, delay, branch, quadrature, sample].
/// Steps that were never stored stay zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultArray {
    shape: [usize; 5],
    data: Vec<f64>,
}

impl ResultArray {
    pub fn new(nr_freqs: usize, nr_delays: usize, samples_per_window: usize) -> Self {
        let shape = [nr_freqs, nr_delays, BRANCHES, QUADRATURES, samples_per_window];
        Self {
            shape,
            data: vec![0.0; shape.iter().product()],
        }
    }

    /// Rebuild from a flat buffer, e.g. one read back from an archive.
    pub fn from_parts(shape: [usize; 5], data: Vec<f64>) -> Result<Self> {
        if shape[2] != BRANCHES || shape[3] != QUADRATURES {
            return Err(Error::ShapeMismatch {
                expected: vec![shape[0], shape[1], BRANCHES, QUADRATURES, shape[4]],
                found: shape.to_vec(),
            });
        }
        let len: usize = shape.iter().product();
        if data.len() != len {
            return Err(Error::ShapeMismatch {
                expected: vec![len],
                found: vec![data.len()],
            });
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> [usize; 5] {
        self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    fn offset(&self, index: [usize; 5]) -> Option<usize> {
        let mut offset = 0;
        for (i, n) in index.iter().zip(self.shape) {
            if *i >= n {
                return None;
            }
            offset = offset * n + i;
        }
        Some(offset)
    }

    pub fn get(&self, index: [usize; 5]) -> Option<f64> {
        self.offset(index).map(|offset| self.data[offset])
    }

    fn step_len(&self) -> usize {
        self.shape[1..].iter().product()
    }

    /// All values of sweep step `index`, laid out [delay, branch, quadrature, sample].
    pub fn sweep_slice(&self, index: usize) -> Option<&[f64]> {
        let len = self.step_len();
        self.data.get(index * len..(index + 1) * len)
    }

    /// Copy one averaged acquisition into sweep step `index`.
    ///
    /// The acquisition holds one window per block in sequence order, which
    /// is delay-major and branch-minor.
    pub fn store_sweep_step(&mut self, index: usize, acquisition: &Acquisition) -> Result<()> {
        if index >= self.shape[0] {
            return Err(Error::SweepIndexOutOfRange {
                index,
                len: self.shape[0],
            });
        }
        let expected = [self.shape[1] * BRANCHES, QUADRATURES, self.shape[4]];
        if acquisition.shape() != expected || acquisition.data.len() != self.step_len() {
            return Err(Error::ShapeMismatch {
                expected: expected.to_vec(),
                found: acquisition.shape().to_vec(),
            });
        }
        let len = self.step_len();
        self.data[index * len..(index + 1) * len].copy_from_slice(&acquisition.data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acquisition(nr_delays: usize, samples: usize, offset: f64) -> Acquisition {
        let num_windows = nr_delays * BRANCHES;
        let len = num_windows * QUADRATURES * samples;
        Acquisition {
            time_axis: (0..samples).map(|n| n as f64).collect(),
            data: (0..len).map(|i| offset + i as f64).collect(),
            num_windows,
            num_ports: QUADRATURES,
            samples_per_window: samples,
        }
    }

    #[test]
    fn test_store_sweep_step() {
        let mut result = ResultArray::new(3, 4, 5);
        assert_eq!(result.shape(), [3, 4, 2, 2, 5]);
        result.store_sweep_step(1, &acquisition(4, 5, 1000.0)).unwrap();

        assert!(result.sweep_slice(0).unwrap().iter().all(|v| *v == 0.0));
        assert!(result.sweep_slice(2).unwrap().iter().all(|v| *v == 0.0));
        // Window 2 * delay + branch, port q, sample s.
        let (delay, branch, q, s) = (2, 1, 1, 3);
        let window = delay * BRANCHES + branch;
        let flat = (window * QUADRATURES + q) * 5 + s;
        assert_eq!(
            result.get([1, delay, branch, q, s]),
            Some(1000.0 + flat as f64)
        );
        assert_eq!(result.get([1, 4, 0, 0, 0]), None);
        assert!(result.sweep_slice(3).is_none());
    }

    #[test]
    fn test_store_rejects_mismatch() {
        let mut result = ResultArray::new(2, 4, 5);
        assert!(matches!(
            result.store_sweep_step(0, &acquisition(3, 5, 0.0)),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            result.store_sweep_step(0, &acquisition(4, 6, 0.0)),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            result.store_sweep_step(2, &acquisition(4, 5, 0.0)),
            Err(Error::SweepIndexOutOfRange { index: 2, len: 2 })
        ));
        let mut truncated = acquisition(4, 5, 0.0);
        truncated.data.pop();
        assert!(result.store_sweep_step(0, &truncated).is_err());
    }

    #[test]
    fn test_from_parts() {
        let result = ResultArray::new(1, 2, 3);
        let rebuilt = ResultArray::from_parts(result.shape(), result.data().to_vec()).unwrap();
        assert_eq!(rebuilt, result);
        assert!(ResultArray::from_parts([1, 2, 2, 2, 3], vec![0.0; 5]).is_err());
        assert!(ResultArray::from_parts([1, 2, 3, 2, 3], vec![0.0; 36]).is_err());
    }
}
