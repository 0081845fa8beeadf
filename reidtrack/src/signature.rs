//! Joint color-histogram appearance signatures

use crate::config::{AppearanceConfig, HistogramNorm};
use crate::error::{ReidError, Result};
use crate::frame::CandidateView;
use ndarray::{Array3, Zip};
use num::cast;

/// Normalized joint distribution over the three color channels of a region.
///
/// Signatures are only comparable when built by extractors with the same
/// quantization.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    hist: Array3<f32>,
    samples: usize,
}

impl Signature {
    /// Wrap an already normalized `bins x bins x bins` histogram built from
    /// `samples` pixels
    pub fn from_histogram(hist: Array3<f32>, samples: usize) -> Result<Self> {
        let (b0, b1, b2) = hist.dim();
        if b0 == 0 || b0 != b1 || b1 != b2 {
            return Err(ReidError::config(format!(
                "signature histogram must be a non-empty cube, got {}x{}x{}",
                b0, b1, b2
            )));
        }
        Ok(Self { hist, samples })
    }

    /// Bins per channel
    pub fn bins(&self) -> usize {
        self.hist.dim().0
    }

    /// Number of pixels that fell inside the value range
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }

    pub fn histogram(&self) -> &Array3<f32> {
        &self.hist
    }

    /// Histogram intersection: sum of per-bin minimums. Higher is more similar.
    pub fn intersection(&self, other: &Signature) -> Result<f64> {
        if self.hist.dim() != other.hist.dim() {
            return Err(ReidError::IncompatibleSignatures {
                left: self.bins(),
                right: other.bins(),
            });
        }

        let score = Zip::from(&self.hist)
            .and(&other.hist)
            .fold(0.0f64, |acc, &a, &b| acc + a.min(b) as f64);
        Ok(score)
    }
}

/// Builds signatures with one fixed quantization
#[derive(Debug, Clone)]
pub struct SignatureExtractor {
    bins: usize,
    normalization: HistogramNorm,
    /// Bin of every 8-bit channel value, `None` when outside the range
    lut: [Option<usize>; 256],
}

impl SignatureExtractor {
    pub fn new(config: &AppearanceConfig) -> Self {
        let bins = config.histogram_bins.max(1);
        let [min, max] = config.histogram_range;
        let scale = bins as f32 / (max - min);

        let mut lut = [None; 256];
        for (value, slot) in lut.iter_mut().enumerate() {
            let v = value as f32;
            if v < min || v >= max {
                continue;
            }
            *slot = cast::<f32, usize>(((v - min) * scale).floor()).map(|bin| bin.min(bins - 1));
        }

        Self {
            bins,
            normalization: config.normalization,
            lut,
        }
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Count the region's pixels into a joint histogram and normalize it
    pub fn compute(&self, view: &CandidateView<'_>) -> Signature {
        let mut hist = Array3::<f32>::zeros((self.bins, self.bins, self.bins));
        let mut samples = 0usize;

        for [c0, c1, c2] in view.pixels() {
            if let (Some(b0), Some(b1), Some(b2)) = (
                self.lut[c0 as usize],
                self.lut[c1 as usize],
                self.lut[c2 as usize],
            ) {
                hist[[b0, b1, b2]] += 1.0;
                samples += 1;
            }
        }

        if samples > 0 {
            self.normalize(&mut hist);
        }

        Signature { hist, samples }
    }

    fn normalize(&self, hist: &mut Array3<f32>) {
        match self.normalization {
            HistogramNorm::Sum => {
                let total = hist.sum();
                if total > 0.0 {
                    hist.mapv_inplace(|v| v / total);
                }
            }
            HistogramNorm::MinMax => {
                let min = hist.iter().cloned().fold(f32::INFINITY, f32::min);
                let max = hist.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                let span = max - min;
                if span > 0.0 {
                    hist.mapv_inplace(|v| (v - min) / span);
                } else {
                    hist.fill(0.0);
                }
            }
        }
    }
}
