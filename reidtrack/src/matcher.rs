//! Selecting the candidate that looks most like the remembered target

use crate::config::AppearanceConfig;
use crate::error::{ReidError, Result};
use crate::frame::CandidateView;
use crate::signature::{Signature, SignatureExtractor};

/// Outcome of matching one frame's candidates
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// No usable reference: the first candidate was adopted without comparison
    ColdStart { index: usize, signature: Signature },
    /// Best-scoring candidate against the reference
    Matched {
        index: usize,
        score: f64,
        signature: Signature,
    },
}

impl MatchResult {
    /// Position of the selected candidate in the input list
    pub fn index(&self) -> usize {
        match self {
            Self::ColdStart { index, .. } | Self::Matched { index, .. } => *index,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Self::ColdStart { .. } => None,
            Self::Matched { score, .. } => Some(*score),
        }
    }

    pub fn is_cold_start(&self) -> bool {
        matches!(self, Self::ColdStart { .. })
    }

    pub fn into_signature(self) -> Signature {
        match self {
            Self::ColdStart { signature, .. } | Self::Matched { signature, .. } => signature,
        }
    }
}

/// Scores candidates against a reference signature
#[derive(Debug, Clone)]
pub struct AppearanceMatcher {
    extractor: SignatureExtractor,
}

impl AppearanceMatcher {
    pub fn new(config: &AppearanceConfig) -> Self {
        Self {
            extractor: SignatureExtractor::new(config),
        }
    }

    pub fn extractor(&self) -> &SignatureExtractor {
        &self.extractor
    }

    /// Pick a candidate.
    ///
    /// With no `reference` the first candidate is adopted. Otherwise the
    /// candidate with the strictly highest intersection score wins; on ties
    /// the earliest one is kept.
    pub fn select(
        &self,
        candidates: &[CandidateView<'_>],
        reference: Option<&Signature>,
    ) -> Result<MatchResult> {
        debug_assert!(!candidates.is_empty(), "matcher called without candidates");
        let first = candidates.first().ok_or(ReidError::NoCandidates)?;

        let Some(reference) = reference else {
            return Ok(MatchResult::ColdStart {
                index: 0,
                signature: self.extractor.compute(first),
            });
        };

        let mut best: Option<(usize, f64, Signature)> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            let signature = self.extractor.compute(candidate);
            let score = reference.intersection(&signature)?;
            log::debug!(
                "Candidate {} {} scored {:.4}",
                index,
                candidate.rect(),
                score
            );

            let improves = match &best {
                Some((_, best_score, _)) => score > *best_score,
                None => true,
            };
            if improves {
                best = Some((index, score, signature));
            }
        }

        let (index, score, signature) = best.ok_or(ReidError::NoCandidates)?;
        Ok(MatchResult::Matched {
            index,
            score,
            signature,
        })
    }
}
