pub mod canon;
pub mod encode;
pub mod extract;
pub mod fold;

pub use encode::{EncodeOutput, ReactionEncoder};
pub use extract::extract_fragments;
pub use fold::{FoldMode, Fingerprint, FragmentMap};

use std::collections::BTreeMap;

use crate::graph::ReactionError;

/// Signature → occurrence count, scoped to one molecule or one combined
/// reaction. BTreeMap keeps iteration (and therefore mapping
/// accumulation) deterministic.
pub type FragmentSet = BTreeMap<String, u32>;

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("min_radius {min_radius} exceeds radius {radius}")]
    RadiusBounds { min_radius: usize, radius: usize },
    #[error("n_folded_length must be positive")]
    ZeroFoldedLength,
    #[error("reaction {index}: no {side} molecules")]
    EmptyReaction { index: usize, side: &'static str },
    #[error("reaction {index}: {source}")]
    Reaction {
        index: usize,
        #[source]
        source: ReactionError,
    },
}

/// What to do with a line that cannot be turned into molecule graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Fail the whole batch (the default).
    #[default]
    Fail,
    /// Record the line index and emit an all-zero placeholder.
    Skip,
}

#[derive(Debug, Clone)]
pub struct FingerprintConfig {
    /// Output vector length; collisions drop as this grows.
    pub n_folded_length: usize,
    pub min_radius: usize,
    pub radius: usize,
    /// Extract whole SSSR rings as additional fragments.
    pub rings: bool,
    /// Encode explicit hydrogen counts into signatures.
    pub include_hydrogens: bool,
    /// Encode which atom is the neighborhood center.
    pub root_central_atom: bool,
    /// Accumulate a position → signatures mapping over the batch.
    pub return_mapping: bool,
    /// Log batch progress.
    pub report_progress: bool,
    pub fold_mode: FoldMode,
    pub on_malformed: MalformedPolicy,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            n_folded_length: 2048,
            min_radius: 0,
            radius: 3,
            rings: true,
            include_hydrogens: false,
            root_central_atom: false,
            return_mapping: false,
            report_progress: false,
            fold_mode: FoldMode::Binary,
            on_malformed: MalformedPolicy::Fail,
        }
    }
}

impl FingerprintConfig {
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.n_folded_length == 0 {
            return Err(EncodeError::ZeroFoldedLength);
        }
        if self.min_radius > self.radius {
            return Err(EncodeError::RadiusBounds {
                min_radius: self.min_radius,
                radius: self.radius,
            });
        }
        Ok(())
    }
}
