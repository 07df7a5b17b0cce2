use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::fingerprint::fold::fold_fragments;
use crate::fingerprint::{
    extract_fragments, EncodeError, FingerprintConfig, Fingerprint, FragmentMap, FragmentSet,
    MalformedPolicy,
};
use crate::graph::{parse_reaction_smiles, Reaction};

const PROGRESS_EVERY: usize = 1000;

/// Multiset union of one reaction side: counts from every molecule add.
pub fn merge_side(sets: &[FragmentSet]) -> FragmentSet {
    let mut merged = FragmentSet::new();
    for set in sets {
        for (signature, &count) in set {
            let entry = merged.entry(signature.clone()).or_insert(0);
            *entry = entry.saturating_add(count);
        }
    }
    merged
}

/// Symmetric difference of the two side sets. A fragment present on
/// both sides describes unchanged scaffold and is dropped; a surviving
/// fragment keeps the count from the side that holds it.
pub fn symmetric_difference(reactants: &FragmentSet, products: &FragmentSet) -> FragmentSet {
    let mut combined = FragmentSet::new();
    for (signature, &count) in reactants {
        if !products.contains_key(signature) {
            combined.insert(signature.clone(), count);
        }
    }
    for (signature, &count) in products {
        if !reactants.contains_key(signature) {
            combined.insert(signature.clone(), count);
        }
    }
    combined
}

/// Result of one batch run. `fingerprints` is parallel to the input
/// lines; `skipped` lists lines replaced by all-zero placeholders under
/// [`MalformedPolicy::Skip`].
#[derive(Debug)]
pub struct EncodeOutput {
    pub fingerprints: Vec<Fingerprint>,
    pub mapping: Option<FragmentMap>,
    pub skipped: Vec<usize>,
}

enum LineOutcome {
    Encoded(Fingerprint, Option<FragmentMap>),
    Skipped,
}

/// Batch encoder: applies extraction, combination, hashing and folding
/// to every reaction of a batch, in input order.
#[derive(Debug, Clone)]
pub struct ReactionEncoder {
    config: FingerprintConfig,
}

impl ReactionEncoder {
    /// Validates the configuration before any encoding can start.
    pub fn new(config: FingerprintConfig) -> Result<Self, EncodeError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Combined (differential) fragment set of one reaction.
    pub fn reaction_fragments(
        &self,
        reaction: &Reaction,
        index: usize,
    ) -> Result<FragmentSet, EncodeError> {
        if reaction.reactants.is_empty() {
            return Err(EncodeError::EmptyReaction {
                index,
                side: "reactant",
            });
        }
        if reaction.products.is_empty() {
            return Err(EncodeError::EmptyReaction {
                index,
                side: "product",
            });
        }

        let reactant_sets: Vec<FragmentSet> = reaction
            .reactants
            .iter()
            .map(|mol| extract_fragments(mol, &self.config))
            .collect();
        let product_sets: Vec<FragmentSet> = reaction
            .products
            .iter()
            .map(|mol| extract_fragments(mol, &self.config))
            .collect();

        Ok(symmetric_difference(
            &merge_side(&reactant_sets),
            &merge_side(&product_sets),
        ))
    }

    /// Encode one reaction. `index` is the position reported in errors.
    pub fn encode_reaction(
        &self,
        reaction: &Reaction,
        index: usize,
    ) -> Result<(Fingerprint, Option<FragmentMap>), EncodeError> {
        let combined = self.reaction_fragments(reaction, index)?;
        Ok(fold_fragments(
            &combined,
            self.config.fold_mode,
            self.config.n_folded_length,
            self.config.return_mapping,
        ))
    }

    /// Encode a batch of reaction SMILES lines.
    ///
    /// Work items are index-tagged and run on the rayon pool; the
    /// output vector is reassembled in input order regardless of
    /// completion order. Per-worker fragment maps are merged by a
    /// single sequential reducer afterwards.
    pub fn encode_batch<S: AsRef<str> + Sync>(
        &self,
        lines: &[S],
    ) -> Result<EncodeOutput, EncodeError> {
        let total = lines.len();
        let done = AtomicUsize::new(0);

        let outcomes: Vec<LineOutcome> = lines
            .par_iter()
            .enumerate()
            .map(|(index, line)| {
                let outcome = self.encode_line(line.as_ref(), index);
                if self.config.report_progress {
                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if finished % PROGRESS_EVERY == 0 {
                        log::info!("encoded {finished}/{total} reactions");
                    }
                }
                outcome
            })
            .collect::<Result<Vec<_>, _>>()?;

        if self.config.report_progress {
            log::info!("encoded {total}/{total} reactions");
        }

        let mut fingerprints = Vec::with_capacity(total);
        let mut mapping = self.config.return_mapping.then(FragmentMap::new);
        let mut skipped = Vec::new();

        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                LineOutcome::Encoded(fingerprint, partial_map) => {
                    fingerprints.push(fingerprint);
                    if let (Some(mapping), Some(partial)) = (mapping.as_mut(), partial_map) {
                        mapping.merge(partial);
                    }
                }
                LineOutcome::Skipped => {
                    log::warn!("skipping malformed reaction at line {index}");
                    fingerprints.push(Fingerprint::zeroed(
                        self.config.fold_mode,
                        self.config.n_folded_length,
                    ));
                    skipped.push(index);
                }
            }
        }

        Ok(EncodeOutput {
            fingerprints,
            mapping,
            skipped,
        })
    }

    fn encode_line(&self, line: &str, index: usize) -> Result<LineOutcome, EncodeError> {
        match parse_reaction_smiles(line) {
            Ok(reaction) => self
                .encode_reaction(&reaction, index)
                .map(|(fingerprint, map)| LineOutcome::Encoded(fingerprint, map)),
            Err(source) => match self.config.on_malformed {
                MalformedPolicy::Fail => Err(EncodeError::Reaction { index, source }),
                MalformedPolicy::Skip => Ok(LineOutcome::Skipped),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(pairs: &[(&str, u32)]) -> FragmentSet {
        pairs.iter().map(|&(s, c)| (s.to_string(), c)).collect()
    }

    #[test]
    fn side_merge_adds_counts() {
        let merged = merge_side(&[sets(&[("a", 1), ("b", 2)]), sets(&[("a", 3)])]);
        assert_eq!(merged.get("a"), Some(&4));
        assert_eq!(merged.get("b"), Some(&2));
    }

    #[test]
    fn symmetric_difference_drops_shared() {
        let reactants = sets(&[("shared", 2), ("lost", 1)]);
        let products = sets(&[("shared", 5), ("gained", 3)]);
        let combined = symmetric_difference(&reactants, &products);
        assert_eq!(combined.get("lost"), Some(&1));
        assert_eq!(combined.get("gained"), Some(&3));
        assert!(!combined.contains_key("shared"));
    }

    #[test]
    fn empty_reaction_side_fails_with_index() {
        let encoder = ReactionEncoder::new(FingerprintConfig::default()).unwrap();
        let err = encoder.encode_batch(&["CC>>CCO", ">>CCO"]).unwrap_err();
        match err {
            EncodeError::EmptyReaction { index, side } => {
                assert_eq!(index, 1);
                assert_eq!(side, "reactant");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_line_fails_by_default() {
        let encoder = ReactionEncoder::new(FingerprintConfig::default()).unwrap();
        let err = encoder.encode_batch(&["not smiles"]).unwrap_err();
        assert!(matches!(err, EncodeError::Reaction { index: 0, .. }));
    }

    #[test]
    fn skip_policy_records_placeholder() {
        let config = FingerprintConfig {
            n_folded_length: 32,
            on_malformed: MalformedPolicy::Skip,
            ..Default::default()
        };
        let encoder = ReactionEncoder::new(config).unwrap();
        let output = encoder
            .encode_batch(&["CC>>CCO", "not smiles", "C>>CO"])
            .unwrap();
        assert_eq!(output.fingerprints.len(), 3);
        assert_eq!(output.skipped, vec![1]);
        assert!(output.fingerprints[1].is_all_zero());
        assert!(!output.fingerprints[0].is_all_zero());
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = FingerprintConfig {
            min_radius: 4,
            radius: 2,
            ..Default::default()
        };
        assert!(matches!(
            ReactionEncoder::new(config),
            Err(EncodeError::RadiusBounds { .. })
        ));

        let config = FingerprintConfig {
            n_folded_length: 0,
            ..Default::default()
        };
        assert!(matches!(
            ReactionEncoder::new(config),
            Err(EncodeError::ZeroFoldedLength)
        ));
    }
}
