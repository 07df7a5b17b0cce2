use crate::fingerprint::canon::canonical_signature;
use crate::fingerprint::{FingerprintConfig, FragmentSet};
use crate::graph::{MoleculeGraph, RingInfo};

/// Enumerate circular substructures of one molecule.
///
/// For every atom and every radius in `[min_radius, radius]`, the
/// induced subgraph of atoms within that bond distance becomes one
/// fragment. A radius whose BFS shell is empty is skipped: the
/// neighborhood equals the previous radius and would duplicate it.
/// With `rings` enabled, every SSSR ring contributes one additional
/// fragment regardless of the radius bounds.
pub fn extract_fragments(mol: &MoleculeGraph, config: &FingerprintConfig) -> FragmentSet {
    let mut fragments = FragmentSet::new();

    for center in 0..mol.atom_count() {
        let dist = mol.distances_within(center, config.radius);
        for radius in config.min_radius..=config.radius {
            if radius > 0 {
                let shell_populated = dist.iter().any(|&d| d == radius);
                if !shell_populated {
                    break;
                }
            }
            let atoms: Vec<usize> = (0..mol.atom_count())
                .filter(|&atom| dist[atom] <= radius)
                .collect();
            let root = config.root_central_atom.then_some(center);
            let signature =
                canonical_signature(mol, &atoms, root, config.include_hydrogens);
            *fragments.entry(signature).or_insert(0) += 1;
        }
    }

    if config.rings {
        for ring in RingInfo::sssr(mol).rings() {
            let signature = canonical_signature(mol, ring, None, config.include_hydrogens);
            *fragments.entry(signature).or_insert(0) += 1;
        }
    }

    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::parse_smiles;

    fn config(min_radius: usize, radius: usize) -> FingerprintConfig {
        FingerprintConfig {
            min_radius,
            radius,
            rings: false,
            ..Default::default()
        }
    }

    #[test]
    fn single_atom_molecule() {
        let mol = parse_smiles("C").unwrap();
        let fragments = extract_fragments(&mol, &config(0, 3));
        // Only the atom-level fragment; no shells exist.
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments.values().sum::<u32>(), 1);
    }

    #[test]
    fn min_radius_one_skips_isolated_atom() {
        let mol = parse_smiles("C").unwrap();
        let fragments = extract_fragments(&mol, &config(1, 3));
        assert!(fragments.is_empty());
    }

    #[test]
    fn symmetric_fragments_are_counted() {
        // Both methyls of propane yield the identical radius-0 fragment.
        let mol = parse_smiles("CCC").unwrap();
        let fragments = extract_fragments(&mol, &config(0, 0));
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments.values().copied().max(), Some(3));
    }

    #[test]
    fn radius_growth_is_monotonic() {
        let mol = parse_smiles("CCCCO").unwrap();
        let narrow = extract_fragments(&mol, &config(0, 1));
        let wide = extract_fragments(&mol, &config(0, 3));
        for signature in narrow.keys() {
            assert!(wide.contains_key(signature), "lost fragment {signature}");
        }
        assert!(wide.len() > narrow.len());
    }

    #[test]
    fn exhausted_molecule_adds_nothing_at_larger_radius() {
        // Ethane is fully covered at radius 1; radius 3 adds no fragment.
        let mol = parse_smiles("CC").unwrap();
        let small = extract_fragments(&mol, &config(0, 1));
        let large = extract_fragments(&mol, &config(0, 3));
        assert_eq!(small, large);
    }

    #[test]
    fn ring_extraction_adds_ring_fragment() {
        let mol = parse_smiles("C1CC1").unwrap();
        let without = extract_fragments(
            &mol,
            &FingerprintConfig {
                min_radius: 0,
                radius: 0,
                rings: false,
                ..Default::default()
            },
        );
        let with = extract_fragments(
            &mol,
            &FingerprintConfig {
                min_radius: 0,
                radius: 0,
                rings: true,
                ..Default::default()
            },
        );
        assert_eq!(with.len(), without.len() + 1);
    }

    #[test]
    fn rooting_increases_specificity() {
        let mol = parse_smiles("CC(C)C").unwrap();
        let unrooted = extract_fragments(&mol, &config(0, 2));
        let rooted = extract_fragments(
            &mol,
            &FingerprintConfig {
                min_radius: 0,
                radius: 2,
                rings: false,
                root_central_atom: true,
                ..Default::default()
            },
        );
        assert!(rooted.len() >= unrooted.len());
    }
}
