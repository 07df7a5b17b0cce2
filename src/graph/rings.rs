use std::collections::VecDeque;

use crate::graph::MoleculeGraph;

/// Smallest set of smallest rings for one molecule.
///
/// Candidate cycles are the shortest cycle through each bond (BFS with
/// that bond removed); a linearly independent subset over GF(2) edge
/// vectors is then selected until the cyclomatic count is reached.
#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    rings: Vec<Vec<usize>>,
}

impl RingInfo {
    pub fn sssr(mol: &MoleculeGraph) -> Self {
        let expected = Self::expected_ring_count(mol);
        if expected == 0 {
            return Self::default();
        }

        let mut candidates: Vec<Vec<usize>> = (0..mol.bond_count())
            .filter_map(|bond| shortest_cycle_through(mol, bond))
            .map(|ring| normalize_ring(&ring))
            .collect();
        candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        candidates.dedup();

        let words = mol.bond_count().div_ceil(64);
        let mut basis: Vec<Vec<u64>> = Vec::with_capacity(expected);
        let mut rings = Vec::with_capacity(expected);

        for ring in candidates {
            if rings.len() == expected {
                break;
            }
            let vector = edge_vector(mol, &ring, words);
            if add_to_basis(&mut basis, vector) {
                rings.push(ring);
            }
        }

        Self { rings }
    }

    pub fn expected_ring_count(mol: &MoleculeGraph) -> usize {
        (mol.bond_count() + mol.connected_components()).saturating_sub(mol.atom_count())
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    /// Rings as atom cycles; consecutive atoms (and last-first) are bonded.
    pub fn rings(&self) -> &[Vec<usize>] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: usize) -> bool {
        self.rings.iter().any(|ring| ring.contains(&atom))
    }
}

/// Shortest cycle containing `bond`: BFS from one endpoint to the other
/// with the bond itself excluded.
fn shortest_cycle_through(mol: &MoleculeGraph, bond: usize) -> Option<Vec<usize>> {
    let (from, to) = {
        let b = mol.bond(bond);
        (b.a, b.b)
    };
    let mut parent = vec![usize::MAX; mol.atom_count()];
    let mut seen = vec![false; mol.atom_count()];
    seen[from] = true;
    let mut queue = VecDeque::new();
    queue.push_back(from);

    while let Some(cur) = queue.pop_front() {
        if cur == to {
            let mut path = vec![to];
            let mut walk = to;
            while walk != from {
                walk = parent[walk];
                path.push(walk);
            }
            return Some(path);
        }
        for &(nb, via) in mol.neighbors(cur) {
            if via == bond || seen[nb] {
                continue;
            }
            seen[nb] = true;
            parent[nb] = cur;
            queue.push_back(nb);
        }
    }
    None
}

fn edge_vector(mol: &MoleculeGraph, ring: &[usize], words: usize) -> Vec<u64> {
    let mut vector = vec![0u64; words];
    let len = ring.len();
    for i in 0..len {
        if let Some(bond) = mol.bond_between(ring[i], ring[(i + 1) % len]) {
            vector[bond / 64] |= 1u64 << (bond % 64);
        }
    }
    vector
}

/// Gaussian elimination step; returns whether the vector was independent
/// of the current basis.
fn add_to_basis(basis: &mut Vec<Vec<u64>>, mut vector: Vec<u64>) -> bool {
    for row in basis.iter() {
        if let Some(pivot) = leading_bit(row) {
            if vector[pivot / 64] & (1u64 << (pivot % 64)) != 0 {
                for (v, r) in vector.iter_mut().zip(row.iter()) {
                    *v ^= *r;
                }
            }
        }
    }
    if vector.iter().all(|&w| w == 0) {
        return false;
    }
    basis.push(vector);
    true
}

fn leading_bit(vector: &[u64]) -> Option<usize> {
    vector
        .iter()
        .enumerate()
        .find(|(_, &word)| word != 0)
        .map(|(i, word)| i * 64 + word.trailing_zeros() as usize)
}

/// Rotate/reflect a ring so the smallest atom index leads and its
/// smaller neighbor comes second; identical rings then compare equal.
fn normalize_ring(ring: &[usize]) -> Vec<usize> {
    let len = ring.len();
    let start = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, atom)| atom)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut normalized: Vec<usize> = (0..len).map(|i| ring[(start + i) % len]).collect();
    if len > 2 && normalized[1] > normalized[len - 1] {
        normalized[1..].reverse();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::parse_smiles;

    #[test]
    fn cyclohexane() {
        let mol = parse_smiles("C1CCCCC1").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 1);
        assert_eq!(ri.rings()[0].len(), 6);
    }

    #[test]
    fn acyclic() {
        let mol = parse_smiles("CCCC").unwrap();
        assert_eq!(RingInfo::sssr(&mol).num_rings(), 0);
    }

    #[test]
    fn naphthalene_two_sixes() {
        let mol = parse_smiles("c1ccc2ccccc2c1").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 2);
        for ring in ri.rings() {
            assert_eq!(ring.len(), 6);
        }
    }

    #[test]
    fn spiro() {
        let mol = parse_smiles("C1CCC2(CC1)CCC2").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 2);
    }

    #[test]
    fn norbornane() {
        let mol = parse_smiles("C1CC2CC1CC2").unwrap();
        assert_eq!(RingInfo::sssr(&mol).num_rings(), 2);
    }

    #[test]
    fn phenol_oxygen_not_in_ring() {
        let mol = parse_smiles("Oc1ccccc1").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert!(!ri.is_ring_atom(0));
        for atom in 1..7 {
            assert!(ri.is_ring_atom(atom));
        }
    }

    #[test]
    fn disconnected_rings() {
        let mol = parse_smiles("C1CC1.C1CCC1").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 2);
        let mut sizes: Vec<usize> = ri.rings().iter().map(|r| r.len()).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![3, 4]);
    }
}
