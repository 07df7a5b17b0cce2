pub mod elements;
pub mod reaction;
pub mod rings;
pub mod smiles;

pub use reaction::{parse_reaction_smiles, Reaction, ReactionError};
pub use rings::RingInfo;
pub use smiles::{parse_smiles, SmilesError};

use std::collections::VecDeque;

/// Bond order as it appears in the molecular graph. Aromatic bonds keep
/// their own variant rather than a Kekulé assignment so that fragment
/// signatures do not depend on an arbitrary kekulization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    pub fn symbol(&self) -> &'static str {
        match self {
            BondOrder::Single => "-",
            BondOrder::Double => "=",
            BondOrder::Triple => "#",
            BondOrder::Aromatic => ":",
        }
    }

    /// Contribution to an atom's bond-order sum for valence purposes.
    /// Aromatic bonds count one; the implicit-hydrogen rule compensates.
    pub fn valence_units(&self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

/// Intrinsic atomic properties, as read off the SMILES input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Atom {
    pub atomic_num: u8,
    pub formal_charge: i8,
    /// Mass number; 0 means natural abundance.
    pub isotope: u16,
    /// Suppressed hydrogens implied by valence, or the explicit bracket count.
    pub hydrogen_count: u8,
    pub is_aromatic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn other(&self, atom: usize) -> usize {
        if atom == self.a {
            self.b
        } else {
            self.a
        }
    }
}

/// Read-only molecular graph consumed by the fingerprint core.
///
/// Atoms and bonds are stored flat; `adjacency[i]` lists
/// `(neighbor_atom, bond_index)` pairs for atom `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoleculeGraph {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl MoleculeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn atom(&self, idx: usize) -> &Atom {
        &self.atoms[idx]
    }

    pub fn atom_mut(&mut self, idx: usize) -> &mut Atom {
        &mut self.atoms[idx]
    }

    pub fn bond(&self, idx: usize) -> &Bond {
        &self.bonds[idx]
    }

    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    pub fn bonds(&self) -> impl Iterator<Item = &Bond> {
        self.bonds.iter()
    }

    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        self.atoms.len() - 1
    }

    pub fn add_bond(&mut self, a: usize, b: usize, order: BondOrder) -> usize {
        let idx = self.bonds.len();
        self.bonds.push(Bond { a, b, order });
        self.adjacency[a].push((b, idx));
        self.adjacency[b].push((a, idx));
        idx
    }

    /// `(neighbor, bond_index)` pairs of `idx`.
    pub fn neighbors(&self, idx: usize) -> &[(usize, usize)] {
        &self.adjacency[idx]
    }

    pub fn degree(&self, idx: usize) -> usize {
        self.adjacency[idx].len()
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency[a]
            .iter()
            .find(|(nb, _)| *nb == b)
            .map(|(_, bond)| *bond)
    }

    /// BFS bond-distance from `center` to every atom, capped at `radius`.
    /// Unreached atoms get `usize::MAX`.
    pub fn distances_within(&self, center: usize, radius: usize) -> Vec<usize> {
        let mut dist = vec![usize::MAX; self.atoms.len()];
        dist[center] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(center);
        while let Some(cur) = queue.pop_front() {
            let d = dist[cur];
            if d == radius {
                continue;
            }
            for &(nb, _) in self.neighbors(cur) {
                if dist[nb] == usize::MAX {
                    dist[nb] = d + 1;
                    queue.push_back(nb);
                }
            }
        }
        dist
    }

    pub fn connected_components(&self) -> usize {
        let n = self.atoms.len();
        let mut seen = vec![false; n];
        let mut components = 0;
        for start in 0..n {
            if seen[start] {
                continue;
            }
            components += 1;
            let mut queue = VecDeque::new();
            seen[start] = true;
            queue.push_back(start);
            while let Some(cur) = queue.pop_front() {
                for &(nb, _) in self.neighbors(cur) {
                    if !seen[nb] {
                        seen[nb] = true;
                        queue.push_back(nb);
                    }
                }
            }
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbon() -> Atom {
        Atom {
            atomic_num: 6,
            ..Default::default()
        }
    }

    #[test]
    fn adjacency_tracks_bonds() {
        let mut mol = MoleculeGraph::new();
        let a = mol.add_atom(carbon());
        let b = mol.add_atom(carbon());
        let c = mol.add_atom(carbon());
        mol.add_bond(a, b, BondOrder::Single);
        mol.add_bond(b, c, BondOrder::Double);

        assert_eq!(mol.degree(b), 2);
        assert!(mol.bond_between(a, b).is_some());
        assert!(mol.bond_between(a, c).is_none());
    }

    #[test]
    fn bounded_bfs_caps_at_radius() {
        let mut mol = MoleculeGraph::new();
        let atoms: Vec<usize> = (0..5).map(|_| mol.add_atom(carbon())).collect();
        for w in atoms.windows(2) {
            mol.add_bond(w[0], w[1], BondOrder::Single);
        }
        let dist = mol.distances_within(0, 2);
        assert_eq!(dist[2], 2);
        assert_eq!(dist[3], usize::MAX);
    }

    #[test]
    fn components_counts_disconnected_pieces() {
        let mut mol = MoleculeGraph::new();
        let a = mol.add_atom(carbon());
        let b = mol.add_atom(carbon());
        mol.add_bond(a, b, BondOrder::Single);
        mol.add_atom(carbon());
        assert_eq!(mol.connected_components(), 2);
    }
}
