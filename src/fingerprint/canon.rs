use std::collections::HashMap;

use crate::graph::{elements, BondOrder, MoleculeGraph};

/// Canonical textual signature of an induced subgraph.
///
/// The signature lists atom labels in canonical order, then bonds as
/// canonical index pairs, e.g. `C,C,O|0-1,1-2`. It is invariant under
/// any relabeling of the input atoms: canonical order comes from
/// invariant-seeded iterative refinement, with remaining ties broken by
/// individualization and taking the lexicographically smallest
/// serialization over all branches.
///
/// `center` marks the neighborhood root with `*` and feeds the initial
/// invariant, so rooted signatures distinguish otherwise symmetric
/// positions.
pub fn canonical_signature(
    mol: &MoleculeGraph,
    atom_set: &[usize],
    center: Option<usize>,
    include_hydrogens: bool,
) -> String {
    let sub = Subgraph::induce(mol, atom_set, center, include_hydrogens);
    let mut ranks = sub.initial_ranks();
    sub.refine(&mut ranks);
    sub.minimal_serialization(&ranks)
}

struct Subgraph {
    labels: Vec<String>,
    /// Seed invariants, one per local atom, already order-comparable.
    seeds: Vec<(u8, i8, u16, bool, u8, u8, bool)>,
    adjacency: Vec<Vec<(usize, BondOrder)>>,
    bonds: Vec<(usize, usize, BondOrder)>,
}

impl Subgraph {
    fn induce(
        mol: &MoleculeGraph,
        atom_set: &[usize],
        center: Option<usize>,
        include_hydrogens: bool,
    ) -> Self {
        let local: HashMap<usize, usize> = atom_set
            .iter()
            .enumerate()
            .map(|(i, &global)| (global, i))
            .collect();

        let n = atom_set.len();
        let mut adjacency: Vec<Vec<(usize, BondOrder)>> = vec![Vec::new(); n];
        let mut bonds = Vec::new();
        for (i, &global) in atom_set.iter().enumerate() {
            for &(nb, bond) in mol.neighbors(global) {
                if let Some(&j) = local.get(&nb) {
                    let order = mol.bond(bond).order;
                    adjacency[i].push((j, order));
                    if i < j {
                        bonds.push((i, j, order));
                    }
                }
            }
        }

        let mut labels = Vec::with_capacity(n);
        let mut seeds = Vec::with_capacity(n);
        for (i, &global) in atom_set.iter().enumerate() {
            let atom = mol.atom(global);
            let is_center = center == Some(global);
            let hydrogens = if include_hydrogens {
                atom.hydrogen_count
            } else {
                0
            };
            labels.push(atom_label(
                atom.atomic_num,
                atom.is_aromatic,
                atom.formal_charge,
                atom.isotope,
                include_hydrogens.then_some(atom.hydrogen_count),
                is_center,
            ));
            seeds.push((
                atom.atomic_num,
                atom.formal_charge,
                atom.isotope,
                atom.is_aromatic,
                adjacency[i].len() as u8,
                hydrogens,
                is_center,
            ));
        }

        Self {
            labels,
            seeds,
            adjacency,
            bonds,
        }
    }

    fn initial_ranks(&self) -> Vec<usize> {
        dense_ranks(&self.seeds)
    }

    /// Iterative neighborhood refinement. Keys are exact sorted tuples,
    /// so two atoms share a rank only when their refinement views are
    /// truly identical.
    fn refine(&self, ranks: &mut Vec<usize>) {
        let n = ranks.len();
        let mut distinct = count_distinct(ranks);
        loop {
            let keys: Vec<(usize, Vec<(u8, usize)>)> = (0..n)
                .map(|i| {
                    let mut neighborhood: Vec<(u8, usize)> = self.adjacency[i]
                        .iter()
                        .map(|&(nb, order)| (order_code(order), ranks[nb]))
                        .collect();
                    neighborhood.sort_unstable();
                    (ranks[i], neighborhood)
                })
                .collect();
            let new_ranks = dense_ranks(&keys);
            let new_distinct = count_distinct(&new_ranks);
            if new_distinct <= distinct {
                return;
            }
            *ranks = new_ranks;
            distinct = new_distinct;
        }
    }

    /// Resolve remaining symmetry by individualizing each member of the
    /// first tied class in turn and keeping the smallest serialization.
    fn minimal_serialization(&self, ranks: &[usize]) -> String {
        let n = ranks.len();
        if count_distinct(ranks) == n {
            return self.serialize(ranks);
        }

        let tied_rank = (0..n)
            .map(|i| ranks[i])
            .filter(|&r| ranks.iter().filter(|&&x| x == r).count() > 1)
            .min()
            .unwrap_or(0);

        let mut best: Option<String> = None;
        for i in (0..n).filter(|&i| ranks[i] == tied_rank) {
            let mut branch: Vec<usize> = ranks.iter().map(|&r| r * 2 + 1).collect();
            branch[i] -= 1;
            self.refine(&mut branch);
            let candidate = self.minimal_serialization(&branch);
            if best.as_ref().is_none_or(|b| candidate < *b) {
                best = Some(candidate);
            }
        }
        best.unwrap_or_default()
    }

    fn serialize(&self, ranks: &[usize]) -> String {
        let n = ranks.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_unstable_by_key(|&i| ranks[i]);

        let atoms = order
            .iter()
            .map(|&i| self.labels[i].as_str())
            .collect::<Vec<_>>()
            .join(",");

        let mut bond_text: Vec<String> = self
            .bonds
            .iter()
            .map(|&(a, b, bond_order)| {
                let (lo, hi) = if ranks[a] < ranks[b] {
                    (ranks[a], ranks[b])
                } else {
                    (ranks[b], ranks[a])
                };
                format!("{lo}{}{hi}", bond_order.symbol())
            })
            .collect();
        bond_text.sort_unstable();

        if bond_text.is_empty() {
            atoms
        } else {
            format!("{atoms}|{}", bond_text.join(","))
        }
    }
}

fn atom_label(
    atomic_num: u8,
    is_aromatic: bool,
    formal_charge: i8,
    isotope: u16,
    hydrogens: Option<u8>,
    is_center: bool,
) -> String {
    let mut label = String::new();
    if isotope != 0 {
        label.push_str(&isotope.to_string());
    }
    let symbol = elements::symbol(atomic_num);
    if is_aromatic {
        label.push_str(&symbol.to_lowercase());
    } else {
        label.push_str(symbol);
    }
    if let Some(count) = hydrogens {
        label.push('H');
        label.push_str(&count.to_string());
    }
    match formal_charge {
        0 => {}
        1 => label.push('+'),
        -1 => label.push('-'),
        c if c > 1 => label.push_str(&format!("+{c}")),
        c => label.push_str(&format!("-{}", -c)),
    }
    if is_center {
        label.push('*');
    }
    label
}

fn order_code(order: BondOrder) -> u8 {
    match order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
        BondOrder::Aromatic => 4,
    }
}

fn dense_ranks<K: Ord>(keys: &[K]) -> Vec<usize> {
    let n = keys.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    let mut ranks = vec![0usize; n];
    let mut rank = 0;
    for w in 0..n {
        if w > 0 && keys[indices[w]] != keys[indices[w - 1]] {
            rank += 1;
        }
        ranks[indices[w]] = rank;
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}
