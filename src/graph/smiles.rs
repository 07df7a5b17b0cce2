use std::collections::HashMap;

use crate::graph::{elements, Atom, BondOrder, MoleculeGraph};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmilesError {
    #[error("empty SMILES")]
    Empty,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("unclosed bracket atom at position {pos}")]
    UnclosedBracket { pos: usize },
    #[error("unknown element '{symbol}' at position {pos}")]
    UnknownElement { pos: usize, symbol: String },
    #[error("ring-closure {digit} never closed")]
    UnmatchedRingBond { digit: u16 },
    #[error("unbalanced parenthesis at position {pos}")]
    UnbalancedParen { pos: usize },
    #[error("bond at position {pos} has no following atom")]
    DanglingBond { pos: usize },
}

/// Explicit bond token; `None` on a bond slot means the order is implied
/// by the adjacent atoms (aromatic-aromatic gives an aromatic bond).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BondTok {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondTok {
    fn order(self) -> BondOrder {
        match self {
            BondTok::Single => BondOrder::Single,
            BondTok::Double => BondOrder::Double,
            BondTok::Triple => BondOrder::Triple,
            BondTok::Aromatic => BondOrder::Aromatic,
        }
    }
}

/// Parse one SMILES string into a [`MoleculeGraph`].
///
/// Supports the organic subset, bracket atoms (isotope, chirality,
/// hydrogen count, charge, atom map), branches, ring closures (digits
/// and `%nn`), and dot-disconnected components. Stereo descriptors and
/// atom maps are consumed and discarded; fragment signatures do not
/// encode them. Implicit hydrogen counts are resolved from default
/// valences once the whole graph is known.
pub fn parse_smiles(input: &str) -> Result<MoleculeGraph, SmilesError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::Empty);
    }
    let mut parser = Parser::new(trimmed);
    parser.run()?;
    parser.finish()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    mol: MoleculeGraph,
    /// Explicit bracket hydrogen count per atom; `None` means bare atom.
    explicit_h: Vec<Option<u8>>,
    prev: Option<usize>,
    branch_stack: Vec<usize>,
    pending_bond: Option<(BondTok, usize)>,
    open_rings: HashMap<u16, (usize, Option<BondTok>)>,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            mol: MoleculeGraph::new(),
            explicit_h: Vec::new(),
            prev: None,
            branch_stack: Vec::new(),
            pending_bond: None,
            open_rings: HashMap::new(),
        }
    }

    fn run(&mut self) -> Result<(), SmilesError> {
        while self.pos < self.chars.len() {
            let pos = self.pos;
            match self.chars[pos] {
                ' ' | '\t' => {
                    self.pos += 1;
                }
                '[' => {
                    let (atom, hcount) = self.parse_bracket_atom()?;
                    self.push_atom(atom, Some(hcount));
                }
                '-' | '/' | '\\' => {
                    self.pending_bond = Some((BondTok::Single, pos));
                    self.pos += 1;
                }
                '=' => {
                    self.pending_bond = Some((BondTok::Double, pos));
                    self.pos += 1;
                }
                '#' => {
                    self.pending_bond = Some((BondTok::Triple, pos));
                    self.pos += 1;
                }
                ':' => {
                    self.pending_bond = Some((BondTok::Aromatic, pos));
                    self.pos += 1;
                }
                '(' => {
                    match self.prev {
                        Some(prev) => self.branch_stack.push(prev),
                        None => return Err(SmilesError::UnbalancedParen { pos }),
                    }
                    self.pos += 1;
                }
                ')' => {
                    let prev = self
                        .branch_stack
                        .pop()
                        .ok_or(SmilesError::UnbalancedParen { pos })?;
                    self.prev = Some(prev);
                    self.pos += 1;
                }
                '.' => {
                    if let Some((_, bond_pos)) = self.pending_bond {
                        return Err(SmilesError::DanglingBond { pos: bond_pos });
                    }
                    self.prev = None;
                    self.pos += 1;
                }
                '%' => {
                    if self.pos + 2 >= self.chars.len()
                        || !self.chars[self.pos + 1].is_ascii_digit()
                        || !self.chars[self.pos + 2].is_ascii_digit()
                    {
                        return Err(SmilesError::UnexpectedChar { pos, ch: '%' });
                    }
                    let digit = (self.chars[self.pos + 1] as u16 - '0' as u16) * 10
                        + (self.chars[self.pos + 2] as u16 - '0' as u16);
                    self.pos += 3;
                    self.ring_closure(digit, pos)?;
                }
                d @ '0'..='9' => {
                    self.pos += 1;
                    self.ring_closure(d as u16 - '0' as u16, pos)?;
                }
                _ => {
                    let atom = self.parse_bare_atom()?;
                    self.push_atom(atom, None);
                }
            }
        }

        if let Some((_, bond_pos)) = self.pending_bond {
            return Err(SmilesError::DanglingBond { pos: bond_pos });
        }
        if !self.branch_stack.is_empty() {
            return Err(SmilesError::UnbalancedParen {
                pos: self.chars.len(),
            });
        }
        if let Some(digit) = self.open_rings.keys().min().copied() {
            return Err(SmilesError::UnmatchedRingBond { digit });
        }
        Ok(())
    }

    fn finish(mut self) -> Result<MoleculeGraph, SmilesError> {
        for idx in 0..self.mol.atom_count() {
            let hydrogens = match self.explicit_h[idx] {
                Some(count) => count,
                None => implicit_hydrogens(&self.mol, idx),
            };
            self.mol.atom_mut(idx).hydrogen_count = hydrogens;
        }
        Ok(self.mol)
    }

    fn push_atom(&mut self, atom: Atom, explicit_h: Option<u8>) {
        let idx = self.mol.add_atom(atom);
        self.explicit_h.push(explicit_h);
        if let Some(prev) = self.prev {
            let order = self.take_bond_order(prev, idx);
            self.mol.add_bond(prev, idx, order);
        }
        self.prev = Some(idx);
    }

    fn take_bond_order(&mut self, a: usize, b: usize) -> BondOrder {
        match self.pending_bond.take() {
            Some((tok, _)) => tok.order(),
            None => {
                if self.mol.atom(a).is_aromatic && self.mol.atom(b).is_aromatic {
                    BondOrder::Aromatic
                } else {
                    BondOrder::Single
                }
            }
        }
    }

    fn ring_closure(&mut self, digit: u16, pos: usize) -> Result<(), SmilesError> {
        let ch = self.chars[pos];
        let current = match self.prev {
            Some(atom) => atom,
            None => return Err(SmilesError::UnexpectedChar { pos, ch }),
        };
        let pending = self.pending_bond.take().map(|(tok, _)| tok);

        match self.open_rings.remove(&digit) {
            Some((open_atom, open_bond)) => {
                if open_atom == current || self.mol.bond_between(open_atom, current).is_some() {
                    return Err(SmilesError::UnexpectedChar { pos, ch });
                }
                let order = match open_bond.or(pending) {
                    Some(tok) => tok.order(),
                    None => {
                        if self.mol.atom(open_atom).is_aromatic
                            && self.mol.atom(current).is_aromatic
                        {
                            BondOrder::Aromatic
                        } else {
                            BondOrder::Single
                        }
                    }
                };
                self.mol.add_bond(open_atom, current, order);
            }
            None => {
                self.open_rings.insert(digit, (current, pending));
            }
        }
        Ok(())
    }

    fn parse_bare_atom(&mut self) -> Result<Atom, SmilesError> {
        let pos = self.pos;
        let ch = self.chars[pos];

        // Two-letter organic-subset symbols first.
        if ch == 'C' && self.chars.get(pos + 1) == Some(&'l') {
            self.pos += 2;
            return Ok(bare(17, false));
        }
        if ch == 'B' && self.chars.get(pos + 1) == Some(&'r') {
            self.pos += 2;
            return Ok(bare(35, false));
        }

        let (num, aromatic) = match ch {
            'B' => (5, false),
            'C' => (6, false),
            'N' => (7, false),
            'O' => (8, false),
            'P' => (15, false),
            'S' => (16, false),
            'F' => (9, false),
            'I' => (53, false),
            'b' => (5, true),
            'c' => (6, true),
            'n' => (7, true),
            'o' => (8, true),
            'p' => (15, true),
            's' => (16, true),
            other => return Err(SmilesError::UnexpectedChar { pos, ch: other }),
        };
        self.pos += 1;
        Ok(bare(num, aromatic))
    }

    fn parse_bracket_atom(&mut self) -> Result<(Atom, u8), SmilesError> {
        let start = self.pos;
        self.pos += 1; // '['

        let isotope = self.read_digits_u16();
        let (atomic_num, is_aromatic) = self.parse_bracket_symbol(start)?;

        // Chirality markers are recognized and dropped.
        while self.peek() == Some('@') {
            self.pos += 1;
        }

        let hydrogens = if self.peek() == Some('H') {
            self.pos += 1;
            match self.peek() {
                Some(d) if d.is_ascii_digit() => {
                    self.pos += 1;
                    d as u8 - b'0'
                }
                _ => 1,
            }
        } else {
            0
        };

        let formal_charge = self.parse_charge();

        // Atom-map class, parsed and discarded.
        if self.peek() == Some(':') {
            self.pos += 1;
            let _ = self.read_digits_u16();
        }

        if self.peek() != Some(']') {
            return Err(SmilesError::UnclosedBracket { pos: start });
        }
        self.pos += 1;

        Ok((
            Atom {
                atomic_num,
                formal_charge,
                isotope,
                hydrogen_count: 0,
                is_aromatic,
            },
            hydrogens,
        ))
    }

    fn parse_bracket_symbol(&mut self, bracket_start: usize) -> Result<(u8, bool), SmilesError> {
        let pos = self.pos;
        let first = self
            .peek()
            .ok_or(SmilesError::UnclosedBracket { pos: bracket_start })?;

        if first.is_ascii_lowercase() {
            // Aromatic symbols: two-letter se/te/as, then the one-letter set.
            let second = self.chars.get(pos + 1).copied();
            let two: Option<u8> = match (first, second) {
                ('s', Some('e')) => Some(34),
                ('t', Some('e')) => Some(52),
                ('a', Some('s')) => Some(33),
                _ => None,
            };
            if let Some(num) = two {
                self.pos += 2;
                return Ok((num, true));
            }
            let num = match first {
                'b' => 5,
                'c' => 6,
                'n' => 7,
                'o' => 8,
                'p' => 15,
                's' => 16,
                other => {
                    return Err(SmilesError::UnknownElement {
                        pos,
                        symbol: other.to_string(),
                    })
                }
            };
            self.pos += 1;
            return Ok((num, true));
        }

        if !first.is_ascii_uppercase() {
            return Err(SmilesError::UnknownElement {
                pos,
                symbol: first.to_string(),
            });
        }

        // Greedy two-letter match, then one-letter.
        if let Some(second) = self.chars.get(pos + 1).copied() {
            if second.is_ascii_lowercase() {
                let symbol: String = [first, second].iter().collect();
                if let Some(num) = elements::atomic_num(&symbol) {
                    self.pos += 2;
                    return Ok((num, false));
                }
            }
        }
        let symbol = first.to_string();
        match elements::atomic_num(&symbol) {
            Some(num) => {
                self.pos += 1;
                Ok((num, false))
            }
            None => Err(SmilesError::UnknownElement { pos, symbol }),
        }
    }

    fn parse_charge(&mut self) -> i8 {
        let sign: i8 = match self.peek() {
            Some('+') => 1,
            Some('-') => -1,
            _ => return 0,
        };
        self.pos += 1;

        // Repeated signs (e.g. ++) or an explicit magnitude.
        let mut magnitude: i8 = 1;
        while self.peek() == Some(if sign > 0 { '+' } else { '-' }) {
            magnitude = magnitude.saturating_add(1);
            self.pos += 1;
        }
        if magnitude == 1 {
            if let Some(d) = self.peek().filter(|c| c.is_ascii_digit()) {
                magnitude = d as i8 - b'0' as i8;
                self.pos += 1;
            }
        }
        sign * magnitude
    }

    fn read_digits_u16(&mut self) -> u16 {
        let mut value: u16 = 0;
        while let Some(d) = self.peek().filter(|c| c.is_ascii_digit()) {
            value = value.saturating_mul(10).saturating_add(d as u16 - '0' as u16);
            self.pos += 1;
        }
        value
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }
}

fn bare(atomic_num: u8, is_aromatic: bool) -> Atom {
    Atom {
        atomic_num,
        is_aromatic,
        ..Default::default()
    }
}

/// Implicit hydrogen count for a bare atom: the smallest default valence
/// that covers the bond-order sum, minus that sum. Aromatic atoms give
/// up one implicit hydrogen since their aromatic bonds each counted as
/// single.
fn implicit_hydrogens(mol: &MoleculeGraph, idx: usize) -> u8 {
    let valences = elements::default_valences(mol.atom(idx).atomic_num);
    if valences.is_empty() {
        return 0;
    }
    let bond_sum: u8 = mol
        .neighbors(idx)
        .iter()
        .map(|&(_, bond)| mol.bond(bond).order.valence_units())
        .sum();

    let target = match valences.iter().find(|&&v| v >= bond_sum) {
        Some(&v) => v,
        None => return 0,
    };
    let mut hydrogens = target - bond_sum;
    if mol.atom(idx).is_aromatic && hydrogens > 0 {
        hydrogens -= 1;
    }
    hydrogens
}
