use crate::graph::{parse_smiles, MoleculeGraph, SmilesError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReactionError {
    #[error("expected 'reactants>agents>products', found {separators} '>' separator(s)")]
    MalformedSeparators { separators: usize },
    #[error("{side} molecule {position}: {source}")]
    Molecule {
        side: &'static str,
        position: usize,
        #[source]
        source: SmilesError,
    },
}

/// One reaction: ordered reactant and product graphs. Agent molecules
/// (the middle section of the reaction SMILES) take no part in fragment
/// extraction and are dropped at parse time.
#[derive(Debug, Clone, Default)]
pub struct Reaction {
    pub reactants: Vec<MoleculeGraph>,
    pub products: Vec<MoleculeGraph>,
}

/// Parse a reaction SMILES line (`reactants>agents>products`, or
/// `reactants>>products` for an empty agent section).
pub fn parse_reaction_smiles(line: &str) -> Result<Reaction, ReactionError> {
    let line = line.trim();
    let separators = gt_positions(line);
    if separators.len() != 2 {
        return Err(ReactionError::MalformedSeparators {
            separators: separators.len(),
        });
    }

    let reactant_text = &line[..separators[0]];
    let product_text = &line[separators[1] + 1..];

    Ok(Reaction {
        reactants: parse_side(reactant_text, "reactant")?,
        products: parse_side(product_text, "product")?,
    })
}

fn parse_side(text: &str, side: &'static str) -> Result<Vec<MoleculeGraph>, ReactionError> {
    split_on_dot(text)
        .into_iter()
        .enumerate()
        .map(|(position, smiles)| {
            parse_smiles(smiles).map_err(|source| ReactionError::Molecule {
                side,
                position,
                source,
            })
        })
        .collect()
}

/// Positions of `>` separators outside brackets and parentheses.
fn gt_positions(line: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut bracket_depth = 0u32;
    let mut paren_depth = 0u32;
    for (i, ch) in line.char_indices() {
        match ch {
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            '(' => paren_depth += 1,
            ')' => paren_depth = paren_depth.saturating_sub(1),
            '>' if bracket_depth == 0 && paren_depth == 0 => positions.push(i),
            _ => {}
        }
    }
    positions
}

/// Split one reaction side into molecule texts on depth-0 dots.
fn split_on_dot(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut bracket_depth = 0u32;
    let mut paren_depth = 0u32;
    for (i, ch) in text.char_indices() {
        match ch {
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            '(' => paren_depth += 1,
            ')' => paren_depth = paren_depth.saturating_sub(1),
            '.' if bracket_depth == 0 && paren_depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}
