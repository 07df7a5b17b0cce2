use std::collections::HashMap;

/// Element symbols indexed by atomic number. Index 0 is a placeholder.
pub const SYMBOLS: [&str; 119] = [
    "*", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg",
    "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

lazy_static::lazy_static! {
    static ref BY_SYMBOL: HashMap<&'static str, u8> = SYMBOLS
        .iter()
        .enumerate()
        .skip(1)
        .map(|(num, sym)| (*sym, num as u8))
        .collect();
}

pub fn atomic_num(symbol: &str) -> Option<u8> {
    BY_SYMBOL.get(symbol).copied()
}

pub fn symbol(atomic_num: u8) -> &'static str {
    SYMBOLS.get(atomic_num as usize).copied().unwrap_or("*")
}

/// Default valences used to place implicit hydrogens on bare
/// (organic-subset) SMILES atoms. Empty slice means no implicit
/// hydrogens are ever added for the element.
pub fn default_valences(atomic_num: u8) -> &'static [u8] {
    match atomic_num {
        1 => &[1],           // H
        5 => &[3],           // B
        6 => &[4],           // C
        7 => &[3, 5],        // N
        8 => &[2],           // O
        9 | 17 | 35 => &[1], // F, Cl, Br
        15 => &[3, 5],       // P
        16 => &[2, 4, 6],    // S
        53 => &[1, 3, 5, 7], // I
        _ => &[],
    }
}

/// Elements that may be written without brackets in SMILES.
pub fn is_organic_subset(atomic_num: u8) -> bool {
    matches!(atomic_num, 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
}
