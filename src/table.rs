//! Residue to category lookup table.
//!
//! The standard table encodes the classic hydrophobicity grouping of the twenty
//! standard amino acids. It is a `const`, so it is built at compile time and shared
//! by every worker without synchronization.

use crate::{Category, ConfigError};

pub const HYDROPHOBIC: &[u8] = b"AVILMFWCPG";
pub const HYDROPHILIC_NEUTRAL: &[u8] = b"STNQY";
pub const HYDROPHILIC_POSITIVE: &[u8] = b"KRH";
pub const HYDROPHILIC_NEGATIVE: &[u8] = b"DE";

/// Maps single residue bytes to their [`Category`]
///
/// Entries are keyed by the uppercase residue. Bytes without an entry are
/// non-standard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationTable {
    lookup: [Option<Category>; 256],
}
impl ClassificationTable {
    /// The standard amino acid table
    #[must_use]
    pub const fn standard() -> Self {
        let lookup = [None; 256];
        let lookup = fill(lookup, HYDROPHOBIC, Category::Hydrophobic);
        let lookup = fill(lookup, HYDROPHILIC_NEUTRAL, Category::HydrophilicNeutral);
        let lookup = fill(lookup, HYDROPHILIC_POSITIVE, Category::HydrophilicPositive);
        let lookup = fill(lookup, HYDROPHILIC_NEGATIVE, Category::HydrophilicNegative);
        Self { lookup }
    }

    /// Builds a custom table from residue groups
    ///
    /// Residues are uppercased. Every residue may appear in at most one group and
    /// groups may not target [`Category::NonStandard`].
    pub fn from_groups(groups: &[(Category, &[u8])]) -> Result<Self, ConfigError> {
        let mut lookup = [None; 256];
        for &(category, residues) in groups {
            if category == Category::NonStandard {
                return Err(ConfigError::NonStandardGroup);
            }
            for &residue in residues {
                if !residue.is_ascii_graphic() {
                    return Err(ConfigError::NonAsciiResidue(residue));
                }
                let residue = residue.to_ascii_uppercase();
                match lookup[residue as usize] {
                    Some(first) if first != category => {
                        return Err(ConfigError::DuplicateResidue {
                            residue: residue as char,
                            first,
                            second: category,
                        })
                    }
                    _ => lookup[residue as usize] = Some(category),
                }
            }
        }
        Ok(Self { lookup })
    }

    /// Returns the entry for an already uppercased residue, if any
    #[inline]
    #[must_use]
    pub fn get(&self, residue: u8) -> Option<Category> {
        self.lookup[residue as usize]
    }

    /// Returns the category of a residue, normalizing case and falling back to
    /// [`Category::NonStandard`]
    #[inline]
    #[must_use]
    pub fn category(&self, residue: u8) -> Category {
        self.get(residue.to_ascii_uppercase())
            .unwrap_or(Category::NonStandard)
    }

    /// All residues assigned to `category`, in byte order
    #[must_use]
    pub fn residues(&self, category: Category) -> Vec<u8> {
        (0..=u8::MAX)
            .filter(|&b| self.lookup[b as usize] == Some(category))
            .collect()
    }
}
impl Default for ClassificationTable {
    fn default() -> Self {
        Self::standard()
    }
}

const fn fill(
    mut lookup: [Option<Category>; 256],
    residues: &[u8],
    category: Category,
) -> [Option<Category>; 256] {
    let mut i = 0;
    while i < residues.len() {
        lookup[residues[i] as usize] = Some(category);
        i += 1;
    }
    lookup
}
