use std::fmt;

/// Atom selection, rendered in the NGL selection language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Atoms whose residue name equals the given name: `[ALA]`.
    ResidueName(String),
    /// Atoms at the given 0-based indices: `@0 or @4 or @9`.
    AtomIndices(Vec<u32>),
}

impl Selection {
    /// Select atoms by 1-based structure serials.
    ///
    /// Serial `s` maps to renderer index `s - 1`. A serial of 0 has no
    /// index and is skipped.
    #[must_use]
    pub fn from_serials(serials: &[u32]) -> Self {
        Self::AtomIndices(
            serials
                .iter()
                .filter_map(|serial| serial.checked_sub(1))
                .collect(),
        )
    }

    /// Whether the selection can match nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::ResidueName(name) => name.is_empty(),
            Self::AtomIndices(indices) => indices.is_empty(),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResidueName(name) => write!(f, "[{name}]"),
            Self::AtomIndices(indices) if indices.is_empty() => {
                write!(f, "none")
            }
            Self::AtomIndices(indices) => {
                for (i, index) in indices.iter().enumerate() {
                    if i > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "@{index}")?;
                }
                Ok(())
            }
        }
    }
}
