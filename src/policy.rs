use crate::TaskError;

/// Policy for handling residue bytes that are not printable ASCII
///
/// By default every residue outside the classification alphabet counts as
/// non-standard, whitespace and non-ASCII included. `Reject` is opt-in for
/// inputs where such bytes point to a malformed record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Policy {
    /// Classify the bytes as non-standard like any other unknown residue
    #[default]
    CountNonStandard,
    /// Fail the sequence with [`TaskError::InvalidResidue`]
    Reject,
}
impl Policy {
    /// Checks a sequence according to the policy
    ///
    /// Returns an error describing the first offending byte if the sequence must be
    /// rejected.
    pub fn check(&self, sequence_id: &str, residues: &[u8]) -> Result<(), TaskError> {
        match self {
            Self::CountNonStandard => Ok(()),
            Self::Reject => match residues.iter().position(|b| !b.is_ascii_graphic()) {
                Some(position) => Err(TaskError::InvalidResidue {
                    sequence_id: sequence_id.to_string(),
                    byte: residues[position],
                    position,
                }),
                None => Ok(()),
            },
        }
    }
}
