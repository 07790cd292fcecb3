use std::sync::Arc;

use crate::{Category, CategoryCounts, ClassificationTable, Policy, Task, TaskError};

/// Counts the residues of a sequence per [`Category`]
///
/// Residues are uppercased before lookup. Valid UTF-8 input is counted per
/// character, so a multi-byte residue such as `Å` counts once; anything else is
/// counted per byte. Residues without a table entry count as
/// [`Category::NonStandard`], so the counts always sum to the number of residues.
#[must_use]
pub fn classify(table: &ClassificationTable, residues: &[u8]) -> CategoryCounts {
    let mut freq = [0u64; 256];
    let mut wide = 0;
    match std::str::from_utf8(residues) {
        Ok(text) if !text.is_ascii() => {
            for c in text.chars() {
                if c.is_ascii() {
                    freq[c.to_ascii_uppercase() as usize] += 1;
                } else {
                    wide += 1;
                }
            }
        }
        _ => {
            for &residue in residues {
                freq[residue.to_ascii_uppercase() as usize] += 1;
            }
        }
    }

    let mut counts = CategoryCounts::new();
    counts.add(Category::NonStandard, wide);
    for (residue, &n) in freq.iter().enumerate() {
        if n > 0 {
            counts.add(table.category(residue as u8), n);
        }
    }
    counts
}

/// Trait for types that classify tasks inside the worker pool.
///
/// Each worker owns its own clone, so implementations may keep per-worker buffers
/// in `&mut self` without synchronization.
pub trait Classify: Send + Clone {
    /// Classify a single task
    fn classify(&mut self, task: &Task) -> Result<CategoryCounts, TaskError>;

    /// Set the worker ID for this classifier
    ///
    /// Each worker calls this method with its own unique ID before processing.
    #[allow(unused_variables)]
    fn set_tid(&mut self, tid: usize) {
        // Default implementation does nothing
    }

    /// Get the worker ID for this classifier
    fn get_tid(&self) -> Option<usize> {
        None
    }
}

/// The default classifier: a shared [`ClassificationTable`] plus a [`Policy`]
#[derive(Debug, Clone)]
pub struct ResidueClassifier {
    table: Arc<ClassificationTable>,
    policy: Policy,
    tid: Option<usize>,
}
impl ResidueClassifier {
    #[must_use]
    pub fn new(table: ClassificationTable, policy: Policy) -> Self {
        Self {
            table: Arc::new(table),
            policy,
            tid: None,
        }
    }

    #[must_use]
    pub fn with_policy(policy: Policy) -> Self {
        Self::new(ClassificationTable::standard(), policy)
    }

    #[must_use]
    pub fn table(&self) -> &ClassificationTable {
        &self.table
    }

    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy
    }
}
impl Default for ResidueClassifier {
    fn default() -> Self {
        Self::with_policy(Policy::default())
    }
}
impl Classify for ResidueClassifier {
    fn classify(&mut self, task: &Task) -> Result<CategoryCounts, TaskError> {
        self.policy.check(&task.sequence_id, &task.residues)?;
        Ok(classify(&self.table, &task.residues))
    }

    fn set_tid(&mut self, tid: usize) {
        self.tid = Some(tid);
    }

    fn get_tid(&self) -> Option<usize> {
        self.tid
    }
}
