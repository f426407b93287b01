use std::fmt;
use std::path::PathBuf;

/// Which converter produced a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Nc,
    Deposit,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nc => write!(f, "NC"),
            Self::Deposit => write!(f, "Deposit"),
        }
    }
}

/// One file written by a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSummary {
    pub path: PathBuf,
    /// Layout or participant role the file was built for.
    pub variant: String,
    pub records: usize,
    /// First and last sequence numbers, for deposit files.
    pub sequence: Option<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub kind: BatchKind,
    pub input: PathBuf,
    /// Data rows left after blank rows were dropped.
    pub rows: usize,
    pub outputs: Vec<OutputSummary>,
}

impl BatchResult {
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.outputs.iter().map(|o| o.records).sum()
    }
}
