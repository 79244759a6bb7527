//! Class label table loaded once at startup.

use std::fs;
use std::path::Path;

use crate::error::ClassifyError;

/// Ordered, immutable list of class names.
///
/// The table's length must match the model's output dimensionality; the
/// decoder enforces that on every request.
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Build a table from an ordered list of names.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            labels: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a table from a text file with one label per line.
    ///
    /// Blank lines are skipped, surrounding whitespace is trimmed, order is
    /// preserved.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifyError> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_lines(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        ))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}
