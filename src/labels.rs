use crate::error::ConfigError;

const DEFAULT_LABELS: [&str; 5] = ["init", "prepare", "starting", "going", "finishing"];

/// Ordered, immutable table of phase labels.
///
/// Built once before any thread starts and only ever borrowed afterwards, so
/// reads need no synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Result<Self, ConfigError> {
        if labels.is_empty() {
            return Err(ConfigError::EmptyLabels);
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Bucket index of `step` out of `max`: `floor(step * len / max)`.
    ///
    /// Always in `[0, len)`; steps at or past `max` land in the last bucket.
    pub fn index_for(&self, step: usize, max: usize) -> usize {
        let last = self.labels.len() - 1;
        if max == 0 {
            return 0;
        }
        if step >= max {
            return last;
        }
        let index = (step as u128 * self.labels.len() as u128) / max as u128;
        (index as usize).min(last)
    }

    pub fn label_for(&self, step: usize, max: usize) -> &str {
        &self.labels[self.index_for(step, max)]
    }

    /// The label itself rather than its text, for channels that publish a
    /// reference into the table.
    pub fn entry_for(&self, step: usize, max: usize) -> &String {
        &self.labels[self.index_for(step, max)]
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self {
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}
