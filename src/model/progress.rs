use std::fmt;

/// The working states of a submission run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStep {
    Creating,
    Uploading,
    Patching,
}

impl RunStep {
    /// Human-readable label shown next to the progress bar.
    pub fn label(self) -> &'static str {
        match self {
            RunStep::Creating => "Creating blog post...",
            RunStep::Uploading => "Uploading featured image...",
            RunStep::Patching => "Updating post with featured image...",
        }
    }
}

impl fmt::Display for RunStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStep::Creating => write!(f, "creating"),
            RunStep::Uploading => write!(f, "uploading"),
            RunStep::Patching => write!(f, "patching"),
        }
    }
}

/// Progress snapshot published before each working state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    /// 1-based index of the current step.
    pub step: u8,
    pub total: u8,
    pub current: RunStep,
    pub label: &'static str,
}

impl ProgressState {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let total = u16::from(self.total);
        ((u16::from(self.step) * 100 + total / 2) / total) as u8
    }
}

impl fmt::Display for ProgressState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} of {}: {}", self.step, self.total, self.label)
    }
}
