/// Final outcome of one processed target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    New,
    Overwritten,
    Renamed,
    Skipped,
    Error,
}

/// Counters for one invocation
///
/// Passed by `&mut` through every processing step; nothing outlives the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub new: usize,
    pub overwritten: usize,
    pub renamed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one target
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::New => self.new += 1,
            Outcome::Overwritten => self.overwritten += 1,
            Outcome::Renamed => self.renamed += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Error => self.errors += 1,
        }
    }

    /// Record several skipped inputs at once (rejected list entries)
    pub fn record_skipped(&mut self, count: usize) {
        self.skipped += count;
    }

    /// Record a failure that doesn't replace the target's own outcome
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn total(&self) -> usize {
        self.new + self.overwritten + self.renamed + self.skipped + self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut summary = RunSummary::new();
        summary.record(Outcome::New);
        summary.record(Outcome::New);
        summary.record(Outcome::Renamed);
        summary.record(Outcome::Error);
        summary.record_skipped(3);

        assert_eq!(summary.new, 2);
        assert_eq!(summary.renamed, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.overwritten, 0);
        assert_eq!(summary.total(), 7);
    }
}
