//! Batch jobs over the association registry
//!
//! - [`update_homepages`]: resolve every stored raw homepage
//! - [`refresh_imprints`]: crawl every resolved homepage for its imprint
//!
//! Per-record failures never abort a job; they become problem records and
//! the job moves on to the next association.

mod homepages;
mod imprints;

pub use homepages::{resolve_association, update_homepages};
pub use imprints::{refresh_imprint, refresh_imprints, Paging};

use std::fmt;

/// Counters for one job run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
    /// Records looked at
    pub processed: u32,
    /// Records whose stored link was set
    pub updated: u32,
    /// Records with nothing to do
    pub skipped: u32,
    /// Problem records written
    pub problems: u32,
    /// The run stopped early on request
    pub cancelled: bool,
}

impl JobSummary {
    pub fn merge(&mut self, other: &JobSummary) {
        self.processed += other.processed;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.problems += other.problems;
        self.cancelled |= other.cancelled;
    }
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {}, updated {}, skipped {}, problems {}",
            self.processed, self.updated, self.skipped, self.problems
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}
