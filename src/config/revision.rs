//! Configuration revision counter.

/// Identifies one committed state of the options.
///
/// Renderers remember the revision they last adapted to and compare it to
/// the current one to detect staleness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

impl Revision {
    pub const ZERO: Self = Self(0);

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Monotonic source of revisions. Starts at zero and only moves forward.
#[derive(Debug, Default)]
pub struct RevisionTracker {
    current: Revision,
}

impl RevisionTracker {
    pub const fn current(&self) -> Revision {
        self.current
    }

    pub const fn bump(&mut self) -> Revision {
        self.current = Revision(self.current.0.saturating_add(1));
        self.current
    }
}
