/// Recomputations the host list view can schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recompute {
    WatchSelection,
    CountCategoryHosts,
    Filter,
    DoFilter,
    MonitorStatuses,
}

/// Coalesces bursts of changes into one recompute per turn.
///
/// `once` schedules work for the current turn and ignores duplicates.
/// `next` defers work until the current turn has drained.
#[derive(Debug, Default)]
pub struct RunLoop {
    current: Vec<Recompute>,
    deferred: Vec<Recompute>,
}

impl RunLoop {
    pub fn once(&mut self, task: Recompute) {
        if !self.current.contains(&task) {
            self.current.push(task);
        }
    }

    pub fn next(&mut self, task: Recompute) {
        if !self.deferred.contains(&task) {
            self.deferred.push(task);
        }
    }

    pub fn take_current(&mut self) -> Vec<Recompute> {
        std::mem::take(&mut self.current)
    }

    /// Moves deferred work into the current turn. Returns false when there was none.
    pub fn advance(&mut self) -> bool {
        if self.deferred.is_empty() {
            return false;
        }
        let deferred = std::mem::take(&mut self.deferred);
        for task in deferred {
            self.once(task);
        }
        true
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_empty() && self.deferred.is_empty()
    }

    pub fn is_scheduled(&self, task: Recompute) -> bool {
        self.current.contains(&task) || self.deferred.contains(&task)
    }
}
