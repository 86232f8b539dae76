/// What a deadline does once it is due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// The fadeout is over; swap in `album`.
    BeginSwap { album: usize },
    /// New media has had time to produce audio; start reacting to it.
    Settle,
    /// Give up on media that never became ready.
    ReadyTimeout,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timer {
    pub due_ms: f64,
    /// Session generation the timer was issued for.
    pub generation: u64,
    pub kind: TimerKind,
}

/// Deadlines checked against the frame clock instead of free-running
/// callbacks, so firing order stays on the render thread.
#[derive(Clone, Debug, Default)]
pub struct Timers {
    pending: Vec<Timer>,
}

impl Timers {
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, generation: u64, kind: TimerKind) {
        self.pending.push(Timer {
            due_ms: now_ms + delay_ms,
            generation,
            kind,
        });
    }

    /// Remove and return every timer due at `now_ms`, earliest first.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<Timer> {
        let mut due = Vec::new();
        self.pending.retain(|t| {
            if t.due_ms <= now_ms {
                due.push(*t);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_deadline_order() {
        let mut t = Timers::default();
        t.schedule(0.0, 1000.0, 1, TimerKind::BeginSwap { album: 2 });
        t.schedule(0.0, 100.0, 1, TimerKind::Settle);
        t.schedule(0.0, 5000.0, 1, TimerKind::ReadyTimeout);

        assert!(t.take_due(99.0).is_empty());
        let due = t.take_due(1000.0);
        let kinds: Vec<_> = due.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TimerKind::Settle, TimerKind::BeginSwap { album: 2 }]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let mut t = Timers::default();
        t.schedule(10.0, 0.0, 3, TimerKind::Settle);
        t.clear();
        assert!(t.is_empty());
        assert!(t.take_due(1e9).is_empty());
    }
}
