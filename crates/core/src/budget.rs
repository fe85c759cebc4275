use std::sync::atomic::{AtomicUsize, Ordering};

/// Run-wide cap on how many image attachments may go through OCR.
///
/// The counter only grows; there is no release.
#[derive(Debug)]
pub struct ImageBudget {
    cap: Option<usize>,
    used: AtomicUsize,
}

impl ImageBudget {
    pub fn new(cap: Option<usize>) -> Self {
        Self {
            cap,
            used: AtomicUsize::new(0),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Claims one slot if the count is strictly below the cap.
    pub fn try_acquire(&self) -> bool {
        let Some(cap) = self.cap else {
            self.used.fetch_add(1, Ordering::Relaxed);
            return true;
        };

        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                (used < cap).then_some(used + 1)
            })
            .is_ok()
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::ImageBudget;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn concurrent_acquires_never_exceed_cap() {
        const WORKERS: usize = 32;
        const CAP: usize = 7;

        let budget = ImageBudget::new(Some(CAP));
        let barrier = Barrier::new(WORKERS);

        let granted: usize = thread::scope(|scope| {
            let handles: Vec<_> = (0..WORKERS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        budget.try_acquire()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| usize::from(handle.join().expect("worker panicked")))
                .sum()
        });

        assert_eq!(granted, CAP);
        assert_eq!(budget.used(), CAP);
    }

    #[test]
    fn unbounded_budget_always_grants() {
        let budget = ImageBudget::unbounded();
        assert!((0..1_000).all(|_| budget.try_acquire()));
        assert_eq!(budget.used(), 1_000);
    }

    #[test]
    fn zero_cap_rejects_everything() {
        let budget = ImageBudget::new(Some(0));
        assert!(!budget.try_acquire());
        assert_eq!(budget.used(), 0);
    }
}
