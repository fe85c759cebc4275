use crate::models::ExtractionResult;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Append-only collection shared by all workers for the duration of a run.
///
/// Appends from one worker keep their relative order; interleaving
/// between workers is unspecified. `into_records` consumes the sink, so
/// nothing can be appended after the final drain.
#[derive(Debug, Default)]
pub struct ResultSink {
    records: Mutex<Vec<ExtractionResult>>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: ExtractionResult) {
        self.lock().push(record);
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn into_records(self) -> Vec<ExtractionResult> {
        self.records
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // A worker that panicked mid-append cannot leave a half-written Vec
    // behind, so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Vec<ExtractionResult>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::ResultSink;
    use crate::models::{ExtractionResult, PageInfo};
    use std::collections::HashSet;
    use std::thread;

    fn record(worker: usize, index: usize) -> ExtractionResult {
        ExtractionResult::Page {
            page: PageInfo {
                url: format!("https://wiki/{worker}/{index}"),
                title: format!("w{worker}-{index}"),
            },
        }
    }

    #[test]
    fn concurrent_appends_are_neither_lost_nor_duplicated() {
        const WORKERS: usize = 8;
        const PER_WORKER: usize = 250;

        let sink = ResultSink::new();
        thread::scope(|scope| {
            for worker in 0..WORKERS {
                let sink = &sink;
                scope.spawn(move || {
                    for index in 0..PER_WORKER {
                        sink.append(record(worker, index));
                    }
                });
            }
        });

        let records = sink.into_records();
        assert_eq!(records.len(), WORKERS * PER_WORKER);

        let unique: HashSet<_> = records.iter().map(|r| r.page().url.clone()).collect();
        assert_eq!(unique.len(), WORKERS * PER_WORKER);
    }

    #[test]
    fn per_worker_order_is_preserved() {
        let sink = ResultSink::new();
        thread::scope(|scope| {
            for worker in 0..4 {
                let sink = &sink;
                scope.spawn(move || {
                    for index in 0..100 {
                        sink.append(record(worker, index));
                    }
                });
            }
        });

        let records = sink.into_records();
        for worker in 0..4 {
            let prefix = format!("w{worker}-");
            let indices: Vec<usize> = records
                .iter()
                .filter_map(|r| r.page().title.strip_prefix(&prefix))
                .map(|rest| rest.parse().expect("numeric suffix"))
                .collect();
            assert_eq!(indices, (0..100).collect::<Vec<_>>());
        }
    }
}
