use crate::budget::ImageBudget;
use crate::extractor::ExtractorRegistry;
use crate::models::{ExtractionResult, SearchOptions};
use crate::queue::WorkQueue;
use crate::sink::ResultSink;
use crate::traits::ContentApi;
use crate::worker::SearchWorker;
use std::thread;
use tracing::{error, info, info_span};

/// Runs a pool of search workers over a fixed set of terms.
pub struct SearchCoordinator<A>
where
    A: ContentApi,
{
    api: A,
    extractors: ExtractorRegistry,
    options: SearchOptions,
}

impl<A> SearchCoordinator<A>
where
    A: ContentApi,
{
    pub fn new(api: A, extractors: ExtractorRegistry, options: SearchOptions) -> Self {
        Self {
            api,
            extractors,
            options,
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Searches every term and returns all records once the queue is
    /// fully processed.
    pub fn run(&self, terms: Vec<String>) -> Vec<ExtractionResult> {
        let queue = WorkQueue::new();
        queue.extend(terms);
        let sink = ResultSink::new();
        let budget = ImageBudget::new(self.options.max_images);

        let workers = self.options.workers.max(1);
        info!(terms = queue.pending(), workers, "starting search workers");

        thread::scope(|scope| {
            let mut started = 0;
            for index in 0..workers {
                let worker = SearchWorker::new(
                    &self.api,
                    &self.extractors,
                    &sink,
                    &budget,
                    &self.options,
                );
                let queue = &queue;
                let spawned = thread::Builder::new()
                    .name(format!("search-worker-{index}"))
                    .spawn_scoped(scope, move || {
                        let _span = info_span!("worker", index).entered();
                        worker.run(queue)
                    });

                match spawned {
                    Ok(_) => started += 1,
                    Err(error) => error!(index, %error, "could not start search worker"),
                }
            }

            if started == 0 {
                SearchWorker::new(&self.api, &self.extractors, &sink, &budget, &self.options)
                    .run(&queue);
            }

            queue.wait_drained();
        });

        info!(
            records = sink.len(),
            images = budget.used(),
            "all search terms processed"
        );
        sink.into_records()
    }
}
