use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};

use crate::dispatch::SingleCallDispatcher;
use crate::response::{Outcome, WireResult};
use crate::validate::Entry;

/// Fans classified entries out to the dispatcher and collapses the outcomes.
#[derive(Clone)]
pub struct BatchCoordinator {
    dispatcher: SingleCallDispatcher,
    max_concurrency: usize,
}

impl BatchCoordinator {
    pub fn new(dispatcher: SingleCallDispatcher, max_concurrency: usize) -> Self {
        Self {
            dispatcher,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Entries run concurrently up to the configured limit; outcomes keep the
    /// input order.
    pub async fn coordinate(&self, entries: Vec<Entry>, ambient: &Map<String, Value>) -> WireResult {
        let outcomes: Vec<Outcome> = stream::iter(entries)
            .map(|entry| self.resolve(entry, ambient))
            .buffered(self.max_concurrency)
            .collect()
            .await;

        WireResult::from_outcomes(outcomes)
    }

    async fn resolve(&self, entry: Entry, ambient: &Map<String, Value>) -> Outcome {
        match entry {
            Entry::Call(request) => self.dispatcher.dispatch(request, ambient).await,
            Entry::Invalid(error) => error.into(),
            Entry::Silent => Outcome::Notification,
        }
    }
}
