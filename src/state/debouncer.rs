use crate::state::messages::NetworkRequest;
use crate::state::search::SearchQuery;
use log::debug;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Holds back search queries until typing pauses for `delay`.
/// `None` cancels whatever is pending (the search box was cleared).
pub struct SearchDebouncer {
    queries: mpsc::Receiver<Option<SearchQuery>>,
    network_requests: mpsc::Sender<NetworkRequest>,
    delay: Duration,
}

impl SearchDebouncer {
    pub fn new(
        queries: mpsc::Receiver<Option<SearchQuery>>,
        network_requests: mpsc::Sender<NetworkRequest>,
        delay: Duration,
    ) -> Self {
        Self { queries, network_requests, delay }
    }

    pub async fn run(mut self) {
        let mut pending: Option<SearchQuery> = None;

        loop {
            let Some(query) = pending.take() else {
                match self.queries.recv().await {
                    Some(next) => pending = next,
                    None => return,
                }
                continue;
            };

            tokio::select! {
                next = self.queries.recv() => match next {
                    Some(next) => pending = next,
                    None => return,
                },
                _ = sleep(self.delay) => {
                    debug!("search settled on {:?}", query.text);
                    if self
                        .network_requests
                        .send(NetworkRequest::SearchTeams { query })
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
            }
        }
    }
}
