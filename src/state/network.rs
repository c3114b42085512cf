use crate::state::matches::MatchesLoad;
use crate::state::messages::{NetworkRequest, NetworkResponse};
use crate::state::search::SearchQuery;
use ftcscout_api::aggregate::FanOutSummary;
use ftcscout_api::client::FtcScoutApi;
use futures_util::StreamExt;
use log::{debug, error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs every request on its own task so a slow season load never holds up
/// typing-driven searches.
pub struct NetworkWorker {
    client: FtcScoutApi,
    season: u16,
    search_limit: u32,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    in_flight: Arc<AtomicUsize>,
}

#[derive(Clone)]
struct RequestContext {
    client: FtcScoutApi,
    season: u16,
    search_limit: u32,
    responses: mpsc::Sender<NetworkResponse>,
    in_flight: Arc<AtomicUsize>,
}

impl NetworkWorker {
    pub fn new(
        client: FtcScoutApi,
        season: u16,
        search_limit: u32,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            season,
            search_limit,
            requests,
            responses,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let ctx = RequestContext {
                client: self.client.clone(),
                season: self.season,
                search_limit: self.search_limit,
                responses: self.responses.clone(),
                in_flight: self.in_flight.clone(),
            };
            tokio::spawn(ctx.handle(request));
        }
    }
}

impl RequestContext {
    async fn handle(self, request: NetworkRequest) {
        self.start_loading_animation().await;

        let is_ok = match request {
            NetworkRequest::SearchTeams { query } => self.handle_search(query).await,
            NetworkRequest::LoadQuickStats { team_number } => {
                self.handle_quick_stats(team_number).await
            }
            NetworkRequest::LoadTeamMatches { load } => self.handle_team_matches(load).await,
        };

        debug!("network request complete");
        self.stop_loading_animation(is_ok).await;
    }

    async fn send(&self, response: NetworkResponse) {
        if let Err(e) = self.responses.send(response).await {
            error!("Failed to send network response: {e}");
        }
    }

    async fn handle_search(&self, query: SearchQuery) -> bool {
        debug!("searching teams for {:?}", query.text);
        match self.client.search_teams(&query.text, self.search_limit).await {
            Ok(teams) => {
                self.send(NetworkResponse::TeamsFound { ticket: query.ticket, teams }).await;
                true
            }
            Err(e) => {
                error!("team search failed: {e}");
                self.send(NetworkResponse::SearchFailed {
                    ticket: query.ticket,
                    message: e.to_string(),
                })
                .await;
                false
            }
        }
    }

    async fn handle_quick_stats(&self, team_number: u32) -> bool {
        debug!("loading quick-stats for team {team_number}");
        match self.client.fetch_quick_stats(team_number, self.season).await {
            Ok(stats) => {
                self.send(NetworkResponse::QuickStatsLoaded { team_number, stats }).await;
                true
            }
            Err(e) => {
                error!("quick-stats for team {team_number} failed: {e}");
                self.send(NetworkResponse::QuickStatsFailed {
                    team_number,
                    message: e.to_string(),
                })
                .await;
                false
            }
        }
    }

    /// Events first, then every valid event's metadata and match list
    /// concurrently. Each settled fetch is forwarded on its own; the summary
    /// goes out once all of them have settled.
    async fn handle_team_matches(&self, load: MatchesLoad) -> bool {
        let team_number = load.team_number;
        debug!("loading {} events for team {team_number}", self.season);
        let events = match self.client.fetch_team_events(team_number, self.season).await {
            Ok(events) => events,
            Err(e) => {
                error!("events for team {team_number} failed: {e}");
                self.send(NetworkResponse::EventsFailed { load, message: e.to_string() })
                    .await;
                return false;
            }
        };

        self.send(NetworkResponse::EventsLoaded { load, events: events.clone() })
            .await;

        let mut summary = FanOutSummary::default();
        let mut updates = self.client.event_updates(self.season, team_number, &events);
        while let Some(update) = updates.next().await {
            if update.is_failure() {
                warn!("event fetch failed for {} ({})", update.event_code(), update.part().label());
            }
            summary.record(&update);
            self.send(NetworkResponse::EventUpdated { load, update }).await;
        }

        debug!(
            "team {team_number}: {} of {} event fetches succeeded",
            summary.succeeded,
            summary.total()
        );
        self.send(NetworkResponse::TeamMatchesSettled { load, summary }).await;
        summary.failed == 0
    }

    async fn start_loading_animation(&self) {
        // Only the first request in flight drives the spinner.
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            return;
        }

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if in_flight.load(Ordering::SeqCst) == 0 {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) > 1 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftcscout_api::aggregate::EventUpdate;

    fn context(base_url: String, responses: mpsc::Sender<NetworkResponse>) -> RequestContext {
        RequestContext {
            client: FtcScoutApi::with_base_url(base_url),
            season: 2024,
            search_limit: 100,
            responses,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Everything but spinner frames, in the order it was sent.
    fn drain(responses: &mut mpsc::Receiver<NetworkResponse>) -> Vec<NetworkResponse> {
        let mut received = Vec::new();
        while let Ok(response) = responses.try_recv() {
            if !matches!(response, NetworkResponse::LoadingStateChanged { .. }) {
                received.push(response);
            }
        }
        received
    }

    #[tokio::test]
    async fn team_matches_stream_events_then_updates_then_summary() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/teams/1000/events/2024")
            .with_body(r#"[{"eventCode":"E1","stats":{"rank":3}},{"eventCode":"E2","stats":null}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/events/2024/E1")
            .with_body(r#"{"name":"Event One","code":"E1"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/events/2024/E1/matches")
            .with_status(500)
            .create_async()
            .await;

        let (tx, mut rx) = mpsc::channel(64);
        let load = MatchesLoad { team_number: 1000, generation: 7 };
        context(server.url(), tx).handle(NetworkRequest::LoadTeamMatches { load }).await;

        let received = drain(&mut rx);
        assert_eq!(received.len(), 4, "{received:?}");

        match &received[0] {
            NetworkResponse::EventsLoaded { load: l, events } => {
                assert_eq!(*l, load);
                let codes: Vec<&str> = events.iter().map(|e| e.code.as_str()).collect();
                assert_eq!(codes, vec!["E1", "E2"]);
            }
            other => panic!("expected events first, got {other:?}"),
        }

        let updates: Vec<&EventUpdate> = received[1..3]
            .iter()
            .map(|r| match r {
                NetworkResponse::EventUpdated { load: l, update } => {
                    assert_eq!(*l, load);
                    update
                }
                other => panic!("expected an event update, got {other:?}"),
            })
            .collect();
        assert!(updates.iter().all(|u| u.event_code() == "E1"));
        assert_eq!(updates.iter().filter(|u| u.is_failure()).count(), 1);

        match &received[3] {
            NetworkResponse::TeamMatchesSettled { load: l, summary } => {
                assert_eq!(*l, load);
                assert_eq!(*summary, FanOutSummary { succeeded: 1, failed: 1 });
            }
            other => panic!("expected the summary last, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn events_failure_skips_the_fan_out() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/teams/1000/events/2024")
            .with_status(503)
            .create_async()
            .await;
        let event_lookups = server
            .mock("GET", mockito::Matcher::Regex("^/events/".into()))
            .expect(0)
            .create_async()
            .await;

        let (tx, mut rx) = mpsc::channel(64);
        let load = MatchesLoad { team_number: 1000, generation: 1 };
        context(server.url(), tx).handle(NetworkRequest::LoadTeamMatches { load }).await;

        let received = drain(&mut rx);
        assert_eq!(received.len(), 1, "{received:?}");
        assert!(matches!(
            &received[0],
            NetworkResponse::EventsFailed { load: l, .. } if *l == load
        ));
        event_lookups.assert_async().await;
    }

    #[tokio::test]
    async fn quick_stats_failure_names_the_team() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/teams/1000/quick-stats")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let (tx, mut rx) = mpsc::channel(64);
        context(server.url(), tx)
            .handle(NetworkRequest::LoadQuickStats { team_number: 1000 })
            .await;

        let received = drain(&mut rx);
        assert!(matches!(
            received.as_slice(),
            [NetworkResponse::QuickStatsFailed { team_number: 1000, .. }]
        ));
    }
}
