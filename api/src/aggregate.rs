//! Concurrent per-event fan-out for a team's season.
//!
//! Every valid event gets two independent fetches (metadata and match list).
//! They are driven together in one [`FuturesUnordered`], so each result is
//! yielded as soon as it settles and one slow or failing event never holds up
//! the others. The stream ends once every fetch has settled.

use crate::client::FtcScoutApi;
use crate::{EventRef, MatchRecord};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventPart {
    Metadata,
    Matches,
}

impl EventPart {
    pub fn label(&self) -> &'static str {
        match self {
            EventPart::Metadata => "event details",
            EventPart::Matches => "matches",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventUpdate {
    Name { event_code: String, name: Option<String> },
    Matches { event_code: String, matches: Vec<MatchRecord> },
    Failed { event_code: String, part: EventPart, message: String },
}

impl EventUpdate {
    pub fn event_code(&self) -> &str {
        match self {
            EventUpdate::Name { event_code, .. }
            | EventUpdate::Matches { event_code, .. }
            | EventUpdate::Failed { event_code, .. } => event_code,
        }
    }

    pub fn part(&self) -> EventPart {
        match self {
            EventUpdate::Name { .. } => EventPart::Metadata,
            EventUpdate::Matches { .. } => EventPart::Matches,
            EventUpdate::Failed { part, .. } => *part,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, EventUpdate::Failed { .. })
    }
}

/// Per-team join result once every fetch of the fan-out has settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl FanOutSummary {
    pub fn record(&mut self, update: &EventUpdate) {
        if update.is_failure() {
            self.failed += 1;
        } else {
            self.succeeded += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

pub type EventUpdates<'a> = FuturesUnordered<BoxFuture<'a, EventUpdate>>;

impl FtcScoutApi {
    /// Start the metadata and match-list fetches for every event that still
    /// needs matches. Poll the returned stream to drive them.
    pub fn event_updates<'a>(&'a self, season: u16, subject_team: u32, events: &[EventRef]) -> EventUpdates<'a> {
        let tasks = FuturesUnordered::new();
        for event in events.iter().filter(|e| e.needs_matches()) {
            let code = event.code.clone();
            tasks.push(
                async move {
                    match self.fetch_event_name(season, &code).await {
                        Ok(name) => EventUpdate::Name { event_code: code, name },
                        Err(e) => EventUpdate::Failed {
                            event_code: code,
                            part: EventPart::Metadata,
                            message: e.to_string(),
                        },
                    }
                }
                .boxed(),
            );

            let code = event.code.clone();
            tasks.push(
                async move {
                    match self.fetch_event_matches(season, &code, subject_team).await {
                        Ok(matches) => EventUpdate::Matches { event_code: code, matches },
                        Err(e) => EventUpdate::Failed {
                            event_code: code,
                            part: EventPart::Matches,
                            message: e.to_string(),
                        },
                    }
                }
                .boxed(),
            );
        }
        tasks
    }
}
