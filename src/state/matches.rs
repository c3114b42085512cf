use chrono::{DateTime, Local};
use ftcscout_api::aggregate::{EventPart, EventUpdate, FanOutSummary};
use ftcscout_api::{EventRef, MatchRecord};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Identifies one season load. Reloading the same team issues a new
/// generation, so only the newest load may write results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchesLoad {
    pub team_number: u32,
    pub generation: u64,
}

/// A team's season, bucketed by event.
///
/// Events are keyed by code so each per-event result is an independent
/// upsert. `order` keeps the sequence FTCScout returned them in.
#[derive(Debug, Default)]
pub struct MatchesState {
    current: Option<MatchesLoad>,
    next_generation: u64,
    order: Vec<String>,
    events: HashMap<String, EventRef>,
    awaiting_events: bool,
    outstanding: HashSet<(String, EventPart)>,
    pub summary: Option<FanOutSummary>,
    pub loaded_at: Option<DateTime<Local>>,
    /// Index into `rows()`.
    pub selected: usize,
}

impl MatchesState {
    /// Reset for a new load of `team_number`. The event list fetch is
    /// outstanding.
    pub fn begin(&mut self, team_number: u32) -> MatchesLoad {
        let generation = self.next_generation + 1;
        let load = MatchesLoad { team_number, generation };
        *self = Self {
            current: Some(load),
            next_generation: generation,
            awaiting_events: true,
            ..Self::default()
        };
        load
    }

    pub fn current(&self) -> Option<MatchesLoad> {
        self.current
    }

    pub fn team_number(&self) -> Option<u32> {
        self.current.map(|load| load.team_number)
    }

    /// True while any tracked fetch for the current load is outstanding.
    pub fn is_loading(&self) -> bool {
        self.awaiting_events || !self.outstanding.is_empty()
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    fn is_current(&self, load: MatchesLoad) -> bool {
        if self.current == Some(load) {
            return true;
        }
        debug!(
            "dropping result for team {} (load {}), superseded",
            load.team_number, load.generation
        );
        false
    }

    pub fn on_events(&mut self, load: MatchesLoad, events: Vec<EventRef>) {
        if !self.is_current(load) {
            return;
        }
        self.awaiting_events = false;
        for event in events {
            if event.needs_matches() {
                self.outstanding.insert((event.code.clone(), EventPart::Metadata));
                self.outstanding.insert((event.code.clone(), EventPart::Matches));
            }
            if !self.events.contains_key(&event.code) {
                self.order.push(event.code.clone());
            }
            self.events.insert(event.code.clone(), event);
        }
    }

    pub fn on_events_failed(&mut self, load: MatchesLoad, message: &str) {
        if !self.is_current(load) {
            return;
        }
        warn!("loading events for team {} failed: {message}", load.team_number);
        self.awaiting_events = false;
    }

    pub fn on_event_update(&mut self, load: MatchesLoad, update: EventUpdate) {
        if !self.is_current(load) {
            return;
        }
        self.outstanding
            .remove(&(update.event_code().to_string(), update.part()));

        match update {
            EventUpdate::Name { event_code, name } => {
                if let Some(event) = self.events.get_mut(&event_code) {
                    event.display_name = name;
                }
            }
            EventUpdate::Matches { event_code, mut matches } => {
                if let Some(event) = self.events.get_mut(&event_code) {
                    matches.sort_by_key(|m| m.match_id);
                    event.matches = matches;
                }
            }
            EventUpdate::Failed { event_code, part, message } => {
                warn!("loading {} for {event_code} failed: {message}", part.label());
            }
        }
    }

    /// Join point: every fetch of the fan-out has settled.
    pub fn on_settled(&mut self, load: MatchesLoad, summary: FanOutSummary) {
        if !self.is_current(load) {
            return;
        }
        if !self.outstanding.is_empty() {
            warn!("{} fetches never reported for team {}", self.outstanding.len(), load.team_number);
            self.outstanding.clear();
        }
        self.awaiting_events = false;
        self.summary = Some(summary);
        self.loaded_at = Some(Local::now());
    }

    /// Events in API order.
    pub fn events(&self) -> impl Iterator<Item = &EventRef> {
        self.order.iter().filter_map(|code| self.events.get(code))
    }

    pub fn event(&self, code: &str) -> Option<&EventRef> {
        self.events.get(code)
    }

    /// Flattened, selectable list of matches across all event sections.
    pub fn rows(&self) -> Vec<&MatchRecord> {
        self.events().flat_map(|e| e.matches.iter()).collect()
    }

    pub fn selected_match(&self) -> Option<&MatchRecord> {
        self.rows().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let max = self.rows().len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}
