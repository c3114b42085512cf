use crate::state::matches::MatchesLoad;
use crate::state::network::LoadingState;
use crate::state::search::{SearchQuery, SearchTicket};
use crossterm::event::KeyEvent;
use ftcscout_api::aggregate::{EventUpdate, FanOutSummary};
use ftcscout_api::{EventRef, QuickStats, Team};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    SearchTeams { query: SearchQuery },
    LoadQuickStats { team_number: u32 },
    LoadTeamMatches { load: MatchesLoad },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    TeamsFound { ticket: SearchTicket, teams: Vec<Team> },
    SearchFailed { ticket: SearchTicket, message: String },
    QuickStatsLoaded { team_number: u32, stats: Option<QuickStats> },
    QuickStatsFailed { team_number: u32, message: String },
    EventsLoaded { load: MatchesLoad, events: Vec<EventRef> },
    EventsFailed { load: MatchesLoad, message: String },
    /// Partial update: one settled fetch of the per-event fan-out.
    EventUpdated { load: MatchesLoad, update: EventUpdate },
    /// Every fetch of the fan-out has settled.
    TeamMatchesSettled { load: MatchesLoad, summary: FanOutSummary },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
