use crate::app::MenuItem;
use crate::state::matches::MatchesState;
use crate::state::search::SearchState;

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub search: SearchState,
    pub matches: MatchesState,
    /// "16236 Robo Tigers" for the Matches tab title.
    pub matches_title: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
