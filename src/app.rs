use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::matches::MatchesLoad;
use crate::state::search::{QueryChange, SearchTicket};
use ftcscout_api::aggregate::{EventUpdate, FanOutSummary};
use ftcscout_api::{EventRef, QuickStats, Team};
use log::warn;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Teams,
    Matches,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        log::set_max_level(settings.log_level);
        tui_logger::set_default_level(settings.log_level);

        Self {
            state: AppState::new(),
            settings,
        }
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    /// Returns the team to fetch quick-stats for, now that a new first row
    /// is highlighted.
    pub fn on_teams_found(&mut self, ticket: SearchTicket, teams: Vec<Team>) -> Option<u32> {
        if !self.state.search.on_results(ticket, teams) {
            return None;
        }
        self.state.last_error = None;
        self.stats_request_for_selection()
    }

    pub fn on_search_failed(&mut self, ticket: SearchTicket, message: String) {
        self.state.search.on_failed(ticket, &message);
        self.state.last_error = Some(message);
    }

    pub fn on_quick_stats_loaded(&mut self, team_number: u32, stats: Option<QuickStats>) {
        self.state.search.apply_stats(team_number, stats);
    }

    pub fn on_quick_stats_failed(&mut self, team_number: u32, message: String) {
        self.state.search.on_stats_failed(team_number);
        self.state.last_error = Some(message);
    }

    pub fn on_events_loaded(&mut self, load: MatchesLoad, events: Vec<EventRef>) {
        self.state.matches.on_events(load, events);
    }

    pub fn on_events_failed(&mut self, load: MatchesLoad, message: String) {
        if self.is_current_load(load) {
            self.state.last_error = Some(message.clone());
        }
        self.state.matches.on_events_failed(load, &message);
    }

    pub fn on_event_updated(&mut self, load: MatchesLoad, update: EventUpdate) {
        if let EventUpdate::Failed { message, .. } = &update
            && self.is_current_load(load)
        {
            self.state.last_error = Some(message.clone());
        }
        self.state.matches.on_event_update(load, update);
    }

    pub fn on_team_matches_settled(&mut self, load: MatchesLoad, summary: FanOutSummary) {
        if self.is_current_load(load) {
            if summary.failed > 0 {
                warn!(
                    "{} of {} event fetches failed for team {}",
                    summary.failed,
                    summary.total(),
                    load.team_number
                );
            } else {
                self.state.last_error = None;
            }
        }
        self.state.matches.on_settled(load, summary);
    }

    fn is_current_load(&self, load: MatchesLoad) -> bool {
        self.state.matches.current() == Some(load)
    }

    // -----------------------------------------------------------------------
    // Search input
    // -----------------------------------------------------------------------

    pub fn search_push_char(&mut self, c: char) -> QueryChange {
        self.state.search.push_char(c)
    }

    pub fn search_pop_char(&mut self) -> QueryChange {
        self.state.search.pop_char()
    }

    pub fn search_clear(&mut self) -> QueryChange {
        self.state.search.clear_input()
    }

    pub fn search_set(&mut self, text: &str) -> QueryChange {
        self.state.search.input = text.to_string();
        self.state.search.on_query_changed(text)
    }

    // -----------------------------------------------------------------------
    // Team list navigation
    // -----------------------------------------------------------------------

    pub fn team_down(&mut self) -> Option<u32> {
        self.state.search.select_next();
        self.stats_request_for_selection()
    }

    pub fn team_up(&mut self) -> Option<u32> {
        self.state.search.select_prev();
        self.stats_request_for_selection()
    }

    /// Team to fetch quick-stats for, unless a fetch for it already went out.
    pub fn stats_request_for_selection(&mut self) -> Option<u32> {
        let id = self.state.search.selected_id();
        let number = self.state.search.on_selection_changed(id.as_deref())?;
        self.state.search.mark_stats_requested(number).then_some(number)
    }

    /// Switches to the Matches tab for the highlighted team and starts a new
    /// season load for it.
    pub fn open_selected_team(&mut self) -> Option<MatchesLoad> {
        let team = self.state.search.selected_team()?;
        let number = team.number;
        self.state.matches_title = Some(format!("{} {}", team.number, team.name));
        self.state.last_error = None;
        let load = self.state.matches.begin(number);
        self.update_tab(MenuItem::Matches);
        Some(load)
    }

    /// Starts a fresh load of the team already on the Matches tab.
    pub fn reload_matches(&mut self) -> Option<MatchesLoad> {
        let number = self.state.matches.team_number()?;
        self.state.last_error = None;
        Some(self.state.matches.begin(number))
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }
}
