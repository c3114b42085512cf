use ftcscout_api::{QuickStats, Team};
use log::{debug, warn};
use std::collections::HashSet;

/// Identifies one issued search. Tickets increase with every keystroke that
/// changes the query, so only the newest one may write results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub ticket: SearchTicket,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryChange {
    /// Input is blank: results were cleared and nothing should be fetched.
    Cleared,
    /// Hand to the debouncer.
    Pending(SearchQuery),
}

// ---------------------------------------------------------------------------
// Team search store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SearchState {
    pub input: String,
    pub results: Vec<Team>,
    pub selected: usize,
    next_ticket: u64,
    latest: Option<SearchTicket>,
    is_loading: bool,
    /// Teams with a quick-stats fetch in flight or already answered.
    stats_requested: HashSet<u32>,
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn on_query_changed(&mut self, text: &str) -> QueryChange {
        if text.trim().is_empty() {
            self.results.clear();
            self.selected = 0;
            self.latest = None;
            self.is_loading = false;
            return QueryChange::Cleared;
        }

        self.next_ticket += 1;
        let ticket = SearchTicket(self.next_ticket);
        self.latest = Some(ticket);
        self.is_loading = true;
        QueryChange::Pending(SearchQuery { ticket, text: text.to_string() })
    }

    /// Replace the result set if `ticket` is still the newest search.
    /// Returns false when the response was stale and dropped.
    pub fn on_results(&mut self, ticket: SearchTicket, teams: Vec<Team>) -> bool {
        if self.latest != Some(ticket) {
            debug!("dropping stale search results for ticket {}", ticket.0);
            return false;
        }
        self.is_loading = false;
        self.results = teams
            .into_iter()
            .map(|team| Team { stats: None, ..team })
            .collect();
        self.stats_requested.clear();
        self.selected = 0;
        true
    }

    /// Prior results stay on screen when a search fails.
    pub fn on_failed(&mut self, ticket: SearchTicket, message: &str) {
        warn!("team search failed: {message}");
        if self.latest == Some(ticket) {
            self.is_loading = false;
        }
    }

    pub fn push_char(&mut self, c: char) -> QueryChange {
        self.input.push(c);
        let text = self.input.clone();
        self.on_query_changed(&text)
    }

    pub fn pop_char(&mut self) -> QueryChange {
        self.input.pop();
        let text = self.input.clone();
        self.on_query_changed(&text)
    }

    pub fn clear_input(&mut self) -> QueryChange {
        self.input.clear();
        self.on_query_changed("")
    }

    pub fn selected_team(&self) -> Option<&Team> {
        self.results.get(self.selected)
    }

    /// List item id of the highlighted row, the team number as text.
    pub fn selected_id(&self) -> Option<String> {
        self.selected_team().map(|t| t.number.to_string())
    }

    pub fn select_next(&mut self) {
        let max = self.results.len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Quick-stats enrichment of the highlighted team
    // -----------------------------------------------------------------------

    /// Team number to fetch quick-stats for, if the id names a listed team
    /// that has none yet.
    pub fn on_selection_changed(&self, id: Option<&str>) -> Option<u32> {
        let number = id?.trim().parse::<u32>().ok()?;
        self.results
            .iter()
            .find(|t| t.number == number)
            .filter(|t| t.stats.is_none())
            .map(|t| t.number)
    }

    /// Records that a quick-stats fetch for `number` is going out. False if
    /// one was already issued for the current results.
    pub fn mark_stats_requested(&mut self, number: u32) -> bool {
        self.stats_requested.insert(number)
    }

    /// A failed fetch may be retried the next time the team is highlighted.
    pub fn on_stats_failed(&mut self, number: u32) {
        self.stats_requested.remove(&number);
    }

    /// Patch the stats of the team with `number`; every other record is left
    /// as it is.
    pub fn apply_stats(&mut self, number: u32, stats: Option<QuickStats>) {
        let Some(stats) = stats else {
            debug!("no quick-stats for team {number} this season");
            return;
        };
        if let Some(team) = self.results.iter_mut().find(|t| t.number == number) {
            team.stats = Some(stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftcscout_api::Stat;

    fn team(number: u32, name: &str) -> Team {
        Team {
            number,
            name: name.into(),
            city: "Austin".into(),
            state: "TX".into(),
            country: "USA".into(),
            rookie_year: 2015,
            ..Default::default()
        }
    }

    fn pending(change: QueryChange) -> SearchQuery {
        match change {
            QueryChange::Pending(q) => q,
            QueryChange::Cleared => panic!("expected a pending query"),
        }
    }

    fn stats(total: f64) -> QuickStats {
        QuickStats {
            total: Stat { value: total, rank: 1 },
            ..Default::default()
        }
    }

    #[test]
    fn blank_query_clears_synchronously_without_request() {
        let mut search = SearchState::default();
        let q = pending(search.on_query_changed("robo"));
        search.on_results(q.ticket, vec![team(1, "Robo")]);

        assert_eq!(search.on_query_changed("   "), QueryChange::Cleared);
        assert!(search.results.is_empty());
        assert!(!search.is_loading());
    }

    #[test]
    fn later_query_wins_over_slower_earlier_response() {
        let mut search = SearchState::default();
        let a = pending(search.on_query_changed("a"));
        let b = pending(search.on_query_changed("ab"));
        assert!(search.is_loading());

        assert!(search.on_results(b.ticket, vec![team(2, "B")]));
        assert!(!search.on_results(a.ticket, vec![team(1, "A")]));

        assert_eq!(search.results, vec![team(2, "B")]);
        assert!(!search.is_loading());
    }

    #[test]
    fn stale_response_does_not_clear_loading() {
        let mut search = SearchState::default();
        let a = pending(search.on_query_changed("a"));
        let _b = pending(search.on_query_changed("ab"));
        search.on_results(a.ticket, vec![team(1, "A")]);
        assert!(search.is_loading());
        assert!(search.results.is_empty());
    }

    #[test]
    fn response_after_clear_is_dropped() {
        let mut search = SearchState::default();
        let a = pending(search.on_query_changed("a"));
        search.on_query_changed("");
        assert!(!search.on_results(a.ticket, vec![team(1, "A")]));
        assert!(search.results.is_empty());
    }

    #[test]
    fn failure_keeps_previous_results() {
        let mut search = SearchState::default();
        let a = pending(search.on_query_changed("a"));
        search.on_results(a.ticket, vec![team(1, "A")]);
        let b = pending(search.on_query_changed("ab"));
        search.on_failed(b.ticket, "timeout");

        assert_eq!(search.results, vec![team(1, "A")]);
        assert!(!search.is_loading());
    }

    #[test]
    fn results_arrive_without_stats() {
        let mut search = SearchState::default();
        let q = pending(search.on_query_changed("a"));
        let mut t = team(1, "A");
        t.stats = Some(stats(9.0));
        search.on_results(q.ticket, vec![t]);
        assert!(search.results[0].stats.is_none());
    }

    #[test]
    fn selection_ignores_missing_and_non_numeric_ids() {
        let mut search = SearchState::default();
        let q = pending(search.on_query_changed("a"));
        search.on_results(q.ticket, vec![team(1000, "A")]);

        assert_eq!(search.on_selection_changed(None), None);
        assert_eq!(search.on_selection_changed(Some("abc")), None);
        assert_eq!(search.on_selection_changed(Some("4242")), None);
        assert_eq!(search.on_selection_changed(Some("1000")), Some(1000));
    }

    #[test]
    fn selection_skips_teams_already_enriched() {
        let mut search = SearchState::default();
        let q = pending(search.on_query_changed("a"));
        search.on_results(q.ticket, vec![team(1000, "A")]);
        search.apply_stats(1000, Some(stats(50.0)));
        assert_eq!(search.on_selection_changed(Some("1000")), None);
    }

    #[test]
    fn stats_patch_touches_only_the_matching_team() {
        let mut search = SearchState::default();
        let q = pending(search.on_query_changed("a"));
        search.on_results(q.ticket, vec![team(1, "A"), team(2, "B"), team(3, "C")]);
        let before = search.results.clone();

        search.apply_stats(2, Some(stats(88.5)));

        assert_eq!(search.results[0], before[0]);
        assert_eq!(search.results[2], before[2]);
        assert_eq!(search.results[1].stats, Some(stats(88.5)));
        assert_eq!(search.results[1].name, "B");
        assert_eq!(search.results[1].location(), before[1].location());
    }

    #[test]
    fn absent_stats_leave_record_unchanged() {
        let mut search = SearchState::default();
        let q = pending(search.on_query_changed("a"));
        search.on_results(q.ticket, vec![team(1, "A")]);
        search.apply_stats(1, None);
        assert!(search.results[0].stats.is_none());
    }

    #[test]
    fn typing_builds_the_query() {
        let mut search = SearchState::default();
        search.push_char('1');
        let q = pending(search.push_char('6'));
        assert_eq!(q.text, "16");
        assert_eq!(search.pop_char(), QueryChange::Pending(SearchQuery {
            ticket: SearchTicket(3),
            text: "1".into(),
        }));
        assert_eq!(search.pop_char(), QueryChange::Cleared);
    }

    #[test]
    fn stats_are_requested_once_until_they_fail() {
        let mut search = SearchState::default();
        let q = pending(search.on_query_changed("a"));
        search.on_results(q.ticket, vec![team(1, "A"), team(2, "B")]);

        assert!(search.mark_stats_requested(1));
        assert!(!search.mark_stats_requested(1));

        search.on_stats_failed(1);
        assert!(search.mark_stats_requested(1));

        let q = pending(search.on_query_changed("ab"));
        search.on_results(q.ticket, vec![team(1, "A")]);
        assert!(search.mark_stats_requested(1));
    }
}
