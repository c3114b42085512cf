use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crate::state::search::{QueryChange, SearchQuery};
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    search_queries: &mpsc::Sender<Option<SearchQuery>>,
) {
    let mut guard = app.lock().await;
    let mut query_change: Option<QueryChange> = None;
    let mut stats_for: Option<u32> = None;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }
        (MenuItem::Matches | MenuItem::Help, Char('q'), _) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Global
        (_, KeyCode::F(1), _) => guard.update_tab(MenuItem::Help),
        (_, Char('l'), KeyModifiers::CONTROL) => guard.toggle_show_logs(),
        (_, Char('f'), KeyModifiers::CONTROL) => guard.toggle_full_screen(),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Tab switching
        (MenuItem::Teams, KeyCode::Tab, _) => guard.update_tab(MenuItem::Matches),
        (MenuItem::Matches, KeyCode::Tab | KeyCode::Esc, _) => guard.update_tab(MenuItem::Teams),

        // Team search + list
        (MenuItem::Teams, KeyCode::Down, _) => stats_for = guard.team_down(),
        (MenuItem::Teams, KeyCode::Up, _) => stats_for = guard.team_up(),
        (MenuItem::Teams, KeyCode::Backspace, _) => query_change = Some(guard.search_pop_char()),
        (MenuItem::Teams, KeyCode::Esc, _) => query_change = Some(guard.search_clear()),
        (MenuItem::Teams, KeyCode::Enter, _) => {
            if let Some(load) = guard.open_selected_team() {
                drop(guard);
                let _ = network_requests.send(NetworkRequest::LoadTeamMatches { load }).await;
                return;
            }
        }
        (MenuItem::Teams, Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
            query_change = Some(guard.search_push_char(c));
        }

        // Match list
        (MenuItem::Matches, Char('j') | KeyCode::Down, _) => guard.state.matches.select_next(),
        (MenuItem::Matches, Char('k') | KeyCode::Up, _) => guard.state.matches.select_prev(),
        (MenuItem::Matches, Char('r'), _) => {
            if let Some(load) = guard.reload_matches() {
                drop(guard);
                let _ = network_requests.send(NetworkRequest::LoadTeamMatches { load }).await;
                return;
            }
        }

        _ => {}
    }

    drop(guard);

    match query_change {
        Some(QueryChange::Pending(query)) => {
            let _ = search_queries.send(Some(query)).await;
        }
        Some(QueryChange::Cleared) => {
            let _ = search_queries.send(None).await;
        }
        None => {}
    }

    if let Some(team_number) = stats_for {
        let _ = network_requests
            .send(NetworkRequest::LoadQuickStats { team_number })
            .await;
    }
}
