mod app;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::debouncer::SearchDebouncer;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::search::{QueryChange, SearchQuery};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use ftcscout_api::client::FtcScoutApi;
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(initial_query) = handle_cli_args() else {
        return Ok(());
    };

    let mut settings = AppSettings::load()?;
    settings.initial_query = initial_query;

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(settings.log_level)?;
    tui_logger::set_default_level(settings.log_level);
    info!("ftcscout {} season {}", settings.api_url, settings.season);

    let api = FtcScoutApi::with_base_url(settings.api_url.clone());
    let (season, search_limit, debounce) = (settings.season, settings.search_limit, settings.debounce);
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);
    let (search_query_tx, search_query_rx) = mpsc::channel::<Option<SearchQuery>>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker =
        NetworkWorker::new(api, season, search_limit, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Search debounce thread
    let debouncer = SearchDebouncer::new(search_query_rx, network_req_tx.clone(), debounce);
    let debounce_task = tokio::spawn(debouncer.run());

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(
        terminal,
        app,
        ui_event_rx,
        network_req_tx,
        network_resp_rx,
        search_query_tx,
    )
    .await;

    input_handler.abort();
    network_task.abort();
    debounce_task.abort();

    Ok(())
}

/// `None` when the process should exit without starting the UI, otherwise
/// the optional search to start with.
fn handle_cli_args() -> Option<Option<String>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(arg) = args.first() else {
        return Some(None);
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            None
        }
        "-V" | "--version" => {
            println!("ftctui {}", env!("CARGO_PKG_VERSION"));
            None
        }
        flag if flag.starts_with('-') => {
            eprintln!("Unknown argument: {flag}\n\n{}", usage_text());
            std::process::exit(2);
        }
        _ => Some(Some(args.join(" "))),
    }
}

fn usage_text() -> &'static str {
    "ftctui - FIRST Tech Challenge teams and matches from FTCScout

Usage:
  ftctui [QUERY]
  ftctui --help
  ftctui --version

Keys:
  type to search, Up/Down to move, Enter for the team's matches,
  Tab to switch tabs, Ctrl-L for logs, F1 for help, Ctrl-C to quit

Environment:
  FTCSCOUT_API_URL       REST base URL (default https://api.ftcscout.org/rest/v1)
  FTCSCOUT_SEASON        Season year (default: current season)
  FTCSCOUT_SEARCH_LIMIT  Max teams per search (default 100)
  FTCSCOUT_DEBOUNCE_MS   Typing pause before searching (default 250)
  FTCSCOUT_LOG           Log level: error, warn, info, debug, trace"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
    search_queries: mpsc::Sender<Option<SearchQuery>>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests, &search_queries).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                handle_network_response(response, &app, &network_requests, &mut loading).await;
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard, loading);
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    search_queries: &mpsc::Sender<Option<SearchQuery>>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let mut guard = app.lock().await;
            let Some(query) = guard.settings.initial_query.clone() else {
                return true;
            };
            let change = guard.search_set(&query);
            drop(guard);
            if let QueryChange::Pending(query) = change {
                let _ = network_requests.send(NetworkRequest::SearchTeams { query }).await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests, search_queries).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) {
    let mut guard = app.lock().await;
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
        }
        NetworkResponse::TeamsFound { ticket, teams } => {
            let stats_for = guard.on_teams_found(ticket, teams);
            drop(guard);
            if let Some(team_number) = stats_for {
                let _ = network_requests
                    .send(NetworkRequest::LoadQuickStats { team_number })
                    .await;
            }
        }
        NetworkResponse::SearchFailed { ticket, message } => {
            guard.on_search_failed(ticket, message);
        }
        NetworkResponse::QuickStatsLoaded { team_number, stats } => {
            guard.on_quick_stats_loaded(team_number, stats);
        }
        NetworkResponse::QuickStatsFailed { team_number, message } => {
            error!("Network error: {message}");
            guard.on_quick_stats_failed(team_number, message);
        }
        NetworkResponse::EventsLoaded { load, events } => {
            guard.on_events_loaded(load, events);
        }
        NetworkResponse::EventsFailed { load, message } => {
            guard.on_events_failed(load, message);
        }
        NetworkResponse::EventUpdated { load, update } => {
            guard.on_event_updated(load, update);
        }
        NetworkResponse::TeamMatchesSettled { load, summary } => {
            guard.on_team_matches_settled(load, summary);
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
