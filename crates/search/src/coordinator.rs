//! Search coordinator: turns keystroke, focus and selection events into
//! debounced symbol searches.
//!
//! The coordinator runs as a single task. Commands arrive on an mpsc channel,
//! the current [`SearchView`] is published on a `watch` channel, and committed
//! selections and user notices are emitted as [`SearchEvent`]s.
//!
//! ```text
//!            input >= 2 chars              debounce expires
//!   Idle ----------------------> Debouncing ----------------> Searching
//!    ^                              ^  ^                          |
//!    | input < 2 chars / select     |  | new input                | completion
//!    +------------------------------+--+---------------------- Displaying
//! ```
//!
//! Each issued search gets a fresh [`RequestToken`]. A completion is applied
//! only while its token is still the latest; anything older is discarded.
//! In-flight searches are never aborted.

use std::sync::Arc;
use std::time::Duration;

use marketlens_market_data::SearchResult;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::backend::SymbolSearch;
use crate::errors::ClientError;

/// Quiet period after the last keystroke before a search is issued.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Delay between losing focus and closing the results panel.
pub const BLUR_GRACE: Duration = Duration::from_millis(200);

/// Shortest query (after trimming) that is ever searched.
pub const MIN_QUERY_LEN: usize = 2;

pub const SEARCH_ERROR_TITLE: &str = "Search Error";
pub const SEARCH_ERROR_DESCRIPTION: &str = "Failed to search stocks. Please try again.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Debouncing,
    Searching,
    Displaying,
}

/// Snapshot of what the search box should render.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchView {
    pub query: String,
    pub phase: Phase,
    pub results: Vec<SearchResult>,
    pub panel_open: bool,
    /// The latest search failed. The panel shows neither results nor the
    /// empty state.
    pub failed: bool,
}

impl SearchView {
    /// The panel shows a loading indicator.
    pub fn is_loading(&self) -> bool {
        self.panel_open && self.phase == Phase::Searching
    }

    /// The panel shows the "no results" state.
    pub fn shows_empty_state(&self) -> bool {
        self.panel_open
            && self.phase == Phase::Displaying
            && !self.failed
            && self.results.is_empty()
    }
}

/// Output of the coordinator for the embedding UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchEvent {
    /// A symbol was committed, either from the results or typed directly.
    Selected { symbol: String, display_name: String },
    /// A transient message for the user.
    Notice { title: String, description: String },
}

/// Identifies one issued search. Strictly increasing per coordinator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug)]
enum Command {
    Input(String),
    Focus,
    Blur,
    Select(usize),
    Analyze,
}

struct Completion {
    token: RequestToken,
    outcome: Result<Vec<SearchResult>, ClientError>,
}

/// Cloneable handle for driving a running coordinator.
///
/// Commands sent after the coordinator has stopped are dropped.
#[derive(Clone)]
pub struct SearchHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<SearchView>,
}

impl SearchHandle {
    /// The text in the search box changed.
    pub fn input(&self, text: impl Into<String>) {
        self.send(Command::Input(text.into()));
    }

    pub fn focus(&self) {
        self.send(Command::Focus);
    }

    pub fn blur(&self) {
        self.send(Command::Blur);
    }

    /// Commit the displayed result at `index`.
    pub fn select(&self, index: usize) {
        self.send(Command::Select(index));
    }

    /// Commit the typed text as a symbol.
    pub fn analyze(&self) {
        self.send(Command::Analyze);
    }

    /// Current view.
    pub fn view(&self) -> SearchView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view.clone()
    }

    fn send(&self, command: Command) {
        if let Err(e) = self.commands.send(command) {
            debug!("Search coordinator stopped, dropping {:?}", e.0);
        }
    }
}

/// Start a coordinator on the current runtime.
///
/// The task stops once every [`SearchHandle`] has been dropped.
pub fn spawn_search_coordinator(
    backend: Arc<dyn SymbolSearch>,
) -> (SearchHandle, mpsc::UnboundedReceiver<SearchEvent>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (completion_tx, completion_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(SearchView::default());
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let coordinator = SearchCoordinator {
        backend,
        view: SearchView::default(),
        view_tx,
        events: event_tx,
        completions: completion_tx,
        latest: RequestToken::default(),
        in_flight: None,
        debounce_deadline: None,
        blur_deadline: None,
    };
    tokio::spawn(coordinator.run(command_rx, completion_rx));

    let handle = SearchHandle {
        commands: command_tx,
        view: view_rx,
    };
    (handle, event_rx)
}

struct SearchCoordinator {
    backend: Arc<dyn SymbolSearch>,
    view: SearchView,
    view_tx: watch::Sender<SearchView>,
    events: mpsc::UnboundedSender<SearchEvent>,
    completions: mpsc::UnboundedSender<Completion>,
    latest: RequestToken,
    /// Token of the latest search while it has not completed.
    in_flight: Option<RequestToken>,
    debounce_deadline: Option<Instant>,
    blur_deadline: Option<Instant>,
}

impl SearchCoordinator {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        debug!("Search coordinator started");

        loop {
            let debounce = self.debounce_deadline;
            let blur = self.blur_deadline;

            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(completion) = completions.recv() => self.complete(completion),
                _ = sleep_until(debounce.unwrap_or_else(Instant::now)), if debounce.is_some() => {
                    self.debounce_deadline = None;
                    self.issue_search();
                }
                _ = sleep_until(blur.unwrap_or_else(Instant::now)), if blur.is_some() => {
                    self.blur_deadline = None;
                    self.view.panel_open = false;
                }
            }

            self.publish();
        }

        debug!("Search coordinator shutting down");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Input(text) => self.on_input(text),
            Command::Focus => self.on_focus(),
            Command::Blur => self.blur_deadline = Some(Instant::now() + BLUR_GRACE),
            Command::Select(index) => self.on_select(index),
            Command::Analyze => self.on_analyze(),
        }
    }

    fn on_input(&mut self, text: String) {
        self.view.query = text;

        if is_searchable(&self.view.query) {
            self.debounce_deadline = Some(Instant::now() + DEBOUNCE);
            self.view.phase = Phase::Debouncing;
        } else {
            self.debounce_deadline = None;
            self.supersede();
            self.view.results.clear();
            self.view.failed = false;
            self.view.phase = Phase::Idle;
            self.view.panel_open = false;
        }
    }

    fn on_focus(&mut self) {
        self.blur_deadline = None;
        if is_searchable(&self.view.query) {
            self.view.panel_open = true;
        }
    }

    fn on_select(&mut self, index: usize) {
        if !self.view.panel_open || self.view.phase != Phase::Displaying {
            debug!(index, phase = ?self.view.phase, "Ignoring selection while no results are displayed");
            return;
        }
        let Some(result) = self.view.results.get(index).cloned() else {
            debug!(index, "Ignoring selection outside the displayed results");
            return;
        };

        self.view.query = result.symbol.clone();
        self.commit(result.symbol, result.name);
    }

    fn on_analyze(&mut self) {
        let text = self.view.query.trim().to_string();
        if text.is_empty() || self.in_flight.is_some() {
            debug!("Ignoring analyze request");
            return;
        }
        self.commit(text.clone(), text);
    }

    fn commit(&mut self, symbol: String, display_name: String) {
        self.debounce_deadline = None;
        self.blur_deadline = None;
        self.supersede();
        self.view.failed = false;
        self.view.phase = Phase::Idle;
        self.view.panel_open = false;

        debug!(%symbol, "Symbol selected");
        self.emit(SearchEvent::Selected {
            symbol,
            display_name,
        });
    }

    fn issue_search(&mut self) {
        let query = self.view.query.trim().to_string();
        if !is_searchable(&query) {
            return;
        }

        self.latest = self.latest.next();
        let token = self.latest;
        self.in_flight = Some(token);
        self.view.failed = false;
        self.view.phase = Phase::Searching;
        self.view.panel_open = true;

        debug!(token = token.0, %query, "Issuing symbol search");

        let backend = self.backend.clone();
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let outcome = backend.search_symbols(&query).await;
            // The coordinator may have stopped while the call was in flight.
            let _ = completions.send(Completion { token, outcome });
        });
    }

    fn complete(&mut self, completion: Completion) {
        if completion.token != self.latest {
            debug!(
                token = completion.token.0,
                latest = self.latest.0,
                "Discarding stale search completion"
            );
            return;
        }
        self.in_flight = None;

        match completion.outcome {
            Ok(results) => {
                debug!(count = results.len(), "Search results received");
                self.view.results = results;
                self.view.failed = false;
                self.view.panel_open = true;
            }
            Err(e) => {
                warn!("Symbol search failed: {}", e);
                self.view.results.clear();
                self.view.failed = true;
                self.emit(SearchEvent::Notice {
                    title: SEARCH_ERROR_TITLE.to_string(),
                    description: SEARCH_ERROR_DESCRIPTION.to_string(),
                });
            }
        }

        // Newer input is already waiting; keep debouncing.
        if self.debounce_deadline.is_none() {
            self.view.phase = Phase::Displaying;
        }
    }

    /// Make any in-flight search stale without issuing a new one.
    fn supersede(&mut self) {
        self.latest = self.latest.next();
        self.in_flight = None;
    }

    fn emit(&self, event: SearchEvent) {
        if self.events.send(event).is_err() {
            debug!("Search event receiver dropped");
        }
    }

    fn publish(&self) {
        let view = &self.view;
        self.view_tx.send_if_modified(|current| {
            if current == view {
                false
            } else {
                *current = view.clone();
                true
            }
        });
    }
}

fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::sleep;

    /// Echoes the query back as one result. Queries starting with "fail" error
    /// and queries starting with "zz" return nothing.
    #[derive(Default)]
    struct ScriptedBackend {
        calls: Mutex<Vec<String>>,
        delays: HashMap<&'static str, Duration>,
    }

    impl ScriptedBackend {
        fn with_delays(delays: &[(&'static str, u64)]) -> Self {
            Self {
                delays: delays
                    .iter()
                    .map(|(query, ms)| (*query, Duration::from_millis(*ms)))
                    .collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SymbolSearch for ScriptedBackend {
        async fn search_symbols(&self, query: &str) -> Result<Vec<SearchResult>, ClientError> {
            self.calls.lock().unwrap().push(query.to_string());
            if let Some(delay) = self.delays.get(query) {
                sleep(*delay).await;
            }
            if query.starts_with("fail") {
                return Err(ClientError::Gateway {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            if query.starts_with("zz") {
                return Ok(Vec::new());
            }
            Ok(vec![SearchResult::new(
                query.to_uppercase(),
                format!("{} Inc", query),
                "Equity",
                "United States",
                "USD",
            )])
        }
    }

    fn start(
        backend: ScriptedBackend,
    ) -> (
        Arc<ScriptedBackend>,
        SearchHandle,
        mpsc::UnboundedReceiver<SearchEvent>,
    ) {
        let backend = Arc::new(backend);
        let (handle, events) = spawn_search_coordinator(backend.clone());
        (backend, handle, events)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_never_searches() {
        let (backend, handle, _events) = start(ScriptedBackend::default());

        handle.input("a");
        sleep(ms(1000)).await;

        assert!(backend.calls().is_empty());
        let view = handle.view();
        assert_eq!(view.phase, Phase::Idle);
        assert!(!view.panel_open);
        assert!(view.results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_into_one_search() {
        let (backend, handle, _events) = start(ScriptedBackend::default());

        for text in ["a", "ap", "app", "appl"] {
            handle.input(text);
            sleep(ms(100)).await;
        }
        assert!(backend.calls().is_empty());

        sleep(ms(1000)).await;

        assert_eq!(backend.calls(), vec!["appl".to_string()]);
        let view = handle.view();
        assert_eq!(view.phase, Phase::Displaying);
        assert!(view.panel_open);
        assert_eq!(view.results.len(), 1);
        assert_eq!(view.results[0].symbol, "APPL");
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_waits_for_quiet_period() {
        let (backend, handle, _events) = start(ScriptedBackend::default());

        handle.input("ms");
        sleep(ms(250)).await;
        assert!(backend.calls().is_empty());
        assert_eq!(handle.view().phase, Phase::Debouncing);

        sleep(ms(100)).await;
        assert_eq!(backend.calls(), vec!["ms".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_while_in_flight() {
        let (_backend, handle, _events) = start(ScriptedBackend::with_delays(&[("nv", 1000)]));

        handle.input("nv");
        sleep(ms(400)).await;

        let view = handle.view();
        assert_eq!(view.phase, Phase::Searching);
        assert!(view.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_completion_is_discarded() {
        let (backend, handle, _events) =
            start(ScriptedBackend::with_delays(&[("ab", 1000), ("abc", 100)]));

        handle.input("ab");
        sleep(ms(400)).await;
        handle.input("abc");

        sleep(ms(500)).await;
        assert_eq!(handle.view().results[0].symbol, "ABC");

        // "ab" completes after "abc" and must not overwrite it.
        sleep(ms(1000)).await;
        assert_eq!(backend.calls(), vec!["ab".to_string(), "abc".to_string()]);
        let view = handle.view();
        assert_eq!(view.results.len(), 1);
        assert_eq!(view.results[0].symbol, "ABC");
        assert_eq!(view.phase, Phase::Displaying);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_input_supersedes_in_flight_search() {
        let (_backend, handle, _events) = start(ScriptedBackend::with_delays(&[("ab", 1000)]));

        handle.input("ab");
        sleep(ms(400)).await;
        handle.input("a");
        sleep(ms(2000)).await;

        let view = handle.view();
        assert!(view.results.is_empty());
        assert!(!view.panel_open);
        assert_eq!(view.phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_emits_one_notice() {
        let (_backend, handle, mut events) = start(ScriptedBackend::default());

        handle.input("fail");
        sleep(ms(1000)).await;

        assert_eq!(
            events.try_recv().unwrap(),
            SearchEvent::Notice {
                title: "Search Error".to_string(),
                description: "Failed to search stocks. Please try again.".to_string(),
            }
        );
        assert!(events.try_recv().is_err());
        let view = handle.view();
        assert!(view.results.is_empty());
        assert!(view.failed);
        assert!(!view.shows_empty_state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_failure_clears_failed_flag() {
        let (_backend, handle, _events) = start(ScriptedBackend::default());

        handle.input("fail");
        sleep(ms(1000)).await;
        assert!(handle.view().failed);

        handle.input("zzzz");
        sleep(ms(1000)).await;
        let view = handle.view();
        assert!(!view.failed);
        assert!(view.shows_empty_state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_result_is_not_an_error() {
        let (_backend, handle, mut events) = start(ScriptedBackend::default());

        handle.input("zzzz");
        sleep(ms(1000)).await;

        assert!(events.try_recv().is_err());
        assert!(handle.view().shows_empty_state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_emits_exactly_one_event() {
        let (backend, handle, mut events) = start(ScriptedBackend::default());

        handle.input("ms");
        sleep(ms(1000)).await;
        handle.select(0);
        sleep(ms(1000)).await;

        assert_eq!(
            events.try_recv().unwrap(),
            SearchEvent::Selected {
                symbol: "MS".to_string(),
                display_name: "ms Inc".to_string(),
            }
        );
        assert!(events.try_recv().is_err());
        assert_eq!(backend.calls().len(), 1);

        let view = handle.view();
        assert_eq!(view.query, "MS");
        assert!(!view.panel_open);
        assert_ne!(view.phase, Phase::Displaying);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_ignored_while_newer_search_loads() {
        let (_backend, handle, mut events) = start(ScriptedBackend::with_delays(&[("okx", 1000)]));

        handle.input("ok");
        sleep(ms(1000)).await;
        assert_eq!(handle.view().results[0].symbol, "OK");

        handle.input("okx");
        sleep(ms(400)).await;
        assert!(handle.view().is_loading());
        handle.select(0);
        sleep(ms(10)).await;
        assert!(events.try_recv().is_err());

        sleep(ms(1000)).await;
        handle.select(0);
        sleep(ms(10)).await;
        assert_eq!(
            events.try_recv().unwrap(),
            SearchEvent::Selected {
                symbol: "OKX".to_string(),
                display_name: "okx Inc".to_string(),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_out_of_range_is_ignored() {
        let (_backend, handle, mut events) = start(ScriptedBackend::default());

        handle.input("ms");
        sleep(ms(1000)).await;
        handle.select(5);
        sleep(ms(10)).await;

        assert!(events.try_recv().is_err());
        assert!(handle.view().panel_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blur_closes_panel_after_grace() {
        let (_backend, handle, _events) = start(ScriptedBackend::default());

        handle.input("ms");
        sleep(ms(1000)).await;
        assert!(handle.view().panel_open);

        handle.blur();
        sleep(ms(150)).await;
        assert!(handle.view().panel_open);
        sleep(ms(100)).await;
        assert!(!handle.view().panel_open);

        handle.focus();
        sleep(ms(10)).await;
        assert!(handle.view().panel_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_cancels_pending_blur() {
        let (_backend, handle, _events) = start(ScriptedBackend::default());

        handle.input("ms");
        sleep(ms(1000)).await;
        handle.blur();
        sleep(ms(100)).await;
        handle.focus();
        sleep(ms(500)).await;

        assert!(handle.view().panel_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_commits_typed_text() {
        let (_backend, handle, mut events) = start(ScriptedBackend::default());

        handle.input("tsla");
        sleep(ms(1000)).await;
        handle.analyze();
        sleep(ms(10)).await;

        assert_eq!(
            events.try_recv().unwrap(),
            SearchEvent::Selected {
                symbol: "tsla".to_string(),
                display_name: "tsla".to_string(),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_ignored_while_empty_or_searching() {
        let (_backend, handle, mut events) = start(ScriptedBackend::with_delays(&[("nvda", 1000)]));

        handle.analyze();
        sleep(ms(10)).await;
        assert!(events.try_recv().is_err());

        handle.input("nvda");
        sleep(ms(400)).await;
        handle.analyze();
        sleep(ms(10)).await;
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_tokens_increase() {
        let token = RequestToken::default();
        assert!(token.next() > token);
        assert!(token.next().next() > token.next());
    }
}
