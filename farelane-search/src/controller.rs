use std::collections::HashSet;
use std::sync::Arc;

use farelane_core::{filter_and_sort, reconcile, CoreError, FilterCriteria, FlightSearchClient, Normalizer, SearchRequest};
use farelane_shared::{
    airline_slug, Airline, CacheKey, Direction, FlightRecord, MonthMeta, PassengerCounts, SearchResponse,
    SessionChangedEvent, TripType,
};
use farelane_store::app_config::SearchConfig;
use farelane_store::SessionStore;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::buckets::{group_by_month, MonthBucket};
use crate::clock::Clock;
use crate::month::{MonthSearchConfig, MonthSearchOrchestrator, MonthSearchOutcome, MonthSearchRequest};
use crate::reveal::{ProgressiveReveal, RevealConfig};
use crate::selection::{RoundTripSelection, SelectionError};
use crate::SearchError;

#[derive(Debug, Clone)]
pub struct ResultsConfig {
    pub reveal: RevealConfig,
    pub month: MonthSearchConfig,
    pub page_size: u32,
    pub ensure_max_iterations: u32,
    pub max_limit: u32,
    pub default_cabin_class: String,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for ResultsConfig {
    fn from(cfg: &SearchConfig) -> Self {
        Self {
            reveal: RevealConfig {
                skeleton_window_ms: cfg.skeleton_window_ms,
                group_interval_ms: cfg.reveal_interval_ms,
            },
            month: MonthSearchConfig {
                restrict_past_dates: cfg.restrict_past_dates,
            },
            page_size: cfg.page_size.max(1),
            ensure_max_iterations: cfg.ensure_max_iterations,
            max_limit: cfg.max_limit.max(1),
            default_cabin_class: cfg.default_cabin_class.clone(),
        }
    }
}

/// Everything a results page renders, in one serializable value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub search_id: Option<u64>,
    pub trip_type: TripType,
    pub outbound: Vec<FlightRecord>,
    pub inbound: Vec<FlightRecord>,
    pub month: Option<MonthMeta>,
    pub month_buckets: Vec<MonthBucket>,
    pub selection: RoundTripSelection,
    pub booking_step: u8,
    pub passengers: Option<PassengerCounts>,
    pub passenger_total: u32,
    pub total_count: u64,
    pub can_load_more: bool,
    pub selected_airlines: Vec<String>,
    pub criteria: FilterCriteria,
    pub suggestions: Vec<FlightRecord>,
    pub error: Option<String>,
    pub loading: bool,
    pub skeleton: bool,
}

struct MonthTask {
    search_id: u64,
    cancel: CancellationToken,
    handle: JoinHandle<Result<MonthSearchOutcome, SearchError>>,
}

/// Result state for one traveller session.
///
/// Reads the session store, normalizes what it finds and layers filters,
/// the progressive reveal and the round-trip selection on top. Searches go
/// through here too, so the store is the only place results live.
pub struct ResultsController {
    client: Arc<dyn FlightSearchClient>,
    store: Arc<SessionStore>,
    normalizer: Arc<Normalizer>,
    clock: Arc<dyn Clock>,
    config: ResultsConfig,
    airlines: Vec<Airline>,
    events: broadcast::Receiver<SessionChangedEvent>,

    response: Option<SearchResponse>,
    search_id: Option<u64>,
    trip_type: TripType,
    last_request: Option<SearchRequest>,
    last_requested_passengers: Option<PassengerCounts>,
    passengers: Option<PassengerCounts>,

    selected_airlines: Vec<String>,
    criteria: FilterCriteria,
    selection: RoundTripSelection,
    reveal: ProgressiveReveal,
    suggestions: Vec<FlightRecord>,

    error: Option<String>,
    loading: bool,
    month_task: Option<MonthTask>,
}

impl ResultsController {
    pub fn new(
        client: Arc<dyn FlightSearchClient>,
        store: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        config: ResultsConfig,
    ) -> Self {
        let events = store.subscribe();
        let reveal = ProgressiveReveal::new(config.reveal);
        Self {
            client,
            store,
            normalizer: Arc::new(Normalizer::new()),
            clock,
            config,
            airlines: Vec::new(),
            events,
            response: None,
            search_id: None,
            trip_type: TripType::OneWay,
            last_request: None,
            last_requested_passengers: None,
            passengers: None,
            selected_airlines: Vec::new(),
            criteria: FilterCriteria::default(),
            selection: RoundTripSelection::new(),
            reveal,
            suggestions: Vec::new(),
            error: None,
            loading: false,
            month_task: None,
        }
    }

    pub fn with_airlines(mut self, airlines: Vec<Airline>) -> Self {
        self.airlines = airlines;
        self
    }

    // ------------------------------------------------------------------
    // Store synchronisation
    // ------------------------------------------------------------------

    /// Pick up whatever a previous process left in the session.
    pub async fn restore(&mut self) -> Result<(), SearchError> {
        if let Some(trip_type) = self.store.trip_type().await? {
            self.trip_type = trip_type;
        }
        self.last_requested_passengers = self.store.last_passengers().await?;
        self.refresh().await?;
        self.drain_events();
        info!("Restored session (trip type {}, search {:?})", self.trip_type, self.search_id);
        Ok(())
    }

    /// Apply pending change notifications. Returns whether state was re-read.
    pub async fn sync(&mut self) -> Result<bool, SearchError> {
        let mut relevant = false;
        loop {
            match self.events.try_recv() {
                Ok(event) => relevant |= affects_results(&event),
                Err(TryRecvError::Lagged(missed)) => {
                    warn!("Missed {} session change notifications, re-reading", missed);
                    relevant = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        if relevant {
            self.refresh().await?;
        }
        Ok(relevant)
    }

    /// Re-read the session store and rebuild the canonical result.
    pub async fn refresh(&mut self) -> Result<(), SearchError> {
        if let Some(trip_type) = self.store.trip_type().await? {
            self.trip_type = trip_type;
        }
        if let Some(passengers) = self.store.last_passengers().await? {
            self.last_requested_passengers = Some(passengers);
        }
        self.search_id = self.store.search_id().await?;

        let Some(raw) = self.store.last_search_result().await? else {
            self.response = None;
            self.passengers = self.last_requested_passengers;
            if self.month_task.is_none() {
                self.loading = false;
            }
            return Ok(());
        };

        match self.normalizer.normalize(&raw) {
            Ok(response) => {
                self.passengers = reconcile(Some(&raw), self.last_requested_passengers.as_ref());
                self.loading = match &response {
                    SearchResponse::Month(month) => month.meta.loading,
                    _ => false,
                };
                self.error = None;
                self.store.save_snapshot(self.search_id, &response).await?;
                self.response = Some(response);
                self.observe_reveal().await?;
            }
            Err(e) => {
                warn!("Stored search result could not be normalized: {}", e);
                self.error = Some(e.user_message());
                self.response = None;
                self.loading = false;
            }
        }
        Ok(())
    }

    /// Advance the reveal timers. Persists the marker once a search has been
    /// fully revealed so a reload does not replay it.
    pub async fn tick(&mut self) -> Result<(), SearchError> {
        let now = self.clock.now_ms();
        let flights = self.filtered(Direction::Outbound);
        if let Some(search_id) = self.reveal.advance(now, &flights) {
            self.store.mark_reveal_applied(search_id).await?;
            self.drain_events();
        }
        Ok(())
    }

    /// When `tick` should next run, if a reveal is pending.
    pub fn next_tick_at(&self) -> Option<i64> {
        self.reveal.next_deadline()
    }

    async fn observe_reveal(&mut self) -> Result<(), SearchError> {
        let Some(search_id) = self.search_id else {
            self.reveal.reset();
            return Ok(());
        };
        let started_at = self.store.search_started_at().await?.unwrap_or_else(|| self.clock.now_ms());
        let applied = self.store.reveal_applied_for().await? == Some(search_id);
        self.reveal.observe(search_id, started_at, self.clock.now_ms(), applied);
        Ok(())
    }

    /// Drop notifications caused by our own writes; state is already fresh.
    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    // ------------------------------------------------------------------
    // Searching
    // ------------------------------------------------------------------

    /// Brand-new single-shot search. Replaces everything in the session.
    pub async fn search(&mut self, mut request: SearchRequest) -> Result<(), SearchError> {
        if let Err(msg) = request.validate() {
            self.error = Some(msg.clone());
            return Err(CoreError::ValidationError(msg).into());
        }
        self.cancel_month_search();

        request.page = 1;
        request.limit = request.limit.max(self.config.page_size).min(self.config.max_limit);
        if request.cabin_class.trim().is_empty() {
            request.cabin_class = self.config.default_cabin_class.clone();
        }
        let trip_type = if request.is_round_trip() { TripType::RoundTrip } else { TripType::OneWay };

        let search_id = self.start_session(trip_type, request.passengers).await?;
        self.last_request = Some(request.clone());
        info!(
            "Search #{}: {} -> {} on {} ({})",
            search_id, request.origin_code, request.destination_code, request.departure_date, trip_type
        );

        match self.client.search(&request).await {
            Ok(raw) => {
                if !self.store.is_current(search_id).await? {
                    debug!("Search #{} superseded before its response arrived", search_id);
                    return Ok(());
                }
                if let Err(e) = self.normalizer.normalize(&raw) {
                    warn!("Search #{} returned unusable data: {}", search_id, e);
                    self.error = Some(e.user_message());
                    self.loading = false;
                    return Ok(());
                }
                self.store.save_search_result(search_id, &raw).await?;
                self.refresh().await?;
                self.drain_events();
            }
            Err(e) => {
                error!("Search #{} failed: {}", search_id, e);
                self.error = Some(e.user_message());
                self.loading = false;
            }
        }
        Ok(())
    }

    /// Start a month search in the background. Progress arrives through the
    /// session store; call [`ResultsController::sync`] to pick it up.
    pub async fn search_month(&mut self, request: MonthSearchRequest) -> Result<u64, SearchError> {
        if let Err(msg) = request.base.validate() {
            self.error = Some(msg.clone());
            return Err(CoreError::ValidationError(msg).into());
        }
        if farelane_shared::days_in_month(request.year, request.month).is_none() {
            return Err(SearchError::InvalidMonth {
                year: request.year,
                month: request.month,
            });
        }
        self.cancel_month_search();

        let trip_type = if request.round_trip { TripType::RoundTrip } else { TripType::OneWay };
        let search_id = self.start_session(trip_type, request.base.passengers).await?;
        self.last_request = None;

        let orchestrator = MonthSearchOrchestrator::new(
            self.client.clone(),
            self.store.clone(),
            self.normalizer.clone(),
            self.config.month,
        );
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let today = self.clock.today();
        let handle = tokio::spawn(async move { orchestrator.run(&request, search_id, today, token).await });

        self.month_task = Some(MonthTask {
            search_id,
            cancel,
            handle,
        });
        Ok(search_id)
    }

    /// Ask the running month search to stop. Days already fetched stay.
    pub fn cancel_month_search(&mut self) -> bool {
        match &self.month_task {
            Some(task) if !task.cancel.is_cancelled() => {
                info!("Cancelling month search #{}", task.search_id);
                task.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn month_search_running(&self) -> bool {
        self.month_task.as_ref().is_some_and(|task| !task.handle.is_finished())
    }

    /// Wait for the background month search to end and pick up its last state.
    pub async fn wait_for_month_search(&mut self) -> Result<Option<MonthSearchOutcome>, SearchError> {
        let Some(task) = self.month_task.take() else {
            return Ok(None);
        };
        let outcome = task.handle.await.map_err(|e| SearchError::Task(e.to_string()))??;
        self.refresh().await?;
        self.drain_events();
        Ok(Some(outcome))
    }

    /// Clear the previous session and claim a fresh search id.
    async fn start_session(&mut self, trip_type: TripType, passengers: PassengerCounts) -> Result<u64, SearchError> {
        self.store.clear().await?;
        self.store.set_trip_type(trip_type).await?;
        self.store.set_last_passengers(&passengers).await?;
        let search_id = self.store.begin_search(self.clock.now_ms()).await?;

        self.trip_type = trip_type;
        self.last_requested_passengers = Some(passengers);
        self.passengers = Some(passengers);
        self.search_id = Some(search_id);
        self.response = None;
        self.selection.clear();
        self.suggestions.clear();
        self.error = None;
        self.loading = true;
        self.observe_reveal().await?;
        self.drain_events();
        Ok(search_id)
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    pub fn can_load_more(&self) -> bool {
        if self.last_request.is_none() {
            return false;
        }
        match &self.response {
            Some(SearchResponse::OneWay(r)) => r.total_count > r.search_results.len() as u64,
            Some(SearchResponse::RoundTrip(r)) => {
                r.outbound_total_count > r.outbound_search_results.len() as u64
                    || r.inbound_total_count > r.inbound_search_results.len() as u64
            }
            _ => false,
        }
    }

    /// Widen the current query by one page. Returns how many new records
    /// arrived. A failure keeps what is already loaded.
    pub async fn load_more(&mut self) -> Result<usize, SearchError> {
        if !self.can_load_more() {
            return Ok(0);
        }
        let Some(current) = self.last_request.as_ref() else {
            return Ok(0);
        };
        let limit = (current.limit + self.config.page_size).min(self.config.max_limit);
        if limit <= current.limit {
            return Ok(0);
        }
        self.fetch_with_limit(limit).await
    }

    /// Keep widening a one-way query until at least `wanted` records are
    /// loaded, the backend has nothing more, or the iteration cap is hit.
    pub async fn ensure_loaded(&mut self, wanted: usize) -> Result<usize, SearchError> {
        let mut iterations = 0;
        loop {
            let Some(SearchResponse::OneWay(current)) = &self.response else {
                break;
            };
            let loaded = current.search_results.len();
            if loaded >= wanted || current.total_count <= loaded as u64 {
                break;
            }
            if iterations >= self.config.ensure_max_iterations {
                warn!("ensure_loaded({}) gave up after {} iterations", wanted, iterations);
                break;
            }
            let Some(request) = self.last_request.as_ref() else {
                break;
            };
            let target = (wanted as u32).max(request.limit + self.config.page_size);
            let limit = target.min(self.config.max_limit);
            if limit <= request.limit {
                break;
            }

            iterations += 1;
            if self.fetch_with_limit(limit).await? == 0 {
                break;
            }
        }
        Ok(self.response.as_ref().map_or(0, |r| r.outbound().len()))
    }

    async fn fetch_with_limit(&mut self, limit: u32) -> Result<usize, SearchError> {
        let (Some(search_id), Some(mut request)) = (self.search_id, self.last_request.clone()) else {
            return Ok(0);
        };
        request.page = 1;
        request.limit = limit;
        let before = self.response.as_ref().map_or(0, SearchResponse::loaded_count);

        let raw = match self.client.search(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Load more for search #{} failed: {}", search_id, e);
                self.error = Some(e.user_message());
                return Ok(0);
            }
        };
        if !self.store.is_current(search_id).await? {
            return Ok(0);
        }
        if let Err(e) = self.normalizer.normalize(&raw) {
            warn!("Load more for search #{} returned unreadable data: {}", search_id, e);
            self.error = Some(e.user_message());
            return Ok(0);
        }

        self.last_request = Some(request);
        self.store.save_search_result(search_id, &raw).await?;
        self.refresh().await?;
        self.drain_events();

        let after = self.response.as_ref().map_or(0, SearchResponse::loaded_count);
        debug!("Search #{} now has {} records (limit {})", search_id, after, limit);
        Ok(after.saturating_sub(before))
    }

    // ------------------------------------------------------------------
    // Airlines
    // ------------------------------------------------------------------

    /// Every known airline, i.e. the "all airlines" filter baseline.
    pub fn default_airline_filter(&self) -> Vec<String> {
        self.airlines.iter().map(Airline::slug).collect()
    }

    pub fn airline_logo(&self, airline_name: &str) -> Option<&str> {
        let slug = airline_slug(airline_name);
        self.airlines
            .iter()
            .find(|a| a.slug() == slug)
            .map(|a| a.logo_path.as_str())
    }

    pub fn set_selected_airlines(&mut self, airlines: Vec<String>) {
        self.selected_airlines.clear();
        for slug in airlines.iter().map(|a| airline_slug(a)) {
            if !self.selected_airlines.contains(&slug) {
                self.selected_airlines.push(slug);
            }
        }
        self.suggestions.clear();
    }

    pub fn selected_airlines(&self) -> &[String] {
        &self.selected_airlines
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Ids of the selected airlines, from the reference list and from the
    /// loaded flights themselves.
    fn selected_airline_ids(&self) -> Vec<i64> {
        let selected: HashSet<&str> = self.selected_airlines.iter().map(String::as_str).collect();
        let mut ids: Vec<i64> = self
            .airlines
            .iter()
            .filter(|a| selected.contains(a.slug().as_str()))
            .map(|a| a.id)
            .chain(self.response.iter().flat_map(|r| r.outbound().iter().chain(r.inbound())).filter_map(|f| {
                f.airline_id
                    .filter(|_| selected.contains(airline_slug(&f.airline_name).as_str()))
            }))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Look up flights from airlines outside the current selection.
    ///
    /// The backend is asked to exclude the selected airlines; anything it
    /// sends back from them anyway is dropped here. Results land in
    /// [`ResultsController::suggestions`]. Returns how many were found.
    pub async fn reveal_other_airlines(&mut self) -> Result<usize, SearchError> {
        if self.selected_airlines.is_empty() {
            return Ok(0);
        }
        let Some(mut request) = self.last_request.clone() else {
            return Ok(0);
        };
        // The inbound tab asks for the return leg as a one-way query.
        if self.selection.active_tab == Direction::Inbound {
            let Some(return_date) = request.return_date else {
                return Ok(0);
            };
            request = request.for_day(return_date, true);
        }
        request.page = 1;
        request.exclude_airline_ids = self.selected_airline_ids();

        let raw = match self.client.search(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Other-airline search failed: {}", e);
                self.error = Some(e.user_message());
                return Ok(0);
            }
        };
        let response = match self.normalizer.normalize(&raw) {
            Ok(response) => response,
            Err(e) => {
                self.error = Some(e.user_message());
                return Ok(0);
            }
        };

        let selected: HashSet<&str> = self.selected_airlines.iter().map(String::as_str).collect();
        self.suggestions = response
            .outbound()
            .iter()
            .filter(|f| !selected.contains(airline_slug(&f.airline_name).as_str()))
            .cloned()
            .collect();
        info!("Found {} flights from other airlines", self.suggestions.len());
        Ok(self.suggestions.len())
    }

    pub fn suggestions(&self) -> &[FlightRecord] {
        &self.suggestions
    }

    /// Take the suggested flights into the result set and widen the airline
    /// selection to cover them.
    pub async fn adopt_suggested_airlines(&mut self) -> Result<usize, SearchError> {
        if self.suggestions.is_empty() {
            return Ok(0);
        }
        let (Some(search_id), Some(response)) = (self.search_id, self.response.as_mut()) else {
            return Ok(0);
        };
        let suggestions = std::mem::take(&mut self.suggestions);
        let direction = self.selection.active_tab;

        let target = match response {
            SearchResponse::OneWay(r) => &mut r.search_results,
            SearchResponse::RoundTrip(r) if direction == Direction::Inbound => &mut r.inbound_search_results,
            SearchResponse::RoundTrip(r) => &mut r.outbound_search_results,
            SearchResponse::Month(_) => {
                self.suggestions = suggestions;
                return Ok(0);
            }
        };
        let known: HashSet<i64> = target.iter().map(|f| f.flight_id).collect();
        let mut added = 0;
        for flight in suggestions {
            let slug = airline_slug(&flight.airline_name);
            if !self.selected_airlines.contains(&slug) {
                self.selected_airlines.push(slug);
            }
            if !known.contains(&flight.flight_id) {
                target.push(flight);
                added += 1;
            }
        }
        match response {
            SearchResponse::OneWay(r) => r.total_count = r.total_count.max(r.search_results.len() as u64),
            SearchResponse::RoundTrip(r) => {
                r.outbound_total_count = r.outbound_total_count.max(r.outbound_search_results.len() as u64);
                r.inbound_total_count = r.inbound_total_count.max(r.inbound_search_results.len() as u64);
            }
            SearchResponse::Month(_) => {}
        }

        let raw = serde_json::to_value(&*response)?;
        self.store.save_search_result(search_id, &raw).await?;
        self.refresh().await?;
        self.drain_events();
        Ok(added)
    }

    // ------------------------------------------------------------------
    // Round-trip selection
    // ------------------------------------------------------------------

    pub fn select_flight(&mut self, direction: Direction, flight_id: i64) -> Result<(), SelectionError> {
        let response = self.response.as_ref().ok_or(SelectionError::FlightNotFound(flight_id))?;
        if direction == Direction::Inbound && self.trip_type != TripType::RoundTrip {
            return Err(SelectionError::NotRoundTrip);
        }
        let pool = match direction {
            Direction::Outbound => response.outbound(),
            Direction::Inbound => response.inbound(),
        };
        let flight = pool
            .iter()
            .find(|f| f.flight_id == flight_id)
            .cloned()
            .ok_or(SelectionError::FlightNotFound(flight_id))?;

        match direction {
            Direction::Outbound => self.selection.select_outbound(flight),
            Direction::Inbound => self.selection.select_inbound(flight)?,
        }
        debug!("Selected {} flight {} (step {})", direction.as_str(), flight_id, self.selection.booking_step());
        Ok(())
    }

    pub fn clear_selection(&mut self, direction: Direction) {
        match direction {
            Direction::Outbound => self.selection.clear_outbound(),
            Direction::Inbound => self.selection.clear_inbound(),
        }
    }

    pub fn set_active_tab(&mut self, tab: Direction, allow_backward: bool) -> Result<(), SelectionError> {
        self.selection.set_active_tab(tab, allow_backward)
    }

    pub fn selection(&self) -> &RoundTripSelection {
        &self.selection
    }

    pub fn booking_step(&self) -> u8 {
        self.selection.booking_step()
    }

    /// Switching trip type throws the session away.
    pub async fn set_trip_type(&mut self, trip_type: TripType) -> Result<(), SearchError> {
        if trip_type == self.trip_type {
            return Ok(());
        }
        self.cancel_month_search();
        self.store.clear().await?;
        self.store.set_trip_type(trip_type).await?;
        info!("Trip type switched to {}", trip_type);

        self.trip_type = trip_type;
        self.response = None;
        self.last_request = None;
        self.selection.clear();
        self.suggestions.clear();
        self.reveal.reset();
        self.error = None;
        self.loading = false;
        self.drain_events();
        Ok(())
    }

    pub fn trip_type(&self) -> TripType {
        self.trip_type
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    fn filtered(&self, direction: Direction) -> Vec<FlightRecord> {
        let Some(response) = &self.response else {
            return Vec::new();
        };
        let flights = match direction {
            Direction::Outbound => response.outbound(),
            Direction::Inbound => response.inbound(),
        };
        filter_and_sort(flights, &self.selected_airlines, &self.criteria)
    }

    pub fn outbound_flights(&self) -> Vec<FlightRecord> {
        self.reveal.visible(&self.filtered(Direction::Outbound))
    }

    /// Inbound results aren't gated by the reveal; they are only shown once
    /// an outbound flight is picked.
    pub fn inbound_flights(&self) -> Vec<FlightRecord> {
        self.filtered(Direction::Inbound)
    }

    /// Month results grouped for a calendar, with filters applied per day.
    pub fn month_buckets(&self) -> Vec<MonthBucket> {
        let Some(SearchResponse::Month(month)) = &self.response else {
            return Vec::new();
        };
        let days: Vec<_> = month
            .data
            .per_day_results
            .iter()
            .map(|day| {
                let mut day = day.clone();
                day.flights = self.reveal.visible(&filter_and_sort(&day.flights, &self.selected_airlines, &self.criteria));
                day
            })
            .collect();
        group_by_month(&days)
    }

    pub fn month_meta(&self) -> Option<&MonthMeta> {
        match &self.response {
            Some(SearchResponse::Month(month)) => Some(&month.meta),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&SearchResponse> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_skeleton(&self) -> bool {
        self.reveal.is_skeleton()
    }

    pub fn passengers(&self) -> Option<PassengerCounts> {
        self.passengers
    }

    pub fn passenger_total(&self) -> u32 {
        self.passengers.map_or(0, |p| p.total())
    }

    pub fn search_id(&self) -> Option<u64> {
        self.search_id
    }

    fn total_count(&self) -> u64 {
        match &self.response {
            Some(SearchResponse::OneWay(r)) => r.total_count,
            Some(SearchResponse::RoundTrip(r)) => r.outbound_total_count + r.inbound_total_count,
            Some(SearchResponse::Month(r)) => r.data.total_count,
            None => 0,
        }
    }

    pub fn view(&self) -> ResultsView {
        ResultsView {
            search_id: self.search_id,
            trip_type: self.trip_type,
            outbound: self.outbound_flights(),
            inbound: self.inbound_flights(),
            month: self.month_meta().cloned(),
            month_buckets: self.month_buckets(),
            selection: self.selection.clone(),
            booking_step: self.booking_step(),
            passengers: self.passengers,
            passenger_total: self.passenger_total(),
            total_count: self.total_count(),
            can_load_more: self.can_load_more(),
            selected_airlines: self.selected_airlines.clone(),
            criteria: self.criteria.clone(),
            suggestions: self.suggestions.clone(),
            error: self.error.clone(),
            loading: self.loading,
            skeleton: self.is_skeleton(),
        }
    }
}

fn affects_results(event: &SessionChangedEvent) -> bool {
    [
        CacheKey::LastSearchResult,
        CacheKey::TripType,
        CacheKey::LastPassengers,
        CacheKey::SearchId,
    ]
    .into_iter()
    .any(|key| event.touches(key))
}
