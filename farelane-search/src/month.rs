use std::sync::Arc;

use chrono::NaiveDate;
use farelane_core::{FlightSearchClient, Normalizer, SearchRequest};
use farelane_shared::{days_in_month, DayResults, Direction, MonthPhase, MonthSearchResults};
use farelane_store::SessionStore;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSearchConfig {
    /// Skip days before today.
    pub restrict_past_dates: bool,
}

impl Default for MonthSearchConfig {
    fn default() -> Self {
        Self { restrict_past_dates: true }
    }
}

/// A whole month of single-day searches built from `base`. For round trips
/// the inbound leg is searched after the outbound leg, over the same month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSearchRequest {
    pub base: SearchRequest,
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub round_trip: bool,
}

impl MonthSearchRequest {
    fn phases(&self) -> &'static [Direction] {
        if self.round_trip {
            &[Direction::Outbound, Direction::Inbound]
        } else {
            &[Direction::Outbound]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthRunState {
    Completed,
    Cancelled,
    /// A newer search took over; nothing was written after that point.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct MonthSearchOutcome {
    pub state: MonthRunState,
    pub results: MonthSearchResults,
    pub failed_days: Vec<NaiveDate>,
}

/// Sequential day-by-day fetch loop behind month searches.
pub struct MonthSearchOrchestrator {
    client: Arc<dyn FlightSearchClient>,
    store: Arc<SessionStore>,
    normalizer: Arc<Normalizer>,
    config: MonthSearchConfig,
}

impl MonthSearchOrchestrator {
    pub fn new(
        client: Arc<dyn FlightSearchClient>,
        store: Arc<SessionStore>,
        normalizer: Arc<Normalizer>,
        config: MonthSearchConfig,
    ) -> Self {
        Self {
            client,
            store,
            normalizer,
            config,
        }
    }

    /// Run every day of the month, one request at a time, persisting the
    /// aggregate after each day.
    ///
    /// Stops early when `cancel` fires (the in-flight request is dropped) or
    /// when `search_id` stops being the current search. Days fetched so far
    /// are kept either way.
    pub async fn run(
        &self,
        request: &MonthSearchRequest,
        search_id: u64,
        today: NaiveDate,
        cancel: CancellationToken,
    ) -> Result<MonthSearchOutcome, SearchError> {
        let invalid = || SearchError::InvalidMonth {
            year: request.year,
            month: request.month,
        };
        let days = days_in_month(request.year, request.month).ok_or_else(invalid)?;
        let phases = request.phases();

        let first_phase = if request.round_trip { MonthPhase::Outbound } else { MonthPhase::Done };
        let mut results = MonthSearchResults::new(request.year, request.month, days * phases.len() as u32, first_phase);
        let mut failed_days = Vec::new();

        if !self.store.is_current(search_id).await? {
            return Ok(superseded(results, failed_days));
        }
        self.persist(search_id, &results).await?;
        info!(
            "Month search #{} started for {}-{:02} ({} phase(s))",
            search_id,
            request.year,
            request.month,
            phases.len()
        );

        let mut state = MonthRunState::Completed;
        'phases: for &direction in phases {
            if request.round_trip {
                results.meta.phase = match direction {
                    Direction::Outbound => MonthPhase::Outbound,
                    Direction::Inbound => MonthPhase::Inbound,
                };
                info!("Month search #{} entering {} phase", search_id, direction.as_str());
            }

            for day in 1..=days {
                if cancel.is_cancelled() {
                    state = MonthRunState::Cancelled;
                    break 'phases;
                }
                if !self.store.is_current(search_id).await? {
                    return Ok(superseded(results, failed_days));
                }

                let date = NaiveDate::from_ymd_opt(request.year, request.month, day).ok_or_else(invalid)?;
                if self.config.restrict_past_dates && date < today {
                    results.meta.loaded_days += 1;
                    continue;
                }

                let day_request = request.base.for_day(date, direction == Direction::Inbound);
                let response = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        state = MonthRunState::Cancelled;
                        break 'phases;
                    }
                    response = self.client.search(&day_request) => response,
                };

                let flights = response
                    .map_err(|e| e.to_string())
                    .and_then(|raw| self.normalizer.normalize(&raw).map_err(|e| e.to_string()))
                    .map(|normalized| normalized.outbound().to_vec());

                // The request may have outlived its search.
                if !self.store.is_current(search_id).await? {
                    return Ok(superseded(results, failed_days));
                }

                results.meta.loaded_days += 1;
                match flights {
                    Ok(flights) => {
                        debug!("Month search #{}: {} {} -> {} flights", search_id, direction.as_str(), date, flights.len());
                        results.push_day(DayResults { day: date, direction, flights });
                        self.persist(search_id, &results).await?;
                    }
                    Err(e) => {
                        warn!("Month search #{}: skipping {} {}: {}", search_id, direction.as_str(), date, e);
                        failed_days.push(date);
                    }
                }
            }
        }

        results.meta.loading = false;
        results.meta.phase = MonthPhase::Done;
        if !self.store.is_current(search_id).await? {
            return Ok(superseded(results, failed_days));
        }
        self.persist(search_id, &results).await?;

        match state {
            MonthRunState::Cancelled => info!(
                "Month search #{} cancelled after {} day(s)",
                search_id,
                results.data.per_day_results.len()
            ),
            _ => info!(
                "Month search #{} completed: {} flights, {} failed day(s)",
                search_id,
                results.data.total_count,
                failed_days.len()
            ),
        }

        Ok(MonthSearchOutcome {
            state,
            results,
            failed_days,
        })
    }

    async fn persist(&self, search_id: u64, results: &MonthSearchResults) -> Result<(), SearchError> {
        let raw = serde_json::to_value(results)?;
        self.store.save_search_result(search_id, &raw).await?;
        Ok(())
    }
}

fn superseded(mut results: MonthSearchResults, failed_days: Vec<NaiveDate>) -> MonthSearchOutcome {
    results.meta.loading = false;
    info!("Month search superseded, dropping further writes");
    MonthSearchOutcome {
        state: MonthRunState::Superseded,
        results,
        failed_days,
    }
}
