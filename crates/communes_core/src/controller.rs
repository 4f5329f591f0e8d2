//! Query controller: the only surface presentation adapters talk to.
//!
//! Intents mutate the engine synchronously. Fetches run as Tokio tasks and
//! report back through a channel; every report carries the generation of the
//! selection that started it, so results for a superseded department are
//! dropped when they are applied.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::{
        CommuneRecord, DepartmentRef, RequestGeneration, SortDirection, SortField, Threshold,
    },
    error::FetchError,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::{
    engine::{FetchApplication, FilterSortEngine, QueryState},
    gateway::CommunesGateway,
};

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryIntent {
    SelectDepartment(Option<DepartmentRef>),
    SetThreshold(Threshold),
    SetSortField(SortField),
    ToggleOrder,
}

impl QueryIntent {
    pub fn name(&self) -> &'static str {
        match self {
            QueryIntent::SelectDepartment(_) => "select_department",
            QueryIntent::SetThreshold(_) => "set_threshold",
            QueryIntent::SetSortField(_) => "set_sort_field",
            QueryIntent::ToggleOrder => "toggle_order",
        }
    }
}

#[derive(Debug)]
pub enum PipelineEvent {
    Loaded {
        generation: RequestGeneration,
        department: DepartmentRef,
        result: Result<Vec<CommuneRecord>, FetchError>,
    },
    Settled {
        generation: RequestGeneration,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineUpdate {
    CitiesReplaced {
        department: DepartmentRef,
        all: usize,
        filtered: usize,
    },
    FetchFailed {
        department: DepartmentRef,
        error: FetchError,
    },
    Settled,
    Discarded {
        generation: RequestGeneration,
    },
}

/// Read-only view handed to presentation adapters.
#[derive(Debug, Clone, Copy)]
pub struct QuerySnapshot<'a> {
    pub selected_department: Option<&'a DepartmentRef>,
    pub population_threshold: Threshold,
    pub loading: bool,
    pub filtered_cities: &'a [CommuneRecord],
    pub all_cities_count: usize,
    pub filtered_count: usize,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub last_error: Option<&'a FetchError>,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub default_department: Option<DepartmentRef>,
    pub default_threshold: Threshold,
    pub settle_delay: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            default_department: None,
            default_threshold: QueryState::default().population_threshold,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

pub struct QueryController {
    engine: FilterSortEngine,
    gateway: Arc<dyn CommunesGateway>,
    settle_delay: Duration,
    events_tx: UnboundedSender<PipelineEvent>,
    events_rx: UnboundedReceiver<PipelineEvent>,
}

impl QueryController {
    pub fn new(gateway: Arc<dyn CommunesGateway>, options: ControllerOptions) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            engine: FilterSortEngine::new(QueryState::new(
                options.default_department,
                options.default_threshold,
            )),
            gateway,
            settle_delay: options.settle_delay,
            events_tx,
            events_rx,
        }
    }

    /// Fetches the department the state was created with. Must run inside a
    /// Tokio runtime.
    pub fn start(&mut self) {
        let department = self.engine.state().selected_department.clone();
        self.select_department(department);
    }

    pub fn snapshot(&self) -> QuerySnapshot<'_> {
        let state = self.engine.state();
        QuerySnapshot {
            selected_department: state.selected_department.as_ref(),
            population_threshold: state.population_threshold,
            loading: state.loading,
            filtered_cities: self.engine.filtered(),
            all_cities_count: state.raw_cities.len(),
            filtered_count: self.engine.filtered().len(),
            sort_field: state.sort_field,
            sort_direction: state.sort_direction,
            last_error: state.last_error.as_ref(),
        }
    }

    pub fn dispatch(&mut self, intent: QueryIntent) {
        debug!(intent = intent.name(), "applying query intent");
        match intent {
            QueryIntent::SelectDepartment(department) => self.select_department(department),
            QueryIntent::SetThreshold(threshold) => self.set_threshold(threshold),
            QueryIntent::SetSortField(field) => self.set_sort_field(field),
            QueryIntent::ToggleOrder => self.toggle_order(),
        }
    }

    /// Must run inside a Tokio runtime when `department` is non-empty.
    pub fn select_department(&mut self, department: Option<DepartmentRef>) {
        let Some(generation) = self.engine.begin_department(department) else {
            debug!("department cleared; nothing to fetch");
            return;
        };
        let Some(department) = self.engine.state().selected_department.clone() else {
            return;
        };

        let gateway = Arc::clone(&self.gateway);
        let events_tx = self.events_tx.clone();
        let settle_delay = self.settle_delay;
        debug!(department = %department.code, generation = generation.0, "spawning communes fetch");

        tokio::spawn(async move {
            let result = gateway.fetch_communes(&department).await;
            let succeeded = result.is_ok();
            if events_tx
                .send(PipelineEvent::Loaded {
                    generation,
                    department,
                    result,
                })
                .is_err()
            {
                return;
            }
            if succeeded {
                if !settle_delay.is_zero() {
                    tokio::time::sleep(settle_delay).await;
                }
                let _ = events_tx.send(PipelineEvent::Settled { generation });
            }
        });
    }

    pub fn set_threshold(&mut self, threshold: Threshold) {
        self.engine.set_threshold(threshold);
    }

    pub fn set_sort_field(&mut self, field: SortField) {
        self.engine.set_sort(field);
    }

    pub fn toggle_order(&mut self) {
        self.engine.toggle_order();
    }

    pub fn apply_event(&mut self, event: PipelineEvent) -> PipelineUpdate {
        match event {
            PipelineEvent::Loaded {
                generation,
                department,
                result,
            } => match self.engine.apply_fetch(generation, result) {
                FetchApplication::Replaced { all, filtered } => {
                    info!(department = %department.code, all, filtered, "communes loaded");
                    PipelineUpdate::CitiesReplaced {
                        department,
                        all,
                        filtered,
                    }
                }
                FetchApplication::Failed(error) => {
                    warn!(department = %department.code, %error, "communes fetch failed");
                    PipelineUpdate::FetchFailed { department, error }
                }
                FetchApplication::Stale { current } => {
                    warn!(
                        department = %department.code,
                        generation = generation.0,
                        current = current.0,
                        "discarding superseded communes fetch"
                    );
                    PipelineUpdate::Discarded { generation }
                }
            },
            PipelineEvent::Settled { generation } => {
                if self.engine.settle(generation) {
                    PipelineUpdate::Settled
                } else {
                    PipelineUpdate::Discarded { generation }
                }
            }
        }
    }

    /// Waits for the next fetch completion or settle expiry and applies it.
    pub async fn next_event(&mut self) -> Option<PipelineUpdate> {
        let event = self.events_rx.recv().await?;
        Some(self.apply_event(event))
    }

    /// Applies every event already queued, without waiting.
    pub fn drain_pending(&mut self) -> Vec<PipelineUpdate> {
        let mut updates = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            updates.push(self.apply_event(event));
        }
        updates
    }

    /// Pumps events until the loading indicator is off.
    pub async fn wait_until_settled(&mut self) -> Vec<PipelineUpdate> {
        let mut updates = Vec::new();
        while self.engine.state().loading {
            match self.next_event().await {
                Some(update) => updates.push(update),
                None => break,
            }
        }
        updates
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
