//! Filter/sort engine: owns the query state and keeps the derived list in sync.

use shared::{
    domain::{
        CommuneRecord, DepartmentRef, RequestGeneration, SortDirection, SortField, SortSpec,
        Threshold,
    },
    error::FetchError,
};

use crate::comparator::make_comparator;

pub const DEFAULT_POPULATION_THRESHOLD: u64 = 20_000;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub selected_department: Option<DepartmentRef>,
    pub population_threshold: Threshold,
    pub raw_cities: Vec<CommuneRecord>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub loading: bool,
    pub generation: RequestGeneration,
    pub last_error: Option<FetchError>,
}

impl QueryState {
    pub fn new(selected_department: Option<DepartmentRef>, population_threshold: Threshold) -> Self {
        Self {
            selected_department,
            population_threshold,
            raw_cities: Vec::new(),
            sort_field: SortField::Name,
            sort_direction: SortDirection::Asc,
            loading: false,
            generation: RequestGeneration::default(),
            last_error: None,
        }
    }

    pub fn sort_spec(&self) -> SortSpec {
        SortSpec::new(self.sort_field, self.sort_direction)
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(None, Threshold::AtLeast(DEFAULT_POPULATION_THRESHOLD))
    }
}

/// What a fetch completion did to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchApplication {
    Replaced { all: usize, filtered: usize },
    Failed(FetchError),
    Stale { current: RequestGeneration },
}

#[derive(Debug, Clone, Default)]
pub struct FilterSortEngine {
    state: QueryState,
    filtered: Vec<CommuneRecord>,
}

/// Full filter pass: `rawCities` filtered by threshold, then stable-sorted.
pub fn derive_filtered(
    raw: &[CommuneRecord],
    threshold: Threshold,
    spec: SortSpec,
) -> Vec<CommuneRecord> {
    let mut filtered: Vec<CommuneRecord> = raw
        .iter()
        .filter(|city| threshold.admits(city.population))
        .cloned()
        .collect();
    filtered.sort_by(make_comparator(spec.field, spec.direction));
    filtered
}

impl FilterSortEngine {
    pub fn new(state: QueryState) -> Self {
        let mut engine = Self {
            state,
            filtered: Vec::new(),
        };
        engine.recompute();
        engine
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn filtered(&self) -> &[CommuneRecord] {
        &self.filtered
    }

    /// Starts a new department selection and invalidates every earlier fetch.
    ///
    /// Returns the generation the caller must tag its fetch with, or `None`
    /// when there is nothing to fetch.
    pub fn begin_department(
        &mut self,
        department: Option<DepartmentRef>,
    ) -> Option<RequestGeneration> {
        self.state.generation = self.state.generation.next();
        match department.filter(|department| !department.is_empty()) {
            Some(department) => {
                self.state.selected_department = Some(department);
                self.state.loading = true;
                Some(self.state.generation)
            }
            None => {
                self.state.selected_department = None;
                self.state.loading = false;
                None
            }
        }
    }

    /// Applies a fetch result. Results tagged with a superseded generation
    /// leave the state untouched. A failure keeps the last good list and stops
    /// the loading indicator; a success keeps loading on until [`Self::settle`].
    pub fn apply_fetch(
        &mut self,
        generation: RequestGeneration,
        result: Result<Vec<CommuneRecord>, FetchError>,
    ) -> FetchApplication {
        if generation != self.state.generation {
            return FetchApplication::Stale {
                current: self.state.generation,
            };
        }

        match result {
            Ok(cities) => {
                self.state.raw_cities = cities;
                self.state.last_error = None;
                self.recompute();
                FetchApplication::Replaced {
                    all: self.state.raw_cities.len(),
                    filtered: self.filtered.len(),
                }
            }
            Err(err) => {
                self.state.last_error = Some(err.clone());
                self.state.loading = false;
                FetchApplication::Failed(err)
            }
        }
    }

    /// Ends the settle delay. Returns whether the loading flag was cleared.
    pub fn settle(&mut self, generation: RequestGeneration) -> bool {
        if generation != self.state.generation || !self.state.loading {
            return false;
        }
        self.state.loading = false;
        true
    }

    pub fn set_threshold(&mut self, threshold: Threshold) {
        self.state.population_threshold = threshold;
        self.recompute();
    }

    /// Re-sorts the current filtered list without filtering again.
    pub fn set_sort(&mut self, field: SortField) {
        self.state.sort_field = field;
        self.filtered
            .sort_by(make_comparator(field, self.state.sort_direction));
    }

    /// Flips the direction by reversing the current list. Valid because every
    /// comparator applies the direction to its full key and only value-equal
    /// records compare equal.
    pub fn toggle_order(&mut self) {
        self.state.sort_direction = self.state.sort_direction.flipped();
        self.filtered.reverse();
    }

    fn recompute(&mut self) {
        self.filtered = derive_filtered(
            &self.state.raw_cities,
            self.state.population_threshold,
            self.state.sort_spec(),
        );
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
