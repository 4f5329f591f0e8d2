//! Query/filter/sort pipeline for browsing French communes per department.

pub mod catalog;
pub mod comparator;
pub mod config;
pub mod controller;
pub mod engine;
pub mod gateway;

pub use catalog::DepartmentCatalog;
pub use comparator::{compare_names, make_comparator};
pub use config::{load_settings, Settings};
pub use controller::{
    ControllerOptions, PipelineEvent, PipelineUpdate, QueryController, QueryIntent, QuerySnapshot,
};
pub use engine::{derive_filtered, FetchApplication, FilterSortEngine, QueryState};
pub use gateway::{CommunesGateway, HttpCommunesGateway};
