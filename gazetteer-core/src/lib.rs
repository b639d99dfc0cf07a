//! Core library for Gazetteer — a hierarchical location registry (region →
//! city → barangay) backed by a schema-adaptive SQLite store.
//!
//! The primary entry point is [`LocationRegistry`], which represents an open
//! registry database. All hierarchy mutations go through `LocationRegistry`
//! methods; the deployed schema may be at any migration level and every read
//! and write adapts to the columns actually present.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    cascade::{
        CascadeDeletionPlanner, DeleteResult, DeletionOutcome, DeletionPlan, DeletionStep,
        DependencyReport,
    },
    error::{GazetteerError, Result},
    node::{CityTree, Kind, LocationCounts, LocationNode, RegionTree},
    registry::LocationRegistry,
    schema_probe::{RowFields, SchemaProbe, OPTIONAL_COLUMNS},
    storage::Storage,
    store::LocationStore,
    validator::HierarchyValidator,
};
