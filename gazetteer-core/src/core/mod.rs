//! Internal domain modules for the Gazetteer core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod cascade;
pub mod error;
pub mod node;
pub mod registry;
pub mod schema_probe;
pub mod storage;
pub mod store;
pub mod validator;

#[doc(inline)]
pub use cascade::{
    CascadeDeletionPlanner, DeleteResult, DeletionOutcome, DeletionPlan, DeletionStep,
    DependencyReport,
};
#[doc(inline)]
pub use error::{GazetteerError, Result};
#[doc(inline)]
pub use node::{CityTree, Kind, LocationCounts, LocationNode, RegionTree};
#[doc(inline)]
pub use registry::LocationRegistry;
#[doc(inline)]
pub use schema_probe::{RowFields, SchemaProbe, OPTIONAL_COLUMNS};
#[doc(inline)]
pub use storage::Storage;
#[doc(inline)]
pub use store::LocationStore;
#[doc(inline)]
pub use validator::HierarchyValidator;
