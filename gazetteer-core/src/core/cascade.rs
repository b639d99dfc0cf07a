//! Deletion planning and outcome types for hierarchy node removal.
//!
//! Deleting a node that still has live descendants is the one destructive
//! operation in the registry, so the decision is split from the execution:
//! [`CascadeDeletionPlanner::plan`] computes *what would happen* without
//! touching any row, and the registry executes the resulting
//! [`DeletionPlan`] inside its own transaction.
//!
//! ## Plans
//!
//! - [`DeletionPlan::Execute`] — the target has no active children; the plan
//!   is a single step removing the target.
//! - [`DeletionPlan::Blocked`] — active children exist and cascade was not
//!   requested. Carries a [`DependencyReport`] the caller can show to a human
//!   before retrying with cascade; nothing may be deleted.
//! - [`DeletionPlan::ExecuteCascade`] — children exist and cascade was
//!   requested. The steps run deepest level first (barangays, then cities,
//!   then the target) so no row is removed before its dependents.
//!
//! ## Serialization
//!
//! All types here cross the controller boundary and serialize in camelCase,
//! consistent with the other return types in this project:
//!
//! ```rust
//! use gazetteer_core::{DeletionStep, Kind};
//!
//! let step = DeletionStep { kind: Kind::Barangay, id: 7 };
//! let json = serde_json::to_string(&step).unwrap();
//! assert_eq!(json, r#"{"kind":"Barangay","id":7}"#);
//! ```
//!
//! ```rust
//! use gazetteer_core::{DependencyReport, Kind};
//!
//! let report = DependencyReport {
//!     kind: Kind::Region,
//!     name: "NCR".to_string(),
//!     can_cascade: true,
//!     city_count: Some(2),
//!     barangay_count: 5,
//! };
//! let json = serde_json::to_string(&report).unwrap();
//! assert!(json.contains("canCascade"));
//! assert!(json.contains("barangayCount"));
//! ```

use crate::{GazetteerError, Kind, LocationStore, Result};
use log::debug;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// One row to remove: which table, which id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionStep {
    pub kind: Kind,
    pub id: i64,
}

/// What a blocked deletion would have taken with it.
///
/// For a region the report carries both the direct city count and the total
/// barangay count transitively under those cities; for a city only the
/// barangay count. `can_cascade` is always true — it is kept explicit so the
/// controller can hand the report to the caller as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    pub kind: Kind,
    pub name: String,
    pub can_cascade: bool,
    pub city_count: Option<i64>,
    pub barangay_count: i64,
}

/// The planner's decision for one delete request.
///
/// Plans are advisory: only the registry mutates, and it re-checks nothing —
/// there is no optimistic-lock requirement in this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeletionPlan {
    /// No active children; delete the target alone.
    Execute { steps: Vec<DeletionStep> },
    /// Active children exist and cascade was not requested; no mutation.
    Blocked(DependencyReport),
    /// Delete the target with every descendant, deepest level first.
    ExecuteCascade { steps: Vec<DeletionStep> },
}

/// What a committed deletion actually removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    /// The total number of rows that were permanently removed.
    pub deleted_count: usize,
    /// Every removed row, in deletion order.
    pub affected: Vec<DeletionStep>,
}

/// The outcome of a delete request as seen by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeletionOutcome {
    Deleted(DeleteResult),
    Blocked(DependencyReport),
}

/// Computes deletion plans; never mutates.
pub struct CascadeDeletionPlanner;

impl CascadeDeletionPlanner {
    /// Resolves the target, counts its active subtree, and decides whether
    /// the delete may run, must cascade, or is blocked pending confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::NotFound`] when the target does not exist,
    /// [`GazetteerError::Database`] on SQLite failure.
    pub fn plan(
        conn: &Connection,
        kind: Kind,
        id: i64,
        cascade_requested: bool,
    ) -> Result<DeletionPlan> {
        let target = LocationStore::find_active_by_id(conn, kind, id)?
            .ok_or(GazetteerError::NotFound { kind, id })?;

        let child_ids = match kind.child() {
            Some(child_kind) => LocationStore::ids_active(conn, child_kind, Some(id))?,
            None => Vec::new(),
        };

        if child_ids.is_empty() {
            debug!("delete plan for {kind} {id}: childless, execute");
            return Ok(DeletionPlan::Execute {
                steps: vec![DeletionStep { kind, id }],
            });
        }

        if !cascade_requested {
            let (city_count, barangay_count) = match kind {
                Kind::Region => {
                    // Total barangays under the region is the sum of each
                    // dependent city's own barangay count.
                    let mut barangays = 0;
                    for city_id in &child_ids {
                        barangays +=
                            LocationStore::count_active(conn, Kind::Barangay, Some(*city_id))?;
                    }
                    (Some(child_ids.len() as i64), barangays)
                }
                _ => (None, child_ids.len() as i64),
            };
            debug!(
                "delete plan for {kind} {id}: blocked ({} direct children)",
                child_ids.len()
            );
            return Ok(DeletionPlan::Blocked(DependencyReport {
                kind,
                name: target.name,
                can_cascade: true,
                city_count,
                barangay_count,
            }));
        }

        // Cascade: deepest level first, target last, so no parent row ever
        // goes before its dependents.
        let mut steps = Vec::new();
        if kind == Kind::Region {
            for city_id in &child_ids {
                for barangay_id in
                    LocationStore::ids_active(conn, Kind::Barangay, Some(*city_id))?
                {
                    steps.push(DeletionStep {
                        kind: Kind::Barangay,
                        id: barangay_id,
                    });
                }
            }
            for city_id in &child_ids {
                steps.push(DeletionStep {
                    kind: Kind::City,
                    id: *city_id,
                });
            }
        } else {
            for barangay_id in &child_ids {
                steps.push(DeletionStep {
                    kind: Kind::Barangay,
                    id: *barangay_id,
                });
            }
        }
        steps.push(DeletionStep { kind, id });

        debug!("delete plan for {kind} {id}: cascade over {} rows", steps.len());
        Ok(DeletionPlan::ExecuteCascade { steps })
    }
}
