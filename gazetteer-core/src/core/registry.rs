//! High-level registry operations over a Gazetteer SQLite database.

use crate::{
    CascadeDeletionPlanner, CityTree, DeleteResult, DeletionOutcome, DeletionPlan, DeletionStep,
    GazetteerError, HierarchyValidator, Kind, LocationCounts, LocationNode, LocationStore,
    RegionTree, Result, RowFields, SchemaProbe, Storage,
};
use rusqlite::{Connection, Transaction};
use std::path::Path;

/// An open location registry backed by a SQLite database.
///
/// `LocationRegistry` is the primary interface for all hierarchy mutations.
/// It composes the schema probe, the store primitives, the hierarchy
/// validator and the cascade planner inside transactional boundaries; callers
/// (a thin controller layer) hand it already well-typed inputs and map its
/// outcomes onto transport responses.
///
/// Every mutating operation takes the acting user as an explicit `actor`
/// parameter; there is no module-level "current user".
pub struct LocationRegistry {
    storage: Storage,
}

impl LocationRegistry {
    /// Creates a new registry database at `path` with the canonical schema.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::Database`] for any SQLite failure.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            storage: Storage::create(path)?,
        })
    }

    /// Opens an existing registry database at `path`.
    ///
    /// The database may be at an older migration level (optional columns
    /// absent); all reads and writes adapt through the schema probe.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::InvalidDatabase`] if the file lacks the
    /// hierarchy tables, [`GazetteerError::Database`] for any SQLite failure.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            storage: Storage::open(path)?,
        })
    }

    /// In-memory registry with the full canonical schema.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            storage: Storage::in_memory()?,
        })
    }

    /// Returns the underlying SQLite connection.
    pub fn connection(&self) -> &Connection {
        self.storage.connection()
    }

    /// Returns every active region with its active cities and barangays,
    /// fully materialized, each level ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::Database`] for any SQLite failure.
    pub fn list_all(&self) -> Result<Vec<RegionTree>> {
        let conn = self.connection();
        let mut tree = Vec::new();
        for region in LocationStore::list_active(conn, Kind::Region, None)? {
            let mut cities = Vec::new();
            for city in LocationStore::list_active(conn, Kind::City, Some(region.id))? {
                let barangays = LocationStore::list_active(conn, Kind::Barangay, Some(city.id))?;
                cities.push(CityTree { city, barangays });
            }
            tree.push(RegionTree { region, cities });
        }
        Ok(tree)
    }

    /// Adds a top-level region.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::DuplicateName`] if an active region already
    /// uses `name` (case-insensitive), [`GazetteerError::Database`] for any
    /// SQLite failure.
    pub fn add_region(
        &mut self,
        name: &str,
        description: Option<&str>,
        actor: &str,
    ) -> Result<LocationNode> {
        self.add_node(Kind::Region, None, name, description, actor)
    }

    /// Adds a city under an active region.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::ParentNotFound`] if `region_id` does not
    /// reference an active region, [`GazetteerError::DuplicateName`] if the
    /// region already has an active city named `name`.
    pub fn add_city(
        &mut self,
        region_id: i64,
        name: &str,
        description: Option<&str>,
        actor: &str,
    ) -> Result<LocationNode> {
        self.add_node(Kind::City, Some(region_id), name, description, actor)
    }

    /// Adds a barangay under an active city.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::ParentNotFound`] if `city_id` does not
    /// reference an active city, [`GazetteerError::DuplicateName`] if the
    /// city already has an active barangay named `name`.
    pub fn add_barangay(
        &mut self,
        city_id: i64,
        name: &str,
        description: Option<&str>,
        actor: &str,
    ) -> Result<LocationNode> {
        self.add_node(Kind::Barangay, Some(city_id), name, description, actor)
    }

    fn add_node(
        &mut self,
        kind: Kind,
        parent_id: Option<i64>,
        name: &str,
        description: Option<&str>,
        actor: &str,
    ) -> Result<LocationNode> {
        let now = chrono::Utc::now().timestamp();
        let tx = self.storage.connection_mut().transaction()?;

        // Validation runs inside the transaction but before any write, so a
        // rejection leaves storage untouched.
        if let Some(pid) = parent_id {
            HierarchyValidator::validate_parent(&tx, kind, pid)?;
        }
        HierarchyValidator::validate_unique_name(&tx, kind, name, parent_id, None)?;

        let cols = SchemaProbe::columns(&tx, kind);
        let mut fields = RowFields::new();
        fields.set("name", name.to_string());
        fields.set("active", true);
        if let (Some(column), Some(pid)) = (kind.parent_column(), parent_id) {
            fields.set(column, pid);
        }
        fields.set_if_present(&cols, "code", derived_code(kind, name));
        fields.set_if_present(&cols, "description", description.map(str::to_string));
        fields.set_if_present(&cols, "modified_by", actor.to_string());
        fields.set_if_present(&cols, "modified_at", now);

        let id = LocationStore::insert(&tx, kind, &fields)?;
        let node = LocationStore::find_active_by_id(&tx, kind, id)?
            .ok_or(GazetteerError::NotFound { kind, id })?;
        tx.commit()?;

        Ok(node)
    }

    /// Fetches a single active node.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::NotFound`] if the node is missing or inactive.
    pub fn get_node(&self, kind: Kind, id: i64) -> Result<LocationNode> {
        LocationStore::find_active_by_id(self.connection(), kind, id)?
            .ok_or(GazetteerError::NotFound { kind, id })
    }

    /// Renames a node and/or replaces its description.
    ///
    /// The duplicate check is scoped to the node's current parent and
    /// excludes the node itself, so re-saving an unchanged name is fine.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::NotFound`] if the node is missing or
    /// inactive, [`GazetteerError::DuplicateName`] if an active sibling
    /// already uses `name`.
    pub fn update_node(
        &mut self,
        kind: Kind,
        id: i64,
        name: &str,
        description: Option<&str>,
        actor: &str,
    ) -> Result<LocationNode> {
        let now = chrono::Utc::now().timestamp();
        let tx = self.storage.connection_mut().transaction()?;

        let existing = LocationStore::find_active_by_id(&tx, kind, id)?
            .ok_or(GazetteerError::NotFound { kind, id })?;
        HierarchyValidator::validate_unique_name(&tx, kind, name, existing.parent_id, Some(id))?;

        let cols = SchemaProbe::columns(&tx, kind);
        let mut fields = RowFields::new();
        fields.set("name", name.to_string());
        fields.set_if_present(&cols, "description", description.map(str::to_string));
        fields.set_if_present(&cols, "modified_by", actor.to_string());
        fields.set_if_present(&cols, "modified_at", now);

        LocationStore::update(&tx, kind, id, &fields)?;
        let node = LocationStore::find_active_by_id(&tx, kind, id)?
            .ok_or(GazetteerError::NotFound { kind, id })?;
        tx.commit()?;

        Ok(node)
    }

    /// Deletes a node, cascading over its descendants when `cascade` is set.
    ///
    /// A node with active children and `cascade == false` is not touched;
    /// the returned [`DeletionOutcome::Blocked`] carries the dependency
    /// report for the caller to confirm. Otherwise every planned step runs
    /// inside one transaction — a failure at any step rolls the whole
    /// sequence back, so a partially deleted subtree is never committed.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::NotFound`] if the target does not exist,
    /// [`GazetteerError::Database`] for any SQLite failure.
    pub fn delete_node(&mut self, kind: Kind, id: i64, cascade: bool) -> Result<DeletionOutcome> {
        let plan = CascadeDeletionPlanner::plan(self.connection(), kind, id, cascade)?;
        let steps = match plan {
            DeletionPlan::Blocked(report) => return Ok(DeletionOutcome::Blocked(report)),
            DeletionPlan::Execute { steps } | DeletionPlan::ExecuteCascade { steps } => steps,
        };

        let tx = self.storage.connection_mut().transaction()?;
        let result = Self::execute_steps(&tx, &steps)?;
        tx.commit()?;

        Ok(DeletionOutcome::Deleted(result))
    }

    /// Runs every planned delete inside `tx`, deepest level first.
    ///
    /// A step that removes zero rows aborts the sequence with `NotFound`;
    /// dropping the transaction on the error path rolls back everything
    /// already deleted.
    fn execute_steps(tx: &Transaction, steps: &[DeletionStep]) -> Result<DeleteResult> {
        for step in steps {
            let affected = LocationStore::delete_row(tx, step.kind, step.id)?;
            if affected == 0 {
                return Err(GazetteerError::NotFound {
                    kind: step.kind,
                    id: step.id,
                });
            }
        }
        Ok(DeleteResult {
            deleted_count: steps.len(),
            affected: steps.to_vec(),
        })
    }

    /// Soft visibility toggle. An inactive node drops out of listings,
    /// duplicate checks and statistics without losing its row.
    ///
    /// Reactivating a node whose name has since been taken by an active
    /// sibling violates the storage-level unique index; the resulting
    /// [`GazetteerError::Database`] is an expected, reportable outcome.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::NotFound`] if no row with `id` exists.
    pub fn set_active(&mut self, kind: Kind, id: i64, active: bool, actor: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let tx = self.storage.connection_mut().transaction()?;

        let cols = SchemaProbe::columns(&tx, kind);
        let mut fields = RowFields::new();
        fields.set("active", active);
        fields.set_if_present(&cols, "modified_by", actor.to_string());
        fields.set_if_present(&cols, "modified_at", now);

        let affected = LocationStore::update(&tx, kind, id, &fields)?;
        if affected == 0 {
            return Err(GazetteerError::NotFound { kind, id });
        }
        tx.commit()?;

        Ok(())
    }

    /// Counts of currently active rows per level plus their sum.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::Database`] for any SQLite failure.
    pub fn statistics(&self) -> Result<LocationCounts> {
        let conn = self.connection();
        let regions = LocationStore::count_active(conn, Kind::Region, None)?;
        let cities = LocationStore::count_active(conn, Kind::City, None)?;
        let barangays = LocationStore::count_active(conn, Kind::Barangay, None)?;
        Ok(LocationCounts {
            regions,
            cities,
            barangays,
            total: regions + cities + barangays,
        })
    }
}

/// Derived slug: kind prefix + uppercased alphanumeric-only name + a
/// millisecond suffix. Best effort only — the storage-level indexes are the
/// uniqueness authority, not this generator.
fn derived_code(kind: Kind, name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_uppercase();
    format!(
        "{}{}-{}",
        kind.code_prefix(),
        sanitized,
        chrono::Utc::now().timestamp_millis()
    )
}
