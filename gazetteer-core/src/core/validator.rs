//! Containment and naming invariants, checked before any mutation.

use crate::{GazetteerError, Kind, LocationNode, LocationStore, Result};
use rusqlite::Connection;

/// Pure read-then-decide checks over [`LocationStore`]; no side effects.
pub struct HierarchyValidator;

impl HierarchyValidator {
    /// Confirms that `kind`'s parent exists and is active, returning it.
    ///
    /// A city requires an active region, a barangay an active city. Regions
    /// have no parent; calling this for one is rejected the same way.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::ParentNotFound`] when the parent row is
    /// missing or inactive, [`GazetteerError::Database`] on SQLite failure.
    pub fn validate_parent(conn: &Connection, kind: Kind, parent_id: i64) -> Result<LocationNode> {
        let parent_kind = match kind.parent() {
            Some(k) => k,
            None => return Err(GazetteerError::ParentNotFound { kind, parent_id }),
        };

        LocationStore::find_active_by_id(conn, parent_kind, parent_id)?.ok_or(
            GazetteerError::ParentNotFound {
                kind: parent_kind,
                parent_id,
            },
        )
    }

    /// Rejects a name already used by an active sibling (case-insensitive).
    ///
    /// `parent_id` scopes the check for cities/barangays; `exclude_id` is set
    /// on rename so the node does not collide with itself.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::DuplicateName`] on collision,
    /// [`GazetteerError::Database`] on SQLite failure.
    pub fn validate_unique_name(
        conn: &Connection,
        kind: Kind,
        name: &str,
        parent_id: Option<i64>,
        exclude_id: Option<i64>,
    ) -> Result<()> {
        if LocationStore::find_active_by_name(conn, kind, name, parent_id, exclude_id)?.is_some() {
            return Err(GazetteerError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RowFields, Storage};

    fn seed_region(conn: &Connection, name: &str, active: bool) -> i64 {
        let mut fields = RowFields::new();
        fields.set("name", name.to_string());
        fields.set("active", active);
        LocationStore::insert(conn, Kind::Region, &fields).unwrap()
    }

    #[test]
    fn test_validate_parent_accepts_active_region() {
        let storage = Storage::in_memory().unwrap();
        let region_id = seed_region(storage.connection(), "NCR", true);

        let parent =
            HierarchyValidator::validate_parent(storage.connection(), Kind::City, region_id)
                .unwrap();
        assert_eq!(parent.id, region_id);
    }

    #[test]
    fn test_validate_parent_rejects_missing_region() {
        let storage = Storage::in_memory().unwrap();
        let result = HierarchyValidator::validate_parent(storage.connection(), Kind::City, 42);
        assert!(matches!(
            result,
            Err(GazetteerError::ParentNotFound { parent_id: 42, .. })
        ));
    }

    #[test]
    fn test_validate_parent_rejects_inactive_region() {
        let storage = Storage::in_memory().unwrap();
        let region_id = seed_region(storage.connection(), "NCR", false);

        let result =
            HierarchyValidator::validate_parent(storage.connection(), Kind::City, region_id);
        assert!(matches!(result, Err(GazetteerError::ParentNotFound { .. })));
    }

    #[test]
    fn test_unique_name_rejects_case_variant() {
        let storage = Storage::in_memory().unwrap();
        seed_region(storage.connection(), "NCR", true);

        let result = HierarchyValidator::validate_unique_name(
            storage.connection(),
            Kind::Region,
            "ncr",
            None,
            None,
        );
        assert!(matches!(result, Err(GazetteerError::DuplicateName { .. })));
    }

    #[test]
    fn test_unique_name_ignores_inactive_rows() {
        let storage = Storage::in_memory().unwrap();
        seed_region(storage.connection(), "NCR", false);

        HierarchyValidator::validate_unique_name(
            storage.connection(),
            Kind::Region,
            "NCR",
            None,
            None,
        )
        .unwrap();
    }

    #[test]
    fn test_unique_name_excludes_self_on_rename() {
        let storage = Storage::in_memory().unwrap();
        let id = seed_region(storage.connection(), "NCR", true);

        HierarchyValidator::validate_unique_name(
            storage.connection(),
            Kind::Region,
            "NCR",
            None,
            Some(id),
        )
        .unwrap();
    }
}
