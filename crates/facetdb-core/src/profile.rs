//! Profile membership index: which attributes belong to which attribute
//! profile, and assignment of new members.

use crate::{
    error::Error,
    model::ProfileMembership,
    store::SchemaStore,
    types::{AttributeId, EntityTypeId, ProfileId},
};
use std::{cell::RefCell, collections::BTreeSet};

///
/// AttributeProfileIndex
///
/// Cached membership rows for every profile of the loaded entity types.
/// `assign` writes through to the store and keeps the cache coherent.
///

#[derive(Default)]
pub struct AttributeProfileIndex {
    inner: RefCell<Inner>,
}

#[derive(Default)]
struct Inner {
    rows: Vec<ProfileMembership>,
    loaded: BTreeSet<EntityTypeId>,
}

impl AttributeProfileIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache the membership rows for one entity type; repeat loads are
    /// no-ops.
    pub fn load(&self, store: &dyn SchemaStore, entity_type: EntityTypeId) -> Result<(), Error> {
        if self.inner.borrow().loaded.contains(&entity_type) {
            return Ok(());
        }

        let scan = store.select_profile_memberships(entity_type)?;

        let mut inner = self.inner.borrow_mut();
        for row in scan {
            inner.rows.push(ProfileMembership {
                profile: row.profile,
                group: row.group,
                attribute: row.attribute,
                sort_order: row.sort_order,
            });
        }
        inner.loaded.insert(entity_type);
        Ok(())
    }

    /// Member attribute ids of a profile, ordered by sort order.
    #[must_use]
    pub fn members_of(&self, profile: ProfileId) -> Vec<AttributeId> {
        let inner = self.inner.borrow();
        let mut members: Vec<(u32, AttributeId)> = inner
            .rows
            .iter()
            .filter(|r| r.profile == profile)
            .map(|r| (r.sort_order, r.attribute))
            .collect();
        members.sort_unstable();
        members.into_iter().map(|(_, id)| id).collect()
    }

    /// Profiles an attribute belongs to.
    #[must_use]
    pub fn profiles_of(&self, attribute: AttributeId) -> Vec<ProfileId> {
        let inner = self.inner.borrow();
        let mut profiles: Vec<ProfileId> = inner
            .rows
            .iter()
            .filter(|r| r.attribute == attribute)
            .map(|r| r.profile)
            .collect();
        profiles.sort_unstable();
        profiles.dedup();
        profiles
    }

    /// Assign an attribute to a profile's default group.
    ///
    /// Idempotent: an existing membership is left untouched. Profiles
    /// without a default group are not modifiable through this path, so
    /// the assignment is skipped silently. A new member appends at
    /// `max(sort_order) + 1` within the hosting group.
    pub fn assign(
        &self,
        store: &dyn SchemaStore,
        profile: ProfileId,
        attribute: AttributeId,
    ) -> Result<(), Error> {
        if self
            .inner
            .borrow()
            .rows
            .iter()
            .any(|r| r.profile == profile && r.attribute == attribute)
        {
            return Ok(());
        }

        let Some(group) = store
            .select_groups(profile)?
            .into_iter()
            .find(|g| g.is_default)
        else {
            return Ok(());
        };

        let sort_order = self
            .inner
            .borrow()
            .rows
            .iter()
            .filter(|r| r.profile == profile && r.group == group.id)
            .map(|r| r.sort_order)
            .max()
            .unwrap_or(0)
            + 1;

        let row = ProfileMembership {
            profile,
            group: group.id,
            attribute,
            sort_order,
        };
        store.insert_membership(row)?;
        self.inner.borrow_mut().rows.push(row);

        Ok(())
    }

    /// Drop the cached membership rows.
    pub fn invalidate(&self) {
        *self.inner.borrow_mut() = Inner::default();
    }
}
