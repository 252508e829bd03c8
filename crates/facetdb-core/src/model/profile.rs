use crate::types::{AttributeId, EntityTypeId, GroupId, ProfileId};
use serde::{Deserialize, Serialize};

///
/// AttributeProfile
///
/// A named grouping of attributes applicable to a subset of entities
/// ("attribute set" in the surrounding application's vocabulary).
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AttributeProfile {
    pub id: ProfileId,
    pub name: String,
    pub entity_type: EntityTypeId,
}

///
/// AttributeGroup
///
/// Display grouping inside a profile. New memberships land in the group
/// flagged as default; profiles without one are not modifiable through
/// `assign`.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AttributeGroup {
    pub id: GroupId,
    pub profile: ProfileId,
    pub is_default: bool,
}

///
/// ProfileMembership
///
/// One attribute's membership in one profile/group.
///
/// Invariant: `sort_order` is unique within `(profile, group)` and is
/// assigned monotonically (`max + 1`) on append.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProfileMembership {
    pub profile: ProfileId,
    pub group: GroupId,
    pub attribute: AttributeId,
    pub sort_order: u32,
}
