//! End-to-end resolution through the public engine API: a product entity
//! type with static, varchar, int, and decimal attributes, per-scope
//! overrides, and a growing option dictionary.

use facetdb::{Engine, MemoryStore, prelude::*};

const TYPE: EntityTypeId = EntityTypeId(4);
const PROFILE: ProfileId = ProfileId(9);
const ENTITY: EntityId = EntityId(500);

const SKU: AttributeId = AttributeId(1);
const NAME: AttributeId = AttributeId(10);
const COLOR: AttributeId = AttributeId(12);
const WEIGHT: AttributeId = AttributeId(14);

fn attribute(
    id: AttributeId,
    code: &str,
    kind: BackendKind,
    uses_options: bool,
) -> AttributeDefinition {
    AttributeDefinition {
        id,
        code: code.to_string(),
        entity_type: TYPE,
        backend_kind: kind,
        backend_table_override: None,
        uses_option_dictionary: uses_options,
        is_required: false,
        is_unique: false,
        is_scope_overridable: true,
        is_visible: true,
        option_source_is_custom: false,
        has_swatch: false,
        default_value: None,
    }
}

fn engine() -> Engine<MemoryStore> {
    use facetdb::core::{
        model::{AttributeGroup, AttributeProfile, EntityTypeInfo, ProfileMembership},
        types::GroupId,
    };

    let store = MemoryStore::new();
    store.add_entity_type(EntityTypeInfo {
        id: TYPE,
        code: "product".to_string(),
        entity_table: "cat_entity".to_string(),
    });
    store.add_table("cat_entity", &[("entity_id", "int"), ("sku", "varchar(64)")]);
    store.add_table(
        "cat_entity_varchar",
        &[("entity_id", "int"), ("value", "varchar(255)")],
    );
    store.add_table("cat_entity_int", &[("entity_id", "int"), ("value", "int")]);
    store.add_table(
        "cat_entity_decimal",
        &[("entity_id", "int"), ("value", "decimal(12,4)")],
    );

    store.add_profile(AttributeProfile {
        id: PROFILE,
        name: "Default".to_string(),
        entity_type: TYPE,
    });
    store.add_group(AttributeGroup {
        id: GroupId(1),
        profile: PROFILE,
        is_default: true,
    });

    let attrs = [
        attribute(SKU, "sku", BackendKind::Static, false),
        attribute(NAME, "name", BackendKind::Varchar, false),
        attribute(COLOR, "color", BackendKind::Int, true),
        attribute(WEIGHT, "weight", BackendKind::Decimal, false),
    ];
    for (order, attr) in attrs.into_iter().enumerate() {
        store.add_membership(ProfileMembership {
            profile: PROFILE,
            group: GroupId(1),
            attribute: attr.id,
            sort_order: (order + 1) as u32,
        });
        store.add_attribute(attr);
    }

    store.add_entity_row("cat_entity", ENTITY, &[("sku", "SHIRT-1")]);
    Engine::new(store)
}

#[test]
fn full_resolution_with_scope_fallback() {
    let engine = engine();
    let store = engine.store();

    // options grow at runtime; the stored value is the raw option id
    let red = engine.create_option(TYPE, COLOR, &["Red", "Blue"]).unwrap()[0];

    store.set_value("cat_entity_varchar", ENTITY, NAME, ScopeId::DEFAULT, "Shirt");
    store.set_value("cat_entity_varchar", ENTITY, NAME, ScopeId(2), "Chemise");
    store.set_value("cat_entity_int", ENTITY, COLOR, ScopeId::DEFAULT, &red.to_string());
    store.set_value("cat_entity_decimal", ENTITY, WEIGHT, ScopeId::DEFAULT, "0.2500");

    // narrow scope: the name override wins, everything else falls back
    let resolved = engine
        .resolve_attributes(TYPE, ENTITY, ScopeId(2), PROFILE)
        .unwrap();
    assert_eq!(resolved.get("sku"), Some(&Scalar::Text("SHIRT-1".to_string())));
    assert_eq!(resolved.get("name"), Some(&Scalar::Text("Chemise".to_string())));
    assert_eq!(resolved.get("color"), Some(&Scalar::Int(i64::from(red.get()))));
    assert_eq!(resolved.get("weight"), Some(&Scalar::Float(0.25)));

    // default scope sees the base name
    let resolved = engine
        .resolve_attributes(TYPE, ENTITY, ScopeId::DEFAULT, PROFILE)
        .unwrap();
    assert_eq!(resolved.get("name"), Some(&Scalar::Text("Shirt".to_string())));

    // label translation is opt-in and falls back across scopes
    let label = engine.option_label(COLOR, red, ScopeId(2)).unwrap();
    assert_eq!(label.as_deref(), Some("Red"));
}

#[test]
fn resolution_query_budget_is_per_table() {
    let engine = engine();
    let store = engine.store();

    store.set_value("cat_entity_varchar", ENTITY, NAME, ScopeId::DEFAULT, "Shirt");
    store.set_value("cat_entity_int", ENTITY, COLOR, ScopeId::DEFAULT, "7");

    // warm the schema caches, then measure the steady-state budget
    engine
        .resolve_attributes(TYPE, ENTITY, ScopeId(2), PROFILE)
        .unwrap();
    store.reset_counters();

    engine
        .resolve_attributes(TYPE, ENTITY, ScopeId(2), PROFILE)
        .unwrap();

    assert_eq!(store.select_count("cat_entity"), 1);
    assert_eq!(store.select_count("cat_entity_varchar"), 1);
    assert_eq!(store.select_count("cat_entity_int"), 1);
    assert_eq!(store.select_count("cat_entity_decimal"), 1);
    assert_eq!(store.select_count("profile_membership"), 0);
    assert_eq!(store.select_count("attribute"), 0);
    assert_eq!(store.select_count("describe"), 0);
    assert_eq!(store.select_count("information_schema"), 0);
}

#[test]
fn duplicate_options_do_not_grow_the_dictionary() {
    let engine = engine();

    let first = engine
        .create_option(TYPE, COLOR, &["Red", "red ", "Blue"])
        .unwrap();
    assert_eq!(first.len(), 2);

    let second = engine.create_option(TYPE, COLOR, &["RED"]).unwrap();
    assert!(second.is_empty());

    let options = engine.options_of(COLOR).unwrap();
    assert_eq!(options.len(), 2);

    let orders: Vec<u32> = options.iter().map(|o| o.sort_order).collect();
    assert_eq!(orders, vec![1, 2]);
}
