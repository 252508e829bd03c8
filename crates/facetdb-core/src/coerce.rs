//! Query type coercion: casting the driver's textual rows into the strict
//! scalar types declared by table column metadata.
//!
//! The underlying query layer returns every value as text; without this
//! step each consumer would re-implement ad hoc casting and numeric
//! comparisons would drift apart.

use crate::{
    error::{Error, ErrorClass, ErrorOrigin},
    obs::{self, MetricsEvent},
    store::{RawRow, SchemaStore},
    value::Scalar,
};
use rust_decimal::prelude::ToPrimitive;
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
};

///
/// ColumnFamily
///
/// Coarse routing classification of a declared column type. Used only to
/// pick the cast; it says nothing about arithmetic or ordering support.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColumnFamily {
    Bool,
    Int,
    Float,
    Datetime,
    Text,
}

impl ColumnFamily {
    /// Classify a raw declared type string (`"tinyint(1)"`,
    /// `"decimal(12,4)"`, …). Unknown types route to `Text`, the least
    /// lossy fallback.
    #[must_use]
    pub fn classify(column_type: &str) -> Self {
        let base = column_type
            .split('(')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        match base.as_str() {
            "bool" | "boolean" => Self::Bool,
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "numeric" => {
                Self::Int
            }
            "decimal" | "double" | "float" | "real" => Self::Float,
            "date" | "datetime" | "timestamp" => Self::Datetime,
            _ => Self::Text,
        }
    }

    /// Cast a raw textual value into this family's scalar type.
    #[must_use]
    pub fn cast_raw(self, raw: &str) -> Scalar {
        match self {
            Self::Bool => Scalar::parse_bool(raw),
            Self::Int => Scalar::parse_int(raw),
            Self::Float => Scalar::parse_float(raw),
            Self::Datetime => Scalar::parse_datetime(raw),
            Self::Text => Scalar::Text(raw.to_string()),
        }
    }

    /// Cast an already-typed scalar into this family, leaving values that
    /// are already of the right type untouched. Idempotent per family.
    #[must_use]
    pub fn cast(self, value: &Scalar) -> Scalar {
        match (self, value) {
            (Self::Bool, Scalar::Bool(_))
            | (Self::Int, Scalar::Int(_))
            | (Self::Float, Scalar::Float(_))
            | (Self::Datetime, Scalar::DateTime(_))
            | (Self::Text, Scalar::Text(_)) => value.clone(),

            // cheap exact conversions before falling back to re-parsing
            (Self::Float, Scalar::Decimal(d)) => Scalar::Float(d.to_f64().unwrap_or(0.0)),
            (Self::Float, Scalar::Int(i)) => Scalar::Float(*i as f64),

            _ => self.cast_raw(&value.to_string()),
        }
    }
}

///
/// TypeCoercer
///
/// Caches each table's column families after the first `describe` and
/// applies the cast per column. Columns absent from the metadata default
/// to `Text` and are counted as coercion fallbacks.
///

#[derive(Default)]
pub struct TypeCoercer {
    meta: RefCell<HashMap<String, HashMap<String, ColumnFamily>>>,
}

impl TypeCoercer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cast every column of a raw row per the table's declared types.
    pub fn coerce(
        &self,
        store: &dyn SchemaStore,
        table: &str,
        row: &RawRow,
    ) -> Result<BTreeMap<String, Scalar>, Error> {
        self.ensure_meta(store, table)?;

        let meta = self.meta.borrow();
        let families = meta.get(table).ok_or_else(|| {
            Error::classified(
                ErrorClass::Internal,
                ErrorOrigin::Coerce,
                format!("no cached column metadata for table '{table}'"),
            )
        })?;

        let mut typed = BTreeMap::new();
        for (column, raw) in row {
            let family = families.get(column).copied().unwrap_or_else(|| {
                obs::record(MetricsEvent::CoercionFallback);
                ColumnFamily::Text
            });
            typed.insert(column.clone(), family.cast_raw(raw));
        }

        Ok(typed)
    }

    /// Family of one column, from the cached table metadata.
    pub fn family_of(
        &self,
        store: &dyn SchemaStore,
        table: &str,
        column: &str,
    ) -> Result<ColumnFamily, Error> {
        self.ensure_meta(store, table)?;

        let family = self
            .meta
            .borrow()
            .get(table)
            .and_then(|families| families.get(column).copied());

        Ok(family.unwrap_or_else(|| {
            obs::record(MetricsEvent::CoercionFallback);
            ColumnFamily::Text
        }))
    }

    fn ensure_meta(&self, store: &dyn SchemaStore, table: &str) -> Result<(), Error> {
        if self.meta.borrow().contains_key(table) {
            return Ok(());
        }

        let families = store
            .describe(table)?
            .into_iter()
            .map(|col| (col.name, ColumnFamily::classify(&col.column_type)))
            .collect();
        self.meta.borrow_mut().insert(table.to_string(), families);
        Ok(())
    }

    /// Drop the cached table metadata.
    pub fn invalidate(&self) {
        self.meta.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn classify_covers_driver_type_strings() {
        assert_eq!(ColumnFamily::classify("tinyint(1)"), ColumnFamily::Int);
        assert_eq!(ColumnFamily::classify("BIGINT"), ColumnFamily::Int);
        assert_eq!(ColumnFamily::classify("decimal(12,4)"), ColumnFamily::Float);
        assert_eq!(ColumnFamily::classify("varchar(255)"), ColumnFamily::Text);
        assert_eq!(ColumnFamily::classify("datetime"), ColumnFamily::Datetime);
        assert_eq!(ColumnFamily::classify("boolean"), ColumnFamily::Bool);
        assert_eq!(ColumnFamily::classify("geometry"), ColumnFamily::Text);
    }

    #[test]
    fn coerce_uses_declared_types_and_caches_describe() {
        let store = MemoryStore::new();
        store.add_table(
            "cat_entity",
            &[
                ("entity_id", "int"),
                ("enabled", "bool"),
                ("weight", "decimal(12,4)"),
                ("sku", "varchar(64)"),
            ],
        );

        let coercer = TypeCoercer::new();
        let mut row = RawRow::new();
        row.insert("entity_id".to_string(), "500".to_string());
        row.insert("enabled".to_string(), "1".to_string());
        row.insert("weight".to_string(), "2.5000".to_string());
        row.insert("sku".to_string(), "ABC-1".to_string());

        let typed = coercer.coerce(&store, "cat_entity", &row).unwrap();
        assert_eq!(typed["entity_id"], Scalar::Int(500));
        assert_eq!(typed["enabled"], Scalar::Bool(true));
        assert_eq!(typed["weight"], Scalar::Float(2.5));
        assert_eq!(typed["sku"], Scalar::Text("ABC-1".to_string()));

        store.reset_counters();
        coercer.coerce(&store, "cat_entity", &row).unwrap();
        assert_eq!(store.select_count("describe"), 0);
    }

    #[test]
    fn unknown_column_falls_back_to_text() {
        let store = MemoryStore::new();
        store.add_table("t", &[("known", "int")]);

        let coercer = TypeCoercer::new();
        let mut row = RawRow::new();
        row.insert("mystery".to_string(), "0".to_string());

        let typed = coercer.coerce(&store, "t", &row).unwrap();
        assert_eq!(typed["mystery"], Scalar::Text("0".to_string()));
    }

    proptest! {
        #[test]
        fn cast_is_idempotent_per_family(raw in ".{0,24}") {
            for family in [
                ColumnFamily::Bool,
                ColumnFamily::Int,
                ColumnFamily::Float,
                ColumnFamily::Datetime,
                ColumnFamily::Text,
            ] {
                let once = family.cast_raw(&raw);
                let twice = family.cast(&once);
                prop_assert_eq!(&once, &twice);
            }
        }
    }
}
