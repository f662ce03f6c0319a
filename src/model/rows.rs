//! Per-table row schemas.
//!
//! The store keeps loosely-typed JSON rows. Everything the rest of the crate
//! reads goes through these schemas first; a row that does not fit is skipped
//! by the caller instead of being passed along half-parsed.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::item::{EntityKind, OrderedItem};

/// Tables of the directory store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Categories,
    Subcategories,
    Locations,
    Businesses,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Categories,
        Table::Subcategories,
        Table::Locations,
        Table::Businesses,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Categories => "categories",
            Table::Subcategories => "subcategories",
            Table::Locations => "locations",
            Table::Businesses => "businesses",
        }
    }

    /// Columns in other tables that hold a foreign key into this table.
    pub fn referenced_by(self) -> &'static [(Table, &'static str)] {
        match self {
            Table::Categories => &[
                (Table::Subcategories, "category_id"),
                (Table::Businesses, "category_id"),
            ],
            Table::Subcategories => &[(Table::Businesses, "subcategory_id")],
            Table::Locations => &[(Table::Businesses, "location_id")],
            Table::Businesses => &[],
        }
    }

    /// Foreign-key columns of this table and the table they point into.
    pub fn references(self) -> &'static [(&'static str, Table)] {
        match self {
            Table::Subcategories => &[("category_id", Table::Categories)],
            Table::Businesses => &[
                ("category_id", Table::Categories),
                ("subcategory_id", Table::Subcategories),
                ("location_id", Table::Locations),
            ],
            Table::Categories | Table::Locations => &[],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ids arrive as strings or as bare integers depending on who wrote the row.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Render a JSON cell as the string form used for id comparisons.
pub fn cell_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub hidden: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubcategoryRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "id_string")]
    pub category_id: String,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub hidden: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub hidden: Option<bool>,
}

/// A business listing. Only the taxonomy references are read here.
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<Value>,
    #[serde(default)]
    pub subcategory_id: Option<Value>,
    #[serde(default)]
    pub location_id: Option<Value>,
}

impl From<CategoryRow> for OrderedItem {
    fn from(row: CategoryRow) -> Self {
        OrderedItem {
            id: row.id,
            name: row.name,
            sort_order: row.sort_order.unwrap_or(0),
            scope_key: None,
            hidden: row.hidden.unwrap_or(false),
        }
    }
}

impl From<SubcategoryRow> for OrderedItem {
    fn from(row: SubcategoryRow) -> Self {
        OrderedItem {
            id: row.id,
            name: row.name,
            sort_order: row.sort_order.unwrap_or(0),
            scope_key: Some(row.category_id),
            hidden: row.hidden.unwrap_or(false),
        }
    }
}

impl From<LocationRow> for OrderedItem {
    fn from(row: LocationRow) -> Self {
        OrderedItem {
            id: row.id,
            name: row.name,
            sort_order: row.sort_order.unwrap_or(0),
            scope_key: None,
            hidden: row.hidden.unwrap_or(false),
        }
    }
}

/// Parse one raw row of `kind`'s table into an [`OrderedItem`].
pub fn parse_item(kind: EntityKind, raw: &Value) -> Result<OrderedItem, serde_json::Error> {
    let item = match kind {
        EntityKind::Category => serde_json::from_value::<CategoryRow>(raw.clone())?.into(),
        EntityKind::Subcategory => serde_json::from_value::<SubcategoryRow>(raw.clone())?.into(),
        EntityKind::Location => serde_json::from_value::<LocationRow>(raw.clone())?.into(),
    };
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_sort_order_and_hidden_default() {
        let item = parse_item(
            EntityKind::Category,
            &json!({"id": "c1", "name": "Pousadas", "sort_order": null, "hidden": null}),
        )
        .unwrap();
        assert_eq!(item.sort_order, 0);
        assert!(!item.hidden);
    }

    #[test]
    fn numeric_ids_become_strings() {
        let item = parse_item(
            EntityKind::Subcategory,
            &json!({"id": 7, "name": "Pizzarias", "category_id": 3, "sort_order": 2}),
        )
        .unwrap();
        assert_eq!(item.id, "7");
        assert_eq!(item.scope_key.as_deref(), Some("3"));
        assert_eq!(item.sort_order, 2);
    }

    #[test]
    fn subcategory_without_category_is_rejected() {
        let result = parse_item(EntityKind::Subcategory, &json!({"id": "s1", "name": "Sem dono"}));
        assert!(result.is_err());
    }

    #[test]
    fn wrongly_typed_sort_order_is_rejected() {
        let result = parse_item(
            EntityKind::Location,
            &json!({"id": "l1", "name": "Centro", "sort_order": "first"}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn foreign_keys_are_symmetric() {
        for table in Table::ALL {
            for (from, column) in table.referenced_by() {
                assert!(
                    from.references().contains(&(*column, table)),
                    "{}.{} should reference {}",
                    from,
                    column,
                    table
                );
            }
        }
    }
}
