//! The securities list screen: row type, filter schema and seed data.

use filtertable_lib::model::{FieldDescriptor, Value};
use filtertable_lib::provider::FieldSource;
use filtertable_lib::table::{RowId, TableRow};
use serde::{Deserialize, Serialize};

/// Columns shown by the securities table, in order.
pub const COLUMNS: [&str; 3] = ["name", "type", "currency"];

/// A tradable or held security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub currency: String,
    pub is_private: bool,
}

impl Security {
    fn new(id: i64, name: &str, kind: &str, currency: &str, is_private: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind: kind.to_string(),
            currency: currency.to_string(),
            is_private,
        }
    }

    /// Cell text for one of [`COLUMNS`].
    pub fn cell(&self, column: &str) -> &str {
        match column {
            "name" => &self.name,
            "type" => &self.kind,
            "currency" => &self.currency,
            _ => "",
        }
    }
}

impl TableRow for Security {
    fn row_id(&self) -> Option<RowId> {
        Some(RowId::Int(self.id))
    }
}

impl FieldSource for Security {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name.as_str())),
            "type" => Some(Value::from(self.kind.as_str())),
            "currency" => Some(Value::from(self.currency.as_str())),
            "isPrivate" => Some(Value::Bool(self.is_private)),
            _ => None,
        }
    }
}

/// Filter fields of the securities screen.
///
/// "Private" starts unset so that both public and private securities are
/// listed until the user picks a side.
pub fn filter_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("name", "Name").with_placeholder("Search by name"),
        FieldDescriptor::multi_select(
            "type",
            "Type",
            [
                "Equity",
                "BankAccount",
                "Closed-endFund",
                "DirectHolding",
                "Generic",
                "Collectibl",
                "RealEstate",
            ],
        ),
        FieldDescriptor::multi_select("currency", "Currency", ["USD", "EUR", "GBP"]),
        FieldDescriptor::boolean("isPrivate", "Private").with_default(Value::Null),
    ]
}

/// Seed rows for the in-memory provider.
pub fn seed() -> Vec<Security> {
    vec![
        Security::new(1, "Acme Corp", "Equity", "USD", false),
        Security::new(2, "Acorn Real Estate Fund", "RealEstate", "EUR", true),
        Security::new(3, "Atlas Checking", "BankAccount", "USD", true),
        Security::new(4, "Baltic Closed Fund", "Closed-endFund", "EUR", false),
        Security::new(5, "Brightwater Holdings", "DirectHolding", "GBP", true),
        Security::new(6, "Cobalt Industries", "Equity", "GBP", false),
        Security::new(7, "Delta Vintage Cars", "Collectibl", "USD", true),
        Security::new(8, "Evergreen Generic Note", "Generic", "EUR", false),
        Security::new(9, "Falcon Aerospace", "Equity", "USD", false),
        Security::new(10, "Granite Tower Lofts", "RealEstate", "USD", true),
        Security::new(11, "Harbor Savings", "BankAccount", "GBP", true),
        Security::new(12, "Ivory Art Collection", "Collectibl", "EUR", true),
        Security::new(13, "Jade Pacific Equity", "Equity", "EUR", false),
    ]
}
