//! Entity Definitions
//!
//! Semantic entities shown by the list view, each mapped to a doctype,
//! the fields requested for it, and its display columns.

use crate::erp::ListQuery;
use serde_json::Value;

/// Column shown in the list view
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub header: &'static str,
    pub field: &'static str,
    /// Width as a percentage of the table
    pub width: u16,
}

const fn col(header: &'static str, field: &'static str, width: u16) -> ColumnDef {
    ColumnDef {
        header,
        field,
        width,
    }
}

const CUSTOMER_COLUMNS: &[ColumnDef] = &[
    col("ID", "name", 25),
    col("NAME", "customer_name", 35),
    col("TERRITORY", "territory", 20),
    col("GROUP", "customer_group", 20),
];

const SALES_ORDER_COLUMNS: &[ColumnDef] = &[
    col("ID", "name", 22),
    col("CUSTOMER", "customer", 30),
    col("TOTAL", "grand_total", 16),
    col("STATUS", "status", 16),
    col("DATE", "transaction_date", 16),
];

const ITEM_COLUMNS: &[ColumnDef] = &[
    col("ID", "name", 20),
    col("NAME", "item_name", 30),
    col("GROUP", "item_group", 20),
    col("UOM", "stock_uom", 10),
    col("DESCRIPTION", "description", 20),
];

const PURCHASE_ORDER_COLUMNS: &[ColumnDef] = &[
    col("ID", "name", 22),
    col("SUPPLIER", "supplier", 30),
    col("TOTAL", "grand_total", 16),
    col("STATUS", "status", 16),
    col("DATE", "transaction_date", 16),
];

/// Known ERP entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Customers,
    SalesOrders,
    Items,
    PurchaseOrders,
}

impl Entity {
    pub const ALL: [Entity; 4] = [
        Entity::Customers,
        Entity::SalesOrders,
        Entity::Items,
        Entity::PurchaseOrders,
    ];

    pub fn doctype(&self) -> &'static str {
        match self {
            Self::Customers => "Customer",
            Self::SalesOrders => "Sales Order",
            Self::Items => "Item",
            Self::PurchaseOrders => "Purchase Order",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Customers => "Customers",
            Self::SalesOrders => "Sales Orders",
            Self::Items => "Items",
            Self::PurchaseOrders => "Purchase Orders",
        }
    }

    /// Stable identifier used in the config file and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::SalesOrders => "sales-orders",
            Self::Items => "items",
            Self::PurchaseOrders => "purchase-orders",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.key() == key)
    }

    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Customers => &["name", "customer_name", "territory", "customer_group"],
            Self::SalesOrders => &["name", "customer", "grand_total", "status", "transaction_date"],
            Self::Items => &["name", "item_name", "item_group", "stock_uom", "description"],
            Self::PurchaseOrders => &["name", "supplier", "grand_total", "status", "transaction_date"],
        }
    }

    /// Whether list requests for this entity accept caller filters
    pub fn accepts_filters(&self) -> bool {
        matches!(self, Self::SalesOrders | Self::PurchaseOrders)
    }

    pub fn columns(&self) -> &'static [ColumnDef] {
        match self {
            Self::Customers => CUSTOMER_COLUMNS,
            Self::SalesOrders => SALES_ORDER_COLUMNS,
            Self::Items => ITEM_COLUMNS,
            Self::PurchaseOrders => PURCHASE_ORDER_COLUMNS,
        }
    }

    /// List query for this entity; filters are dropped for entities that take none
    pub fn query(&self, filters: Option<Value>) -> ListQuery {
        let mut query = ListQuery::new(self.doctype()).fields(self.fields().iter().copied());
        if self.accepts_filters() {
            query.filters = filters;
        }
        query
    }

    /// Next entity in display order (wraps)
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|e| e == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Render a JSON field for a table cell
pub fn display_field(item: &Value, field: &str) -> String {
    match item.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(arr)) => format!("[{} items]", arr.len()),
        Some(Value::Object(_)) => "[object]".to_string(),
        Some(Value::Null) | None => "-".to_string(),
    }
}
