//! Customer Creation Form
//!
//! Editable state behind the "new customer" form of the list view.

use serde::Serialize;

pub const DEFAULT_CUSTOMER_GROUP: &str = "Commercial";
pub const DEFAULT_TERRITORY: &str = "All Territories";

/// Customer type offered by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CustomerType {
    #[default]
    Company,
    Individual,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Individual => "Individual",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Company => Self::Individual,
            Self::Individual => Self::Company,
        }
    }
}

/// Field that currently has input focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    CustomerName,
    CustomerType,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            Self::CustomerName => Self::CustomerType,
            Self::CustomerType => Self::CustomerName,
        }
    }
}

/// Body sent to `create_doc("Customer", ...)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCustomer {
    pub customer_name: String,
    pub customer_type: CustomerType,
    pub customer_group: String,
    pub territory: String,
}

/// Form state for creating a customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerForm {
    pub customer_name: String,
    pub customer_type: CustomerType,
    pub customer_group: String,
    pub territory: String,
    pub focus: FormField,
}

impl Default for CustomerForm {
    fn default() -> Self {
        Self {
            customer_name: String::new(),
            customer_type: CustomerType::Company,
            customer_group: DEFAULT_CUSTOMER_GROUP.to_string(),
            territory: DEFAULT_TERRITORY.to_string(),
            focus: FormField::CustomerName,
        }
    }
}

impl CustomerForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    /// Type a character into the focused text field
    pub fn push_char(&mut self, c: char) {
        if self.focus == FormField::CustomerName {
            self.customer_name.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if self.focus == FormField::CustomerName {
            self.customer_name.pop();
        }
    }

    pub fn toggle_type(&mut self) {
        self.customer_type = self.customer_type.toggle();
    }

    /// Customer name is required
    pub fn validate(&self) -> Result<(), String> {
        if self.customer_name.trim().is_empty() {
            return Err("Customer name is required".to_string());
        }
        Ok(())
    }

    pub fn to_document(&self) -> NewCustomer {
        NewCustomer {
            customer_name: self.customer_name.trim().to_string(),
            customer_type: self.customer_type,
            customer_group: self.customer_group.clone(),
            territory: self.territory.clone(),
        }
    }
}
