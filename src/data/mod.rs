//! # Data Source
//!
//! Read-only, in-memory tables of named columns that visualizations bind their
//! axes and encodings to. The interaction core only ever asks three things of a
//! data source: which attributes exist, how many categories a discrete attribute
//! has, and what original value sits at a normalised position.

pub mod in_memory;

pub use in_memory::InMemoryDataSource;

use crate::error::{InteractionError, Result};
use std::fmt;

/// Attribute name meaning "no dimension bound"
pub const UNDEFINED_ATTRIBUTE: &str = "Undefined";

/// Whether an attribute name is the "no dimension bound" sentinel
pub fn is_undefined(attribute: &str) -> bool {
    attribute == UNDEFINED_ATTRIBUTE || attribute.is_empty()
}

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Number,
    String,
    Date,
}

impl DataType {
    /// Strings and dates are rendered per category rather than on a continuous scale
    pub fn is_discrete(self) -> bool {
        matches!(self, DataType::String | DataType::Date)
    }
}

/// Metadata describing one column
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub identifier: String,
    pub data_type: DataType,
    /// Distinct values of a discrete column, in normalised order
    pub categories: Option<Vec<String>>,
}

/// A value in the column's original domain
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Number(f32),
    Text(String),
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Number(v) => write!(f, "{}", v),
            DataValue::Text(s) => f.write_str(s),
        }
    }
}

/// Read-only table of named columns shared by every visualization
pub trait DataSource: Send + Sync {
    /// Number of attributes (columns)
    fn dimension_count(&self) -> usize;

    /// Attribute metadata by position
    fn attribute(&self, index: usize) -> Option<&Attribute>;

    /// Attribute metadata by identifier
    fn attribute_by_name(&self, name: &str) -> Option<&Attribute>;

    /// De-normalise a `[0, 1]` value back into the attribute's original domain
    fn original_value(&self, normalised: f32, attribute: &str) -> Result<DataValue>;

    /// Ordered attribute identifiers
    fn dimension_names(&self) -> Vec<String> {
        (0..self.dimension_count())
            .filter_map(|i| self.attribute(i).map(|a| a.identifier.clone()))
            .collect()
    }

    /// Whether the attribute is rendered per category
    fn is_discrete(&self, attribute: &str) -> Result<bool> {
        self.attribute_by_name(attribute)
            .map(|a| a.data_type.is_discrete())
            .ok_or_else(|| InteractionError::UnknownAttribute(attribute.to_string()))
    }

    /// Number of distinct categories of a discrete attribute.
    ///
    /// Fails when the attribute is unknown or was declared without a category table.
    fn category_count(&self, attribute: &str) -> Result<usize> {
        let meta = self
            .attribute_by_name(attribute)
            .ok_or_else(|| InteractionError::UnknownAttribute(attribute.to_string()))?;
        meta.categories
            .as_ref()
            .map(Vec::len)
            .ok_or_else(|| InteractionError::MissingCategoryTable(attribute.to_string()))
    }
}
