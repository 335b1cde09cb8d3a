//! In-memory column store.

use super::{Attribute, DataSource, DataType, DataValue};
use crate::error::{InteractionError, Result};
use std::collections::BTreeSet;

/// Column contents kept alongside the attribute metadata
#[derive(Debug, Clone)]
enum Column {
    Numeric { min: f32, max: f32 },
    Categorical,
}

/// Column store built once and shared read-only through an `Arc`
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    attributes: Vec<Attribute>,
    columns: Vec<Column>,
}

impl InMemoryDataSource {
    /// Create an empty data source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a numeric column; its range drives de-normalisation
    pub fn with_numeric_column(mut self, name: &str, values: &[f32]) -> Self {
        let (min, max) = values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let (min, max) = if min > max { (0.0, 0.0) } else { (min, max) };

        self.attributes.push(Attribute {
            identifier: name.to_string(),
            data_type: DataType::Number,
            categories: None,
        });
        self.columns.push(Column::Numeric { min, max });
        self
    }

    /// Add a string column; distinct values become its sorted category table
    pub fn with_text_column<S: AsRef<str>>(self, name: &str, values: &[S]) -> Self {
        self.with_discrete_column(name, DataType::String, values)
    }

    /// Add a date column, stored by its textual representation
    pub fn with_date_column<S: AsRef<str>>(self, name: &str, values: &[S]) -> Self {
        self.with_discrete_column(name, DataType::Date, values)
    }

    /// Declare a discrete column without a category table.
    ///
    /// Axes bound to such a column fail when they try to count its categories.
    pub fn with_undeclared_discrete_column(mut self, name: &str, data_type: DataType) -> Self {
        self.attributes.push(Attribute {
            identifier: name.to_string(),
            data_type,
            categories: None,
        });
        self.columns.push(Column::Categorical);
        self
    }

    fn with_discrete_column<S: AsRef<str>>(mut self, name: &str, data_type: DataType, values: &[S]) -> Self {
        let categories: BTreeSet<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
        self.attributes.push(Attribute {
            identifier: name.to_string(),
            data_type,
            categories: Some(categories.into_iter().collect()),
        });
        self.columns.push(Column::Categorical);
        self
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.attributes
            .iter()
            .position(|a| a.identifier == name)
            .ok_or_else(|| InteractionError::UnknownAttribute(name.to_string()))
    }
}

impl DataSource for InMemoryDataSource {
    fn dimension_count(&self) -> usize {
        self.attributes.len()
    }

    fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.identifier == name)
    }

    fn original_value(&self, normalised: f32, attribute: &str) -> Result<DataValue> {
        let index = self.index_of(attribute)?;
        let n = normalised.clamp(0.0, 1.0);

        match &self.columns[index] {
            Column::Numeric { min, max } => Ok(DataValue::Number(min + (max - min) * n)),
            Column::Categorical => {
                let categories = self.attributes[index]
                    .categories
                    .as_ref()
                    .ok_or_else(|| InteractionError::MissingCategoryTable(attribute.to_string()))?;
                if categories.is_empty() {
                    return Ok(DataValue::Text(String::new()));
                }
                let slot = (n * (categories.len() - 1) as f32).round() as usize;
                Ok(DataValue::Text(categories[slot].clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cars() -> InMemoryDataSource {
        InMemoryDataSource::new()
            .with_numeric_column("mpg", &[10.0, 20.0, 30.0])
            .with_text_column("origin", &["usa", "japan", "europe", "usa"])
            .with_date_column("year", &["1970", "1971"])
    }

    #[test]
    fn test_numeric_denormalisation() {
        let source = cars();
        assert_eq!(source.original_value(0.5, "mpg").unwrap(), DataValue::Number(20.0));
        assert_eq!(source.original_value(2.0, "mpg").unwrap(), DataValue::Number(30.0));
    }

    #[test]
    fn test_categories_sorted_and_deduplicated() {
        let source = cars();
        assert_eq!(source.category_count("origin").unwrap(), 3);
        assert_eq!(
            source.original_value(0.0, "origin").unwrap(),
            DataValue::Text("europe".into())
        );
        assert_eq!(
            source.original_value(1.0, "origin").unwrap(),
            DataValue::Text("usa".into())
        );
        assert!(source.is_discrete("year").unwrap());
        assert!(!source.is_discrete("mpg").unwrap());
    }

    #[test]
    fn test_unknown_and_undeclared_attributes_fail() {
        let source = cars().with_undeclared_discrete_column("maker", DataType::String);
        assert!(matches!(
            source.category_count("weight"),
            Err(InteractionError::UnknownAttribute(_))
        ));
        assert!(matches!(
            source.category_count("maker"),
            Err(InteractionError::MissingCategoryTable(_))
        ));
    }

    #[test]
    fn test_dimension_names_in_order() {
        assert_eq!(cars().dimension_names(), vec!["mpg", "origin", "year"]);
    }
}
