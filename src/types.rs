//! Core data model: typed records, datasets and aggregation output.
//!
//! A [`DataSet`] is an ordered list of rows described by a [`Schema`]. The engine never mutates a
//! dataset once it is handed over; filtering only changes which rows are *visible*.

use std::fmt;

/// Logical data type for a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// ISO-8601-like date or date-time text (`YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, ...).
    ///
    /// Stored as [`Value::Utf8`]; the engine buckets it by month unless told otherwise.
    Date,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the shape of every record in a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the field with the given name, if present.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A single scalar value in a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string (also carries date/date-time text).
    Utf8(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text of a [`Value::Utf8`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view of the value.
    ///
    /// Integers and floats convert directly; text converts when it parses as a number. Booleans
    /// and nulls are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Utf8(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Value::Null | Value::Bool(_) => None,
        }
    }

    /// Canonical text used when the value becomes a bucket label.
    ///
    /// Returns `None` for [`Value::Null`], which never forms a bucket.
    pub fn to_label(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate rows as by-name [`Record`] views.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |row| Record {
            schema: &self.schema,
            row: row.as_slice(),
        })
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_records<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Record<'_>) -> bool,
    {
        let rows = self
            .records()
            .filter(|record| predicate(record))
            .map(|record| record.row.to_vec())
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }
}

/// Borrowed view of one row with by-name field access.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    schema: &'a Schema,
    row: &'a [Value],
}

impl<'a> Record<'a> {
    /// Build a record view over a row laid out according to `schema`.
    pub fn new(schema: &'a Schema, row: &'a [Value]) -> Self {
        Self { schema, row }
    }

    /// Value of `field`, or `None` when the field is not part of the schema.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.schema.index_of(field).and_then(|idx| self.row.get(idx))
    }

    /// Text of `field`, or `None` when the field is absent or not text.
    pub fn text(&self, field: &str) -> Option<&'a str> {
        self.get(field).and_then(Value::as_str)
    }

    /// The underlying row values, in schema order.
    pub fn values(&self) -> &'a [Value] {
        self.row
    }
}

/// Ordered label/count pairs produced by aggregation.
///
/// `labels` and `values` always have the same length; `values[i]` counts the visible records whose
/// bucket equals `labels[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one bucket.
    pub fn push(&mut self, label: impl Into<String>, value: usize) {
        self.labels.push(label.into());
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Count for `label`, if the series contains it.
    pub fn get(&self, label: &str) -> Option<usize> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|idx| self.values[idx])
    }

    /// Iterate `(label, count)` pairs in series order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.values.iter().sum()
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for Series {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        let mut series = Series::new();
        for (label, value) in iter {
            series.push(label, value);
        }
        series
    }
}

#[cfg(test)]
mod tests {
    use super::{DataSet, DataType, Field, Record, Schema, Series, Value};

    fn sample_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("status", DataType::Utf8),
            Field::new("opened_at", DataType::Date),
        ]);
        DataSet::new(
            schema,
            vec![
                vec![
                    Value::Int64(1),
                    Value::Utf8("open".to_string()),
                    Value::Utf8("2024-01-15 10:00:00".to_string()),
                ],
                vec![Value::Int64(2), Value::Null, Value::Null],
            ],
        )
    }

    #[test]
    fn record_reads_fields_by_name() {
        let ds = sample_dataset();
        let first = ds.records().next().unwrap();
        assert_eq!(first.get("id"), Some(&Value::Int64(1)));
        assert_eq!(first.text("status"), Some("open"));
        assert_eq!(first.get("missing"), None);
    }

    #[test]
    fn record_on_short_row_reads_absent() {
        let schema = Schema::new(vec![
            Field::new("a", DataType::Utf8),
            Field::new("b", DataType::Utf8),
        ]);
        let row = vec![Value::Utf8("x".to_string())];
        let record = Record::new(&schema, &row);
        assert_eq!(record.text("a"), Some("x"));
        assert_eq!(record.get("b"), None);
    }

    #[test]
    fn filter_records_preserves_schema_and_original() {
        let ds = sample_dataset();
        let out = ds.filter_records(|r| r.text("status") == Some("open"));
        assert_eq!(out.schema, ds.schema);
        assert_eq!(out.row_count(), 1);
        assert_eq!(ds.row_count(), 2);
    }

    #[test]
    fn value_labels_and_numbers() {
        assert_eq!(Value::Null.to_label(), None);
        assert_eq!(Value::Int64(7).to_label(), Some("7".to_string()));
        assert_eq!(Value::Bool(true).to_label(), Some("true".to_string()));
        assert_eq!(Value::Utf8(" 2.5 ".to_string()).as_f64(), Some(2.5));
        assert_eq!(Value::Utf8("abc".to_string()).as_f64(), None);
        assert_eq!(Value::Bool(true).as_f64(), None);
    }

    #[test]
    fn series_lookup_and_total() {
        let series: Series = vec![("a", 2), ("b", 3)].into_iter().collect();
        assert_eq!(series.len(), 2);
        assert_eq!(series.get("b"), Some(3));
        assert_eq!(series.get("c"), None);
        assert_eq!(series.total(), 5);
    }
}
