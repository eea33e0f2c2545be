//! Database value types and conversions.

use crate::DbError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

/// A database value that can be used as a parameter or result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Integer value.
    Integer(i64),
    /// Real/float value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl Value {
    /// Encode any serializable value as a JSON text column.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, DbError> {
        Ok(Value::Text(serde_json::to_string(value)?))
    }

    /// Try to get the value as an i64.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Try to get the value as an f64.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get the value as a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as bytes.
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            Value::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

// SQLite has no boolean storage class.
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(if v { 1 } else { 0 })
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// A row from a query result.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a new row from columns and values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Get a value by column index.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get all values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Read a required text column.
    pub fn text(&self, column: &str) -> Result<String, DbError> {
        self.opt_text(column)?
            .ok_or_else(|| DbError::TypeError(format!("column {} is null", column)))
    }

    /// Read a nullable text column.
    pub fn opt_text(&self, column: &str) -> Result<Option<String>, DbError> {
        match self.require(column)? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s.clone())),
            other => Err(mismatch(column, "text", other)),
        }
    }

    /// Read a required integer column.
    pub fn integer(&self, column: &str) -> Result<i64, DbError> {
        self.opt_integer(column)?
            .ok_or_else(|| DbError::TypeError(format!("column {} is null", column)))
    }

    /// Read a nullable integer column.
    pub fn opt_integer(&self, column: &str) -> Result<Option<i64>, DbError> {
        match self.require(column)? {
            Value::Null => Ok(None),
            Value::Integer(i) => Ok(Some(*i)),
            other => Err(mismatch(column, "integer", other)),
        }
    }

    /// Read a required real column. Integers are widened.
    pub fn real(&self, column: &str) -> Result<f64, DbError> {
        let value = self.require(column)?;
        value.as_real().ok_or_else(|| mismatch(column, "real", value))
    }

    /// Read a 0/1 integer column as a boolean.
    pub fn boolean(&self, column: &str) -> Result<bool, DbError> {
        Ok(self.integer(column)? != 0)
    }

    /// Decode a JSON text column.
    pub fn json<T: DeserializeOwned>(&self, column: &str) -> Result<T, DbError> {
        let text = self.text(column)?;
        serde_json::from_str(&text).map_err(|e| {
            DbError::DeserializeError(format!("column {}: {}", column, e))
        })
    }

    /// Decode a nullable JSON text column.
    pub fn opt_json<T: DeserializeOwned>(&self, column: &str) -> Result<Option<T>, DbError> {
        match self.opt_text(column)? {
            Some(text) => serde_json::from_str(&text).map(Some).map_err(|e| {
                DbError::DeserializeError(format!("column {}: {}", column, e))
            }),
            None => Ok(None),
        }
    }

    /// Convert the row to a HashMap.
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.columns
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Try to deserialize the row into a type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        let map: serde_json::Map<String, serde_json::Value> = self
            .columns
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect();

        let json = serde_json::Value::Object(map);
        serde_json::from_value(json).map_err(|e| DbError::DeserializeError(e.to_string()))
    }

    fn require(&self, column: &str) -> Result<&Value, DbError> {
        self.get(column)
            .ok_or_else(|| DbError::TypeError(format!("missing column {}", column)))
    }
}

fn mismatch(column: &str, expected: &str, got: &Value) -> DbError {
    DbError::TypeError(format!(
        "column {}: expected {}, got {:?}",
        column, expected, got
    ))
}

/// Query result containing rows.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// The column names.
    pub columns: Vec<String>,
    /// The rows.
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Create a new query result.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the first row.
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Deserialize all rows into a vector of a type.
    pub fn deserialize_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, DbError> {
        self.rows.iter().map(|row| row.deserialize()).collect()
    }
}

/// Convert a Value to a serde_json::Value.
fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Blob(b) => String::from_utf8(b.clone())
            .map(serde_json::Value::String)
            .unwrap_or_else(|_| {
                use base64::Engine;
                serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(b))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn sample_row() -> Row {
        Row::new(
            vec![
                "id".to_string(),
                "title".to_string(),
                "price".to_string(),
                "sizes".to_string(),
                "note".to_string(),
                "featured".to_string(),
            ],
            vec![
                Value::Text("p1".to_string()),
                Value::Text("Mango Pickle".to_string()),
                Value::Integer(24900),
                Value::Text(r#"["250g","500g"]"#.to_string()),
                Value::Null,
                Value::Integer(1),
            ],
        )
    }

    #[test]
    fn test_typed_getters() {
        let row = sample_row();
        assert_eq!(row.text("id").unwrap(), "p1");
        assert_eq!(row.integer("price").unwrap(), 24900);
        assert_eq!(row.opt_text("note").unwrap(), None);
        assert!(row.boolean("featured").unwrap());
        assert!((row.real("price").unwrap() - 24900.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_column() {
        let row = sample_row();
        let sizes: Vec<String> = row.json("sizes").unwrap();
        assert_eq!(sizes, vec!["250g", "500g"]);
        let missing: Option<Vec<String>> = row.opt_json("note").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let row = sample_row();
        assert!(matches!(row.integer("title"), Err(DbError::TypeError(_))));
        assert!(matches!(row.text("nope"), Err(DbError::TypeError(_))));
    }

    #[test]
    fn test_row_deserialize() {
        #[derive(Deserialize)]
        struct Slim {
            id: String,
            price: i64,
        }
        let slim: Slim = sample_row().deserialize().unwrap();
        assert_eq!(slim.id, "p1");
        assert_eq!(slim.price, 24900);
    }

    #[test]
    fn test_option_and_bool_conversion() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some(5_i64)), Value::Integer(5));
        assert_eq!(Value::from(true), Value::Integer(1));
    }
}
