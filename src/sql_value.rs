//! Defines an enum of all the possible values that a column value can have.

use enum_as_inner::EnumAsInner;

#[derive(Debug, Clone, PartialEq, EnumAsInner)]
/// can hold any value that can be bound into a statement or read back from a table.
/// Values are integers, floats, text, or `NULL`.
pub enum SqlValue {
    Int(i64),
    Real(f64),
    Text(String),
    Null,
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Int(x) => x.fmt(f),
            SqlValue::Real(x) => x.fmt(f),
            SqlValue::Text(x) => x.fmt(f),
            SqlValue::Null => "NULL".fmt(f),
        }
    }
}

impl SqlValue {
    /// interprets the value as an integer the way a `%d` placeholder does.
    /// Text that does not look like a number becomes 0. Floats are truncated.
    pub fn to_i64(&self) -> i64 {
        match self {
            SqlValue::Int(i) => *i,
            SqlValue::Real(f) => f.trunc() as i64,
            SqlValue::Text(s) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(i) => i,
                    Err(_) => s.parse::<f64>().map(|f| f.trunc() as i64).unwrap_or(0),
                }
            }
            SqlValue::Null => 0,
        }
    }

    /// interprets the value as a float the way a `%f` placeholder does.
    pub fn to_f64(&self) -> f64 {
        match self {
            SqlValue::Int(i) => *i as f64,
            SqlValue::Real(f) => *f,
            SqlValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            SqlValue::Null => 0.0,
        }
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        SqlValue::Int(i)
    }
}

impl From<i32> for SqlValue {
    fn from(i: i32) -> Self {
        SqlValue::Int(i as i64)
    }
}

impl From<u32> for SqlValue {
    fn from(i: u32) -> Self {
        SqlValue::Int(i as i64)
    }
}

impl From<f64> for SqlValue {
    fn from(f: f64) -> Self {
        SqlValue::Real(f)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(String::from(s))
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(o: Option<T>) -> Self {
        match o {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

#[test]
fn test_sql_value_display() {
    assert_eq!(format!("{}", SqlValue::Int(-3)), "-3");
    assert_eq!(format!("{}", SqlValue::Real(1.5)), "1.5");
    assert_eq!(format!("{}", SqlValue::Text(String::from("hi"))), "hi");
    assert_eq!(format!("{}", SqlValue::Null), "NULL");
}

#[test]
fn test_sql_value_coercions() {
    use SqlValue::*;
    let cases = vec![
        (Int(3), 3, 3.0),
        (Real(2.75), 2, 2.75),
        (Text(String::from(" 42 ")), 42, 42.0),
        (Text(String::from("1e3")), 1000, 1000.0),
        (Text(String::from("0.5")), 0, 0.5),
        (Text(String::from("abc")), 0, 0.0),
        (Null, 0, 0.0),
    ];
    for (value, as_int, as_float) in cases {
        assert_eq!(value.to_i64(), as_int, "to_i64 of {:?}", value);
        assert_eq!(value.to_f64(), as_float, "to_f64 of {:?}", value);
    }
}

#[test]
fn test_sql_value_from() {
    assert_eq!(SqlValue::from(7), SqlValue::Int(7));
    assert_eq!(SqlValue::from("x").as_text(), Some(&String::from("x")));
    assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
    assert_eq!(SqlValue::from(Some(0.25)), SqlValue::Real(0.25));
}
