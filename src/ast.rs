//! This module defines abstract syntax tree (AST) types for `CREATE TABLE` statements.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColName {
    pub name: String,
}

/// a column definition: the column name and everything that follows it, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColDef {
    pub colname: ColName,
    pub spec: String,
}

impl ColDef {
    /// the declared type, which is the first word of the definition.
    pub fn coltype(&self) -> &str {
        self.spec.split_whitespace().next().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStatement {
    pub tablename: String,
    pub coldefs: Vec<ColDef>,
    pub primary_key: Vec<ColName>,
}

impl CreateStatement {
    pub fn column_names(&self) -> Vec<&str> {
        self.coldefs.iter().map(|c| c.colname.name.as_str()).collect()
    }
}

#[test]
fn test_coltype() {
    let c = ColDef {
        colname: ColName {
            name: "a".to_string(),
        },
        spec: "BIGINT(20) UNSIGNED NOT NULL".to_string(),
    };
    assert_eq!(c.coltype(), "BIGINT(20)");
    let c = ColDef {
        colname: ColName {
            name: "a".to_string(),
        },
        spec: "".to_string(),
    };
    assert_eq!(c.coltype(), "");
}
