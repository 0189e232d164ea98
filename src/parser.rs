//! `parser` contains the generated parsing routines for `CREATE TABLE` statements and tests on them.

#[allow(unused_imports)]
use pest::Parser; // This needs to be in scope for the next statements to work.
#[derive(Parser)]
#[grammar = "ddl.pest"]
pub struct DdlParser;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unable to parse CREATE TABLE statement: {0}")]
    Syntax(String),
}

impl From<pest::error::Error<Rule>> for Error {
    fn from(e: pest::error::Error<Rule>) -> Self {
        Error::Syntax(e.to_string())
    }
}

#[test]
fn test_parse_identifiers() {
    let cases = vec![("a"), ("user_id"), ("_x1"), ("`a`"), ("`odd``name`"), ("`with space`")];
    for case in cases {
        assert!(
            DdlParser::parse(Rule::table_identifier, case).is_ok(),
            "{} should parse",
            case
        );
    }
    assert!(DdlParser::parse(Rule::table_identifier, "1abc").is_err());
}

#[test]
fn test_parse_create_statements() {
    let cases = vec![
        ("CREATE TABLE t (a int)"),
        ("create table t (a int);"),
        ("CREATE TABLE IF NOT EXISTS t (a int)"),
        ("CREATE TEMPORARY TABLE t (a int)"),
        ("CREATE TABLE `wp_t` (`a` BIGINT UNSIGNED NOT NULL, b text DEFAULT 'x, (y)')"),
        ("CREATE TABLE t (a int, b decimal(10,2), PRIMARY KEY (a))"),
        ("CREATE TABLE t (a int, b int, PRIMARY KEY  (a,b), KEY b (b), UNIQUE KEY ab (a, b))"),
        ("CREATE TABLE t (a int, CONSTRAINT pk PRIMARY KEY (a)) DEFAULT CHARACTER SET utf8mb4"),
        ("CREATE TABLE t (\n  a int,\n  key_id int\n)\n"),
    ];
    for case in cases {
        assert!(
            DdlParser::parse(Rule::create_stmt, case).is_ok(),
            "{} should parse",
            case
        );
    }
}

#[test]
fn test_reject_malformed_create_statements() {
    let cases = vec![
        ("CREATE t (a int)"),
        ("CREATE TABLE t"),
        ("CREATE TABLE t ()"),
        ("CREATE TABLE t (a int,)"),
        ("SELECT * FROM t"),
        ("CREATE TABLE t (a int); DROP TABLE t"),
    ];
    for case in cases {
        assert!(
            DdlParser::parse(Rule::create_stmt, case).is_err(),
            "{} should not parse",
            case
        );
    }
}
