//! `pt_to_ast` has routines for converting parse trees of `CREATE TABLE` statements to ASTs.
//! A Pest parse tree has one enum for all possible terminals and non-terminals.
//! The AST keeps only what schema changes need: the table name, its columns and its primary key.

use crate::ast;
use crate::parser::{DdlParser, Error, Rule};
use crate::pest::Parser;
use pest::iterators::Pair;

fn identifier_name(pair: Pair<Rule>) -> String {
    // table_identifier wraps either a bare identifier or a quoted one.
    let inner = match pair.as_rule() {
        Rule::table_identifier => match pair.into_inner().next() {
            Some(p) => p,
            None => return String::new(),
        },
        _ => pair,
    };
    match inner.as_rule() {
        Rule::quoted_identifier => inner
            .into_inner()
            .next()
            .map(|q| q.as_str().replace("``", "`"))
            .unwrap_or_default(),
        _ => String::from(inner.as_str()),
    }
}

fn column_list(pair: Pair<Rule>) -> Vec<ast::ColName> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::table_identifier)
        .map(|p| ast::ColName {
            name: identifier_name(p),
        })
        .collect()
}

/// parses one `CREATE TABLE` statement.
pub fn parse_create_statement(c: &str) -> Result<ast::CreateStatement, Error> {
    let create_stmt = DdlParser::parse(Rule::create_stmt, c)?
        .next()
        .ok_or_else(|| Error::Syntax(String::from("empty input")))?;

    let mut tablename = String::new();
    let mut coldefs: Vec<ast::ColDef> = vec![];
    let mut primary_key: Vec<ast::ColName> = vec![];

    for c in create_stmt.into_inner() {
        match c.as_rule() {
            Rule::table_identifier => {
                tablename = identifier_name(c);
            }
            Rule::table_elements => {
                for element in c.into_inner() {
                    match element.as_rule() {
                        Rule::column_def => {
                            let mut parts = element.into_inner();
                            let colname = parts.next().map(identifier_name).unwrap_or_default();
                            let spec = parts
                                .next()
                                .map(|s| String::from(s.as_str().trim()))
                                .unwrap_or_default();
                            coldefs.push(ast::ColDef {
                                colname: ast::ColName { name: colname },
                                spec,
                            });
                        }
                        Rule::primary_key_def => {
                            if let Some(list) = element
                                .into_inner()
                                .find(|p| p.as_rule() == Rule::column_list)
                            {
                                primary_key = column_list(list);
                            }
                        }
                        // Secondary indexes do not change which columns exist.
                        Rule::unique_def | Rule::index_def => (),
                        _ => unreachable!(),
                    }
                }
            }
            Rule::kw_create
            | Rule::kw_temporary
            | Rule::kw_table
            | Rule::if_not_exists
            | Rule::table_options
            | Rule::EOI => (),
            _ => unreachable!(),
        }
    }
    Ok(ast::CreateStatement {
        tablename,
        coldefs,
        primary_key,
    })
}

#[test]
fn test_parse_create_statement() {
    let input = "CREATE TABLE t (a int)";
    let actual = parse_create_statement(input).unwrap();
    let expected = ast::CreateStatement {
        tablename: "t".to_string(),
        coldefs: vec![ast::ColDef {
            colname: ast::ColName {
                name: "a".to_string(),
            },
            spec: "int".to_string(),
        }],
        primary_key: vec![],
    };
    assert_eq!(actual, expected);
}

#[test]
fn test_parse_create_statement_columns_and_key() {
    let cases = vec![
        (
            "CREATE TABLE wp_model_table (
                user_id BIGINT UNSIGNED NOT NULL,
                post_id BIGINT UNSIGNED NOT NULL,
                type_id TINYINT NOT NULL DEFAULT 1,
                `created_at` TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY  (user_id),
                KEY post_id (post_id)
            ) DEFAULT CHARACTER SET utf8mb4;",
            (
                "wp_model_table",
                vec!["user_id", "post_id", "type_id", "created_at"],
                vec!["BIGINT", "BIGINT", "TINYINT", "TIMESTAMP"],
                vec!["user_id"],
            ),
        ),
        (
            "CREATE TABLE IF NOT EXISTS `odd``name` (a decimal(10, 2) DEFAULT '1,5', b text, PRIMARY KEY (`a`, b))",
            ("odd`name", vec!["a", "b"], vec!["decimal(10,", "text"], vec!["a", "b"]),
        ),
    ];
    for case in cases {
        let input = case.0;
        println!("Input: {}", input);
        let actual = parse_create_statement(input).unwrap();
        assert_eq!(actual.tablename, case.1 .0);
        assert_eq!(actual.column_names(), case.1 .1);
        assert_eq!(
            actual.coldefs.iter().map(|c| c.coltype()).collect::<Vec<_>>(),
            case.1 .2
        );
        assert_eq!(
            actual.primary_key.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            case.1 .3
        );
    }
}

#[test]
fn test_parse_create_statement_keeps_column_spec() {
    let s = parse_create_statement("CREATE TABLE t (a text NOT NULL DEFAULT 'x, y')").unwrap();
    assert_eq!(s.coldefs[0].spec, "text NOT NULL DEFAULT 'x, y'");
}

#[test]
fn test_parse_create_statement_error() {
    assert!(matches!(
        parse_create_statement("CREATE TABLE t"),
        Err(Error::Syntax(_))
    ));
}
