//! Regex grammar, one anchored pattern per statement kind.
//!
//! This is a deliberate simplicity/coverage trade-off: anything the
//! single pattern does not match is rejected outright instead of being
//! partially parsed. No recursive descent, no nested parentheses.

use std::sync::LazyLock;

use regex::Regex;

use formsql_core::dialect::unquote_identifier;
use formsql_core::quoting::unquote_string_literal;
use formsql_core::{ParsedStatement, StatementKind, WhereClause};

use super::error::{ParseError, Result};

// The trailing clauses are split off by a quote-aware scan instead of
// regex groups, so a clause keyword inside a quoted WHERE literal is
// never mistaken for a real ORDER BY / LIMIT / OFFSET.
static SELECT_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*SELECT\s+(?P<cols>.+?)\s+FROM\s+(?P<table>\S+?)(?:\s+(?P<tail>\S.*?))?\s*;?\s*$")
        .expect("SELECT shape pattern")
});

static INSERT_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^\s*INSERT\s+INTO\s+(?P<table>\S+?)\s*\((?P<cols>[^()]*)\)\s*VALUES\s*\((?P<vals>[^()]*)\)\s*;?\s*$",
    )
    .expect("INSERT shape pattern")
});

static DELETE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*DELETE\s+FROM\s+(?P<table>\S+?)(?:\s+WHERE\s+(?P<where>.+?))?\s*;?\s*$")
        .expect("DELETE shape pattern")
});

// One pattern covering the three CALL templates the builder can emit:
// portable CALL, Oracle anonymous block and SQL Server EXEC.
static CALL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^\s*(?:CALL\s+(?P<proc>[^\s(]+?)\s*\((?P<args>[^()]*)\)|BEGIN\s+(?P<oproc>[^\s(]+?)\s*\((?P<oargs>[^()]*)\)\s*;\s*END|EXEC\s+(?P<mproc>\S+)(?:\s+(?P<margs>.+?))?)\s*;?\s*$",
    )
    .expect("CALL shape pattern")
});

static CONJUNCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^\s*(?P<col>[^\s=<>!()]+)\s*(?P<op>>=|<=|<>|!=|=|>|<|LIKE|IS\s+NOT|IS)\s*(?P<val>.+?)\s*$",
    )
    .expect("WHERE conjunct pattern")
});

/// Matches a statement against the fixed grammar for its kind.
pub(super) fn extract(sql: &str, kind: StatementKind) -> Result<ParsedStatement> {
    match kind {
        StatementKind::Select => extract_select(sql),
        StatementKind::Insert => extract_insert(sql),
        StatementKind::Delete => extract_delete(sql),
        StatementKind::Call => extract_call(sql),
    }
}

fn extract_select(sql: &str) -> Result<ParsedStatement> {
    let caps = SELECT_SHAPE
        .captures(sql)
        .ok_or(ParseError::UnsupportedQueryShape)?;

    let cols_raw = caps["cols"].trim().to_string();
    // Function calls and subqueries in the column list are out of scope.
    if cols_raw.contains('(') || cols_raw.contains(')') {
        return Err(ParseError::UnsupportedQueryShape);
    }
    let columns = if cols_raw == "*" {
        Vec::new()
    } else {
        split_list(&cols_raw)
            .iter()
            .map(|c| unquote_identifier(c))
            .collect()
    };

    let tail = match caps.name("tail") {
        Some(tail) => split_select_tail(tail.as_str()).ok_or(ParseError::UnsupportedQueryShape)?,
        None => SelectTail::default(),
    };
    let where_clauses = match tail.where_clause {
        Some(clause) => parse_where(clause)?,
        None => Vec::new(),
    };

    Ok(ParsedStatement::Select {
        table: unquote_identifier(&caps["table"]),
        columns,
        where_clauses,
        order_by: tail.order_by.map(unquote_identifier),
        limit: tail.limit.map(str::to_string),
        offset: tail.offset.map(str::to_string),
    })
}

fn extract_insert(sql: &str) -> Result<ParsedStatement> {
    let caps = INSERT_SHAPE
        .captures(sql)
        .ok_or(ParseError::UnsupportedQueryShape)?;

    let columns: Vec<String> = split_list(&caps["cols"])
        .iter()
        .map(|c| unquote_identifier(c))
        .collect();
    let values: Vec<String> = split_list(&caps["vals"])
        .into_iter()
        .map(|v| normalize_value(&v))
        .collect();

    if columns.len() != values.len() {
        return Err(ParseError::InsertArityMismatch {
            columns: columns.len(),
            values: values.len(),
        });
    }

    Ok(ParsedStatement::Insert {
        table: unquote_identifier(&caps["table"]),
        columns,
        values,
    })
}

fn extract_delete(sql: &str) -> Result<ParsedStatement> {
    let caps = DELETE_SHAPE
        .captures(sql)
        .ok_or(ParseError::UnsupportedQueryShape)?;

    let where_clauses = match caps.name("where") {
        Some(clause) => parse_where(clause.as_str())?,
        None => Vec::new(),
    };

    Ok(ParsedStatement::Delete {
        table: unquote_identifier(&caps["table"]),
        where_clauses,
    })
}

fn extract_call(sql: &str) -> Result<ParsedStatement> {
    let caps = CALL_SHAPE
        .captures(sql)
        .ok_or(ParseError::UnsupportedQueryShape)?;

    let (procedure, args_raw) = if let Some(proc) = caps.name("proc") {
        (proc.as_str(), caps.name("args").map_or("", |m| m.as_str()))
    } else if let Some(proc) = caps.name("oproc") {
        (proc.as_str(), caps.name("oargs").map_or("", |m| m.as_str()))
    } else if let Some(proc) = caps.name("mproc") {
        (proc.as_str(), caps.name("margs").map_or("", |m| m.as_str()))
    } else {
        return Err(ParseError::UnsupportedQueryShape);
    };

    let arguments = split_list(args_raw)
        .into_iter()
        .map(|a| normalize_value(&a))
        .collect();

    Ok(ParsedStatement::Call {
        procedure: unquote_identifier(procedure),
        arguments,
    })
}

/// The trailing clauses of a SELECT, split off after the table name.
#[derive(Debug, Default)]
struct SelectTail<'a> {
    where_clause: Option<&'a str>,
    order_by: Option<&'a str>,
    limit: Option<&'a str>,
    offset: Option<&'a str>,
}

/// Splits everything after `FROM table` into the trailing clauses,
/// honoring single-quoted strings.
///
/// The tail must start with a clause keyword, the keywords must appear
/// in WHERE, ORDER BY, LIMIT, OFFSET order, and ORDER BY / LIMIT /
/// OFFSET each take a single token. Returns `None` for anything else.
fn split_select_tail(tail: &str) -> Option<SelectTail<'_>> {
    // (clause rank, keyword start, clause content start)
    let mut markers: Vec<(u8, usize, usize)> = Vec::new();
    let bytes = tail.as_bytes();
    let mut in_quote = false;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\'' {
            in_quote = !in_quote;
            i += 1;
            continue;
        }
        let at_boundary = i == 0 || bytes[i - 1].is_ascii_whitespace();
        if !in_quote && at_boundary {
            if let Some((rank, consumed)) = match_clause_keyword(&tail[i..]) {
                markers.push((rank, i, i + consumed));
                i += consumed;
                continue;
            }
        }
        i += 1;
    }

    if markers.first().is_none_or(|&(_, start, _)| start != 0) {
        return None;
    }
    if markers.windows(2).any(|pair| pair[1].0 <= pair[0].0) {
        return None;
    }

    let mut clauses = SelectTail::default();
    for (index, &(rank, _, content_start)) in markers.iter().enumerate() {
        let content_end = markers
            .get(index + 1)
            .map_or(tail.len(), |&(_, next_start, _)| next_start);
        let content = tail[content_start..content_end].trim();
        if content.is_empty() {
            return None;
        }
        if rank == 0 {
            clauses.where_clause = Some(content);
        } else {
            if content.split_whitespace().count() != 1 {
                return None;
            }
            match rank {
                1 => clauses.order_by = Some(content),
                2 => clauses.limit = Some(content),
                _ => clauses.offset = Some(content),
            }
        }
    }
    Some(clauses)
}

/// Matches a clause keyword at the start of `rest`, returning its rank
/// and the byte length of the keyword plus trailing whitespace.
fn match_clause_keyword(rest: &str) -> Option<(u8, usize)> {
    let take = |keyword: &str| -> Option<usize> {
        let len = keyword.len();
        if rest.len() > len
            && rest.as_bytes()[..len].eq_ignore_ascii_case(keyword.as_bytes())
            && rest.as_bytes()[len].is_ascii_whitespace()
        {
            let after = &rest[len..];
            Some(len + (after.len() - after.trim_start().len()))
        } else {
            None
        }
    };

    if let Some(consumed) = take("WHERE") {
        return Some((0, consumed));
    }
    if let Some(consumed) = take("ORDER") {
        let after = &rest[consumed..];
        if after.len() > 2
            && after.as_bytes()[..2].eq_ignore_ascii_case(b"BY")
            && after.as_bytes()[2].is_ascii_whitespace()
        {
            let past_by = &after[2..];
            return Some((1, consumed + 2 + (past_by.len() - past_by.trim_start().len())));
        }
        return None;
    }
    if let Some(consumed) = take("LIMIT") {
        return Some((2, consumed));
    }
    if let Some(consumed) = take("OFFSET") {
        return Some((3, consumed));
    }
    None
}

/// Splits a WHERE clause strictly on AND and parses each conjunct.
fn parse_where(clause: &str) -> Result<Vec<WhereClause>> {
    split_on_and(clause).iter().map(|c| parse_conjunct(c)).collect()
}

fn parse_conjunct(fragment: &str) -> Result<WhereClause> {
    let reject = || ParseError::WhereParseError(fragment.trim().to_string());
    let caps = CONJUNCT.captures(fragment).ok_or_else(reject)?;

    let raw_value = caps["val"].trim().to_string();
    let value = match unquote_string_literal(&raw_value) {
        Some(literal) => literal,
        None => {
            // An unquoted right-hand side must be a bare token;
            // disjunctions, grouping and stray quotes are rejected.
            let has_or = raw_value
                .split_whitespace()
                .any(|t| t.eq_ignore_ascii_case("OR"));
            if has_or
                || raw_value.contains('(')
                || raw_value.contains(')')
                || raw_value.contains('\'')
            {
                return Err(reject());
            }
            raw_value
        }
    };

    let operator = caps["op"]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    Ok(WhereClause {
        column: unquote_identifier(&caps["col"]),
        operator,
        value,
    })
}

/// Removes string quoting from a value token; `NULL` stays as written.
fn normalize_value(token: &str) -> String {
    unquote_string_literal(token).unwrap_or_else(|| token.trim().to_string())
}

/// Splits a comma-separated list, honoring single-quoted strings.
///
/// An empty or all-whitespace list yields no items.
fn split_list(list: &str) -> Vec<String> {
    let trimmed = list.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    for c in trimmed.chars() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                current.push(c);
            }
            ',' if !in_quote => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    parts.push(current.trim().to_string());
    parts
}

/// Splits a WHERE clause on AND keywords outside quoted strings.
fn split_on_and(clause: &str) -> Vec<String> {
    let bytes = clause.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quote = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\'' {
            in_quote = !in_quote;
            i += 1;
            continue;
        }
        if !in_quote && b.is_ascii_whitespace() {
            let tail = &clause[i..];
            let trimmed = tail.trim_start();
            let leading_ws = tail.len() - trimmed.len();
            if trimmed.len() > 3
                && trimmed[..3].eq_ignore_ascii_case("AND")
                && trimmed.as_bytes()[3].is_ascii_whitespace()
            {
                parts.push(clause[start..i].trim().to_string());
                i += leading_ws + 3;
                start = i;
                continue;
            }
        }
        i += 1;
    }

    parts.push(clause[start..].trim().to_string());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_full_shape() {
        let stmt = extract(
            "SELECT `id`, name FROM `users` WHERE id = 5 AND name = 'Ann' ORDER BY name LIMIT 10 OFFSET 20",
            StatementKind::Select,
        )
        .unwrap();

        let ParsedStatement::Select {
            table,
            columns,
            where_clauses,
            order_by,
            limit,
            offset,
        } = stmt
        else {
            panic!("expected SELECT");
        };
        assert_eq!(table, "users");
        assert_eq!(columns, vec!["id", "name"]);
        assert_eq!(where_clauses.len(), 2);
        assert_eq!(where_clauses[0].column, "id");
        assert_eq!(where_clauses[0].operator, "=");
        assert_eq!(where_clauses[0].value, "5");
        assert_eq!(where_clauses[1].value, "Ann");
        assert_eq!(order_by.as_deref(), Some("name"));
        assert_eq!(limit.as_deref(), Some("10"));
        assert_eq!(offset.as_deref(), Some("20"));
    }

    #[test]
    fn select_star_yields_no_columns() {
        let stmt = extract("select * from users", StatementKind::Select).unwrap();
        let ParsedStatement::Select { columns, .. } = stmt else {
            panic!("expected SELECT");
        };
        assert!(columns.is_empty());
    }

    #[test]
    fn select_rejects_joins_and_unions() {
        for sql in [
            "SELECT * FROM a INNER JOIN b ON a.id = b.id",
            "SELECT * FROM a UNION SELECT * FROM b",
            "SELECT id FROM (SELECT id FROM a) x",
            "SELECT COUNT(*) FROM a",
        ] {
            assert_eq!(
                extract(sql, StatementKind::Select),
                Err(ParseError::UnsupportedQueryShape),
                "{sql}"
            );
        }
    }

    #[test]
    fn insert_shape_and_arity() {
        let stmt = extract(
            "INSERT INTO `t` (`id`, `name`) VALUES (5, 'Ann')",
            StatementKind::Insert,
        )
        .unwrap();
        let ParsedStatement::Insert {
            table,
            columns,
            values,
        } = stmt
        else {
            panic!("expected INSERT");
        };
        assert_eq!(table, "t");
        assert_eq!(columns, vec!["id", "name"]);
        assert_eq!(values, vec!["5", "Ann"]);

        assert_eq!(
            extract("INSERT INTO t (a, b) VALUES (1)", StatementKind::Insert),
            Err(ParseError::InsertArityMismatch {
                columns: 2,
                values: 1
            })
        );
    }

    #[test]
    fn insert_empty_lists_are_valid() {
        let stmt = extract("INSERT INTO t () VALUES ()", StatementKind::Insert).unwrap();
        let ParsedStatement::Insert {
            columns, values, ..
        } = stmt
        else {
            panic!("expected INSERT");
        };
        assert!(columns.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn delete_with_and_without_where() {
        let stmt = extract("DELETE FROM logs", StatementKind::Delete).unwrap();
        let ParsedStatement::Delete { where_clauses, .. } = stmt else {
            panic!("expected DELETE");
        };
        assert!(where_clauses.is_empty());

        let stmt = extract(
            "DELETE FROM logs WHERE level = 'debug' AND age > 30",
            StatementKind::Delete,
        )
        .unwrap();
        let ParsedStatement::Delete { where_clauses, .. } = stmt else {
            panic!("expected DELETE");
        };
        assert_eq!(where_clauses.len(), 2);
        assert_eq!(where_clauses[1].operator, ">");
    }

    #[test]
    fn where_rejects_or_and_grouping() {
        let err = extract(
            "DELETE FROM t WHERE a = 1 OR b = 2",
            StatementKind::Delete,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::WhereParseError(_)));

        let err = extract(
            "DELETE FROM t WHERE (a = 1 AND b = 2)",
            StatementKind::Delete,
        )
        .unwrap_err();
        assert_eq!(err, ParseError::WhereParseError("(a = 1".to_string()));
    }

    #[test]
    fn where_error_names_offending_fragment() {
        let err = extract(
            "DELETE FROM t WHERE a = 1 AND nonsense",
            StatementKind::Delete,
        )
        .unwrap_err();
        assert_eq!(err, ParseError::WhereParseError("nonsense".to_string()));
    }

    #[test]
    fn quoted_literal_keeps_embedded_clause_keywords() {
        let stmt = extract(
            "SELECT * FROM t WHERE name = 'a LIMIT 5' AND note = 'use ORDER BY id'",
            StatementKind::Select,
        )
        .unwrap();
        let ParsedStatement::Select {
            where_clauses,
            order_by,
            limit,
            offset,
            ..
        } = stmt
        else {
            panic!("expected SELECT");
        };
        assert_eq!(where_clauses[0].value, "a LIMIT 5");
        assert_eq!(where_clauses[1].value, "use ORDER BY id");
        assert!(order_by.is_none());
        assert!(limit.is_none());
        assert!(offset.is_none());
    }

    #[test]
    fn real_clauses_still_split_after_quoted_literal() {
        let stmt = extract(
            "SELECT * FROM t WHERE name = 'a LIMIT 5' ORDER BY id LIMIT 10 OFFSET 20",
            StatementKind::Select,
        )
        .unwrap();
        let ParsedStatement::Select {
            where_clauses,
            order_by,
            limit,
            offset,
            ..
        } = stmt
        else {
            panic!("expected SELECT");
        };
        assert_eq!(where_clauses[0].value, "a LIMIT 5");
        assert_eq!(order_by.as_deref(), Some("id"));
        assert_eq!(limit.as_deref(), Some("10"));
        assert_eq!(offset.as_deref(), Some("20"));
    }

    #[test]
    fn unbalanced_quote_in_where_is_rejected() {
        let err = extract(
            "SELECT * FROM t WHERE name = 'a LIMIT 5",
            StatementKind::Select,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::WhereParseError(_)));
    }

    #[test]
    fn trailing_clauses_out_of_order_are_rejected() {
        assert_eq!(
            extract("SELECT * FROM t LIMIT 5 WHERE a = 1", StatementKind::Select),
            Err(ParseError::UnsupportedQueryShape)
        );
        assert_eq!(
            extract("SELECT * FROM t LIMIT", StatementKind::Select),
            Err(ParseError::UnsupportedQueryShape)
        );
    }

    #[test]
    fn quoted_literal_keeps_embedded_and() {
        let stmt = extract(
            "DELETE FROM t WHERE name = 'rock and roll'",
            StatementKind::Delete,
        )
        .unwrap();
        let ParsedStatement::Delete { where_clauses, .. } = stmt else {
            panic!("expected DELETE");
        };
        assert_eq!(where_clauses[0].value, "rock and roll");
    }

    #[test]
    fn call_templates_all_parse() {
        for sql in ["CALL audit(5, 'x')", "BEGIN audit(5, 'x'); END;", "EXEC audit 5, 'x'"] {
            let stmt = extract(sql, StatementKind::Call).unwrap();
            let ParsedStatement::Call {
                procedure,
                arguments,
            } = stmt
            else {
                panic!("expected CALL");
            };
            assert_eq!(procedure, "audit", "{sql}");
            assert_eq!(arguments, vec!["5", "x"], "{sql}");
        }
    }

    #[test]
    fn call_without_arguments() {
        let stmt = extract("CALL audit()", StatementKind::Call).unwrap();
        let ParsedStatement::Call { arguments, .. } = stmt else {
            panic!("expected CALL");
        };
        assert!(arguments.is_empty());
    }

    #[test]
    fn kind_mismatch_is_a_shape_error() {
        assert_eq!(
            extract("DELETE FROM t", StatementKind::Select),
            Err(ParseError::UnsupportedQueryShape)
        );
    }

    #[test]
    fn trailing_semicolon_is_tolerated() {
        assert!(extract("SELECT * FROM users;", StatementKind::Select).is_ok());
        assert!(extract("DELETE FROM users ;", StatementKind::Delete).is_ok());
    }
}
