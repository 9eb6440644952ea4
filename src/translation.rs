//! Rewrite named `@placeholder` references to the positional `@P1`..`@PN`
//! form the wire protocol expects, without touching string literals, quoted
//! identifiers, or comments.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::statement::Parameter;

/// Rewrite a statement's named placeholders to positional ones.
///
/// Position follows the parameter binding order, so `parameters[0]` becomes
/// `@P1` and so on. Name uniqueness within a compiled statement makes the
/// mapping total; anything that is not a known parameter name (column text,
/// `@@ROWCOUNT`-style system variables, names inside literals) is left
/// untouched. Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn positional_placeholders<'a>(sql: &'a str, parameters: &[Parameter]) -> Cow<'a, str> {
    if parameters.is_empty() {
        return Cow::Borrowed(sql);
    }

    let positions: HashMap<&str, usize> = parameters
        .iter()
        .enumerate()
        .map(|(idx, p)| (p.name.as_str(), idx + 1))
        .collect();

    let bytes = sql.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0usize;
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'[' => state = State::Bracketed,
                b'-' if bytes.get(idx + 1) == Some(&b'-') => {
                    state = State::LineComment;
                    idx += 1;
                }
                b'/' if bytes.get(idx + 1) == Some(&b'*') => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'@' => {
                    if bytes.get(idx + 1) == Some(&b'@') {
                        // system variable, leave as-is
                        idx += 1;
                    } else if let Some((end, name)) = scan_identifier(bytes, idx + 1) {
                        if let Some(&position) = positions.get(name) {
                            let buf = out.get_or_insert_with(String::new);
                            buf.push_str(&sql[copied..idx]);
                            buf.push_str("@P");
                            buf.push_str(&position.to_string());
                            copied = end;
                            idx = end - 1;
                        }
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Bracketed => {
                if b == b']' {
                    if bytes.get(idx + 1) == Some(&b']') {
                        idx += 1; // skip escaped bracket
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            // T-SQL block comments nest
            State::BlockComment(depth) => {
                if b == b'/' && bytes.get(idx + 1) == Some(&b'*') {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if b == b'*' && bytes.get(idx + 1) == Some(&b'/') {
                    if depth == 1 {
                        state = State::Normal;
                    } else {
                        state = State::BlockComment(depth - 1);
                    }
                    idx += 1;
                }
            }
        }

        idx += 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

#[derive(Clone, Copy)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Bracketed,
    LineComment,
    BlockComment(u32),
}

fn scan_identifier(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let mut idx = start;
    while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
        idx += 1;
    }
    if idx == start {
        None
    } else {
        std::str::from_utf8(&bytes[start..idx])
            .ok()
            .map(|name| (idx, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::compile;

    #[test]
    fn rewrites_names_in_binding_order() {
        let statement = compile(
            &["select a from b where d = ", " and e = ", ""],
            vec![1.into(), "f".into()],
        );
        let sql = positional_placeholders(&statement.sql, &statement.parameters);
        assert_eq!(sql, "select a from b where d = @P1 and e = @P2");
    }

    #[test]
    fn rewrites_row_groups() {
        let statement = compile(
            &["insert into a (b, c) values ", ""],
            vec![vec![vec![1, 2], vec![3, 4]].into()],
        );
        let sql = positional_placeholders(&statement.sql, &statement.parameters);
        assert_eq!(sql, "insert into a (b, c) values (@P1, @P2), (@P3, @P4)");
    }

    #[test]
    fn longer_names_are_not_clipped_by_shorter_ones() {
        // p0_1 is a prefix of p0_10; the maximal identifier must win
        let values: Vec<i64> = (0..11).collect();
        let statement = compile(&["select ", ""], vec![values.into()]);
        let sql = positional_placeholders(&statement.sql, &statement.parameters);
        assert!(sql.ends_with("@P10, @P11"));
        assert!(!sql.contains("@p0_"));
    }

    #[test]
    fn skips_literals_comments_and_quoted_identifiers() {
        let statement = compile(&["update t set a = '@p0_0' -- @p0_0\n where [b@c] = ", ""], vec![
            1.into(),
        ]);
        let sql = positional_placeholders(&statement.sql, &statement.parameters);
        assert_eq!(sql, "update t set a = '@p0_0' -- @p0_0\n where [b@c] = @P1");
    }

    #[test]
    fn leaves_system_variables_alone() {
        let statement = compile(&["select @@ROWCOUNT where a = ", ""], vec![1.into()]);
        let sql = positional_placeholders(&statement.sql, &statement.parameters);
        assert_eq!(sql, "select @@ROWCOUNT where a = @P1");
    }

    #[test]
    fn borrows_when_there_is_nothing_to_do() {
        let statement = compile(&["select 1"], vec![]);
        let sql = positional_placeholders(&statement.sql, &statement.parameters);
        assert!(matches!(sql, Cow::Borrowed(_)));
    }
}
