// Named placeholders (`@name`) in command texts.
//
// Text in string literals, quoted identifiers and comments is skipped,
// and system variables like `@@VERSION` are not placeholders.
// Block comments nest in T-SQL, but not in SQLite, so the caller says which rule applies.

use crate::types_impl::Binding;
use crate::{HelperError, HelperResult};
use std::fmt::Write;
use std::ops::Range;

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Placeholder<'s> {
    // without the leading '@'
    pub name: &'s str,
    // including the leading '@'
    pub range: Range<usize>,
}

pub(crate) fn scan(cmd: &str, nested_comments: bool) -> Vec<Placeholder<'_>> {
    let bytes = cmd.as_bytes();
    let mut placeholders = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        i = match bytes[i] {
            b'\'' => skip_quoted(bytes, i, b'\''),
            b'"' => skip_quoted(bytes, i, b'"'),
            b'`' => skip_quoted(bytes, i, b'`'),
            b'[' => skip_quoted(bytes, i, b']'),
            b'-' if bytes.get(i + 1) == Some(&b'-') => skip_line(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => skip_block_comment(bytes, i, nested_comments),
            b'@' if bytes.get(i + 1) == Some(&b'@') => identifier_end(bytes, i + 2),
            b'@' => {
                let end = identifier_end(bytes, i + 1);
                if end > i + 1 {
                    placeholders.push(Placeholder {
                        name: &cmd[i + 1..end],
                        range: i..end,
                    });
                }
                end.max(i + 1)
            }
            _ => i + 1,
        };
    }
    placeholders
}

// Matches each binding with a placeholder of the command text (ignoring ASCII case);
// the binding adopts the spelling of the placeholder.
pub(crate) fn resolve(
    cmd: &str,
    nested_comments: bool,
    bindings: &mut [Binding],
) -> HelperResult<()> {
    let placeholders = scan(cmd, nested_comments);
    for binding in bindings.iter_mut() {
        let placeholder = placeholders
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(binding.name()))
            .ok_or_else(|| HelperError::UnknownParameter(binding.name().to_string()))?;
        binding.set_name(placeholder.name);
    }
    Ok(())
}

// Replaces the placeholders of the given bindings with `@P1`, `@P2`, ...
// in the order of the bindings; other placeholders stay untouched.
// Only used for SQL Server, hence with nesting block comments.
#[cfg_attr(not(feature = "mssql"), allow(dead_code))]
pub(crate) fn rewrite_positional(cmd: &str, bindings: &[Binding]) -> String {
    let mut rewritten = String::with_capacity(cmd.len() + 4 * bindings.len());
    let mut copied_until = 0;
    for placeholder in scan(cmd, true) {
        if let Some(idx) = bindings
            .iter()
            .position(|b| b.name().eq_ignore_ascii_case(placeholder.name))
        {
            rewritten.push_str(&cmd[copied_until..placeholder.range.start]);
            write!(rewritten, "@P{}", idx + 1).ok();
            copied_until = placeholder.range.end;
        }
    }
    rewritten.push_str(&cmd[copied_until..]);
    rewritten
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'#' || b == b'$' || b >= 0x80
}

fn identifier_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| !is_identifier_byte(*b))
        .map_or(bytes.len(), |pos| start + pos)
}

// A doubled closing character is an escaped one.
fn skip_quoted(bytes: &[u8], start: usize, close: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == close {
            if bytes.get(i + 1) == Some(&close) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn skip_line(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(bytes.len(), |pos| start + pos + 1)
}

fn skip_block_comment(bytes: &[u8], start: usize, nested: bool) -> usize {
    let mut depth = 0_usize;
    let mut i = start;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"/*") && (nested || depth == 0) {
            depth += 1;
            i += 2;
        } else if bytes[i..].starts_with(b"*/") {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return i;
            }
        } else {
            i += 1;
        }
    }
    bytes.len()
}

#[cfg(test)]
mod test {
    use super::{resolve, rewrite_positional, scan};
    use crate::types_impl::{Binding, BindingMode};
    use crate::{HelperError, Parameter};

    fn names(cmd: &str) -> Vec<&str> {
        scan(cmd, true).into_iter().map(|p| p.name).collect()
    }

    #[test]
    fn test_scan() {
        assert_eq!(
            names("SELECT * FROM T WHERE A = @a AND B=@b_2 OR C IN (@a)"),
            vec!["a", "b_2", "a"]
        );
        assert_eq!(
            names("SELECT '@no', \"@no\", [@no], [x]]@no] -- @no\n, @yes /* @no /* @no */ @no */"),
            vec!["yes"]
        );
        assert_eq!(names("SELECT @@VERSION, @"), Vec::<&str>::new());
        assert_eq!(names("SELECT 'it''s @no' + @äh"), vec!["äh"]);
        assert_eq!(names("SELECT '@unterminated"), Vec::<&str>::new());

        let placeholders = scan("x=@id;", false);
        assert_eq!(placeholders[0].range, 2..5);
    }

    #[test]
    fn test_block_comments() {
        let cmd = "SELECT /* a /* b */ @x /* c */ */ @y";
        let flat: Vec<_> = scan(cmd, false).into_iter().map(|p| p.name).collect();
        assert_eq!(flat, vec!["x", "y"]);
        let nested: Vec<_> = scan(cmd, true).into_iter().map(|p| p.name).collect();
        assert_eq!(nested, vec!["y"]);

        assert_eq!(scan("SELECT /* open @no", false), vec![]);
        assert_eq!(scan("SELECT /* open /* @no */", true), vec![]);
    }

    #[test]
    fn test_resolve() {
        let mut bindings = Binding::try_from_params(
            &[Parameter::new("ID", 1_i32), Parameter::new("@name", "x")],
            BindingMode::Advisory,
        )
        .unwrap();
        resolve("UPDATE T SET N = @Name WHERE Id = @id", false, &mut bindings).unwrap();
        assert_eq!(bindings[0].name(), "id");
        assert_eq!(bindings[1].name(), "Name");

        let mut bindings =
            Binding::try_from_params(&[Parameter::new("other", 1_i32)], BindingMode::Advisory)
                .unwrap();
        assert!(matches!(
            resolve("SELECT '@other'", false, &mut bindings),
            Err(HelperError::UnknownParameter(name)) if name == "other"
        ));
    }

    #[test]
    fn test_rewrite_positional() {
        let bindings = Binding::try_from_params(
            &[Parameter::new("b", 1_i32), Parameter::new("a", 2_i32)],
            BindingMode::Advisory,
        )
        .unwrap();
        assert_eq!(
            rewrite_positional(
                "SELECT @a, '@a', @b, @A, @local, @@ROWCOUNT -- @b",
                &bindings
            ),
            "SELECT @P2, '@a', @P1, @P2, @local, @@ROWCOUNT -- @b"
        );
    }
}
