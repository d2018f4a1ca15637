use std::borrow::Cow;

/// Target placeholder style for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQLite-style placeholders like `?1`.
    Sqlite,
}

/// Rewrite placeholders for `target`.
///
/// Toward `Postgres`, a bare `?` becomes `$1`, `$2`, ... by position and `?N`
/// becomes `$N`. Toward `Sqlite`, `$N` becomes `?N`. Quoted strings, comments
/// and dollar-quoted blocks are left untouched.
///
/// Warning: Postgres JSONB operators spelled `?`, `?|` and `?&` look like
/// placeholders; disable translation for statements that use them.
///
/// Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn translate_placeholders<'a>(
    sql: &'a str,
    target: PlaceholderStyle,
    enabled: bool,
) -> Cow<'a, str> {
    if !enabled {
        return Cow::Borrowed(sql);
    }

    let bytes = sql.as_bytes();
    let regions = classify(bytes);
    let mut out: Option<String> = None;
    // everything in sql[..copied] is already in `out`
    let mut copied = 0;
    let mut positional = 0usize;
    let mut idx = 0;

    while idx < bytes.len() {
        if regions[idx] != Region::Code {
            idx += 1;
            continue;
        }
        match (bytes[idx], target) {
            (b'$', PlaceholderStyle::Sqlite) => {
                if let Some((digits_end, digits)) = scan_digits(bytes, idx + 1) {
                    let buf = out.get_or_insert_with(String::new);
                    buf.push_str(&sql[copied..idx]);
                    buf.push('?');
                    buf.push_str(digits);
                    copied = digits_end;
                    idx = digits_end;
                    continue;
                }
            }
            (b'?', PlaceholderStyle::Postgres) => {
                let buf = out.get_or_insert_with(String::new);
                buf.push_str(&sql[copied..idx]);
                buf.push('$');
                if let Some((digits_end, digits)) = scan_digits(bytes, idx + 1) {
                    buf.push_str(digits);
                    copied = digits_end;
                    idx = digits_end;
                    continue;
                }
                positional += 1;
                buf.push_str(&positional.to_string());
                copied = idx + 1;
            }
            _ => {}
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

/// Number of `?` placeholders outside quotes, comments and dollar-quoted blocks.
#[must_use]
pub fn count_placeholders(sql: &str) -> usize {
    let bytes = sql.as_bytes();
    classify(bytes)
        .iter()
        .zip(bytes)
        .filter(|(region, b)| **region == Region::Code && **b == b'?')
        .count()
}

/// `true` if `keyword` appears as a whole word in the SQL itself, not inside a
/// literal, quoted identifier or comment. Case-insensitive.
#[must_use]
pub fn contains_keyword(sql: &str, keyword: &str) -> bool {
    let bytes = sql.as_bytes();
    let regions = classify(bytes);
    let is_word = |i: usize| {
        regions[i] == Region::Code && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_')
    };

    let mut idx = 0;
    while idx < bytes.len() {
        if !is_word(idx) {
            idx += 1;
            continue;
        }
        let start = idx;
        while idx < bytes.len() && is_word(idx) {
            idx += 1;
        }
        if bytes[start..idx].eq_ignore_ascii_case(keyword.as_bytes()) {
            return true;
        }
    }
    false
}

/// `sql` without trailing whitespace, semicolons and comments, so a clause can
/// be appended after the last real token.
#[must_use]
pub fn trim_statement_end(sql: &str) -> &str {
    let bytes = sql.as_bytes();
    let regions = classify(bytes);
    let end = (0..bytes.len())
        .rev()
        .find(|&i| match regions[i] {
            Region::Comment => false,
            Region::Quoted => true,
            Region::Code => !(bytes[i].is_ascii_whitespace() || bytes[i] == b';'),
        })
        .map_or(0, |i| i + 1);
    // region boundaries only fall on ASCII bytes, so `end` is a char boundary
    sql.get(..end).unwrap_or(sql)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Code,
    Quoted,
    Comment,
}

#[derive(Clone)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

/// Tag every byte of `bytes` with the lexical region it belongs to.
fn classify(bytes: &[u8]) -> Vec<Region> {
    let mut regions = vec![Region::Code; bytes.len()];
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        let next = bytes.get(idx + 1).copied();
        match state {
            State::Normal => match b {
                b'\'' => {
                    regions[idx] = Region::Quoted;
                    state = State::SingleQuoted;
                }
                b'"' => {
                    regions[idx] = Region::Quoted;
                    state = State::DoubleQuoted;
                }
                b'-' if next == Some(b'-') => {
                    regions[idx..=idx + 1].fill(Region::Comment);
                    state = State::LineComment;
                    idx += 1;
                }
                b'/' if next == Some(b'*') => {
                    regions[idx..=idx + 1].fill(Region::Comment);
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' => {
                    if let Some((tag, tag_end)) = try_start_dollar_quote(bytes, idx) {
                        regions[idx..=tag_end].fill(Region::Quoted);
                        state = State::DollarQuoted(tag);
                        idx = tag_end;
                    }
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted => {
                let quote = if matches!(state, State::SingleQuoted) {
                    b'\''
                } else {
                    b'"'
                };
                regions[idx] = Region::Quoted;
                if b == quote {
                    if next == Some(quote) {
                        // escaped quote
                        regions[idx + 1] = Region::Quoted;
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                } else {
                    regions[idx] = Region::Comment;
                }
            }
            State::BlockComment(depth) => {
                regions[idx] = Region::Comment;
                if b == b'/' && next == Some(b'*') {
                    regions[idx + 1] = Region::Comment;
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if b == b'*' && next == Some(b'/') {
                    regions[idx + 1] = Region::Comment;
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                regions[idx] = Region::Quoted;
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    let tag_end = idx + tag.len() + 1;
                    regions[idx..=tag_end].fill(Region::Quoted);
                    idx = tag_end;
                    state = State::Normal;
                }
            }
        }

        idx += 1;
    }

    regions
}

fn scan_digits(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == start {
        None
    } else {
        std::str::from_utf8(&bytes[start..idx])
            .ok()
            .map(|digits| (idx, digits))
    }
}

fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }

    if idx < bytes.len() && bytes[idx] == b'$' {
        let tag = String::from_utf8(bytes[start + 1..idx].to_vec()).ok()?;
        Some((tag, idx))
    } else {
        None
    }
}

fn matches_tag(bytes: &[u8], idx: usize, tag: &str) -> bool {
    let end = idx + 1 + tag.len();
    end < bytes.len()
        && bytes[idx + 1..=end].starts_with(tag.as_bytes())
        && bytes.get(end) == Some(&b'$')
}
