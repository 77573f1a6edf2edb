//! The `{%N}` micro-grammar: detection ([`is_formattable`]) and expansion
//! ([`format_string`]) of positional-argument specifiers embedded in
//! catalog messages.
//!
//! All strings here are UTF-8 `str`/`String`. The grammar is pure ASCII
//! (`{`, `%`, `0`-`9`, `}`), so scanning the raw bytes is equivalent to
//! scanning wide characters one-by-one: no ASCII byte value can occur as a
//! continuation byte of a multi-byte UTF-8 sequence.

use crate::error::CodecError;

/// A positional argument list, borrowed from the caller.
#[derive(Debug, Default, Clone)]
pub struct FormatArgs<'a> {
    args: Vec<&'a str>,
}

impl<'a> FormatArgs<'a> {
    pub fn new() -> Self {
        Self { args: Vec::new() }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.args.reserve(additional);
    }

    pub fn append(&mut self, arg: &'a str) {
        self.args.push(arg);
    }

    pub fn count(&self) -> usize {
        self.args.len()
    }

    pub fn get(&self, idx: usize) -> Result<&'a str, CodecError> {
        self.args
            .get(idx)
            .copied()
            .ok_or(CodecError::ResourceOverrun {
                idx,
                count: self.args.len(),
            })
    }

    fn total_len(&self) -> usize {
        self.args.iter().map(|a| a.len()).sum()
    }
}

impl<'a> FromIterator<&'a str> for FormatArgs<'a> {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        Self {
            args: iter.into_iter().collect(),
        }
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for FormatArgs<'a> {
    fn from(value: [&'a str; N]) -> Self {
        Self {
            args: value.to_vec(),
        }
    }
}

impl<'a> From<&'a [String]> for FormatArgs<'a> {
    fn from(value: &'a [String]) -> Self {
        Self {
            args: value.iter().map(String::as_str).collect(),
        }
    }
}

struct FmtSpec {
    /// Byte offset of the opening `{`.
    offset: usize,
    /// Total byte length of the specifier, including `{%` and `}`.
    len: usize,
    idx: usize,
}

/// Finds the next valid specifier starting the search at `cursor`.
///
/// Candidates that fail validation (non-digit/non-`}` byte, a fourth digit,
/// or zero digits collected) are skipped *without rewinding*: the next `{%`
/// search resumes right after the failed candidate's opening `{%`, not at
/// the byte that broke validation. This lets a malformed specifier "hide" a
/// following valid one, e.g. `{%{%0}` is formattable.
fn scan_next_spec(bytes: &[u8], mut cursor: usize) -> Option<FmtSpec> {
    loop {
        let open = find_open_brace_percent(bytes, cursor)?;
        let after_open = open + 2;
        cursor = after_open;

        let mut i = after_open;
        let mut ndigits = 0usize;
        let mut value: usize = 0;
        while i < bytes.len() && bytes[i].is_ascii_digit() && ndigits < 3 {
            value = value * 10 + (bytes[i] - b'0') as usize;
            ndigits += 1;
            i += 1;
        }

        if ndigits == 0 {
            continue; // no digits collected, e.g. "{%}" or "{%x"
        }

        if i < bytes.len() && bytes[i] == b'}' {
            return Some(FmtSpec {
                offset: open,
                len: (i + 1) - open,
                idx: value,
            });
        }
        // either a fourth digit, or a non-digit/non-'}' byte: invalid candidate
    }
}

fn find_open_brace_percent(bytes: &[u8], from: usize) -> Option<usize> {
    if from + 2 > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(2)
        .position(|w| w == b"{%")
        .map(|p| p + from)
}

/// Finds the next valid specifier starting the search at `cursor`, but
/// unlike [`scan_next_spec`] does not retry past a failed candidate: the
/// first `{%` found that does not validate into a full specifier ends the
/// search entirely. `format_string` uses this finder, not `scan_next_spec`,
/// so a malformed specifier causes everything after it to be copied
/// verbatim even if a valid specifier appears later.
fn find_single_spec(bytes: &[u8], cursor: usize) -> Option<FmtSpec> {
    let open = find_open_brace_percent(bytes, cursor)?;
    let after_open = open + 2;

    let mut i = after_open;
    let mut ndigits = 0usize;
    let mut value: usize = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() && ndigits < 3 {
        value = value * 10 + (bytes[i] - b'0') as usize;
        ndigits += 1;
        i += 1;
    }

    if ndigits == 0 {
        return None; // no digits collected, e.g. "{%}" or "{%x"
    }

    if i < bytes.len() && bytes[i] == b'}' {
        return Some(FmtSpec {
            offset: open,
            len: (i + 1) - open,
            idx: value,
        });
    }
    // either a fourth digit, or a non-digit/non-'}' byte: invalid candidate
    None
}

/// Returns true iff `s` contains at least one valid `{%N}` specifier.
pub fn is_formattable(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    scan_next_spec(s.as_bytes(), 0).is_some()
}

/// Expands every valid specifier in `s` with the corresponding positional
/// argument.
///
/// Returns an empty string if `s` is empty, or if any valid specifier
/// references an argument index that is not supplied (no partial output is
/// surfaced in that case).
///
/// Unlike `is_formattable`, this does not retry past a failed candidate: the
/// first `{%` that fails to validate into a full specifier ends the search,
/// and everything from there to the end of `s` is copied through as
/// literal text, even if a valid specifier appears later. So `"{%z}{%0}"`
/// with one argument comes back unchanged, not with `{%0}` substituted,
/// despite `is_formattable("{%z}{%0}")` being `true`.
pub fn format_string(s: &str, args: &FormatArgs<'_>) -> String {
    if s.is_empty() {
        return String::new();
    }

    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len() + args.total_len());
    let mut cursor = 0usize;

    loop {
        match find_single_spec(bytes, cursor) {
            None => {
                out.push_str(&s[cursor..]);
                break;
            }
            Some(spec) => {
                let Ok(arg) = args.get(spec.idx) else {
                    return String::new();
                };
                out.push_str(&s[cursor..spec.offset]);
                out.push_str(arg);
                cursor = spec.offset + spec.len;
            }
        }
    }

    out
}
