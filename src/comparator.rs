//! Output comparison for judged test cases
//!
//! Pure functions: no knowledge of tasks, teams or processes. Test fixtures
//! store line breaks as the literal two-character sequence `\n`, so both
//! sides must be unescaped before anything is compared.

/// How the actual output relates to the expected output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMatch {
    /// Byte-for-byte equal, allowing one trailing line terminator on the
    /// actual side
    Exact,
    /// Same content once all whitespace is removed from both sides
    PresentationMismatch,
    /// Different content
    Mismatch,
}

/// Unescape a stored test fixture: literal `\n` becomes a line break
pub fn unescape_fixture(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Escape text back into the fixture convention, for regenerating fixtures
#[allow(dead_code)]
pub fn escape_fixture(text: &str) -> String {
    text.replace('\n', "\\n")
}

/// Compare actual program output against the (unescaped) expected output
pub fn compare_output(actual: &str, expected: &str) -> OutputMatch {
    if strip_one_terminator(actual) == expected {
        return OutputMatch::Exact;
    }

    if remove_whitespace(actual) == remove_whitespace(expected) {
        return OutputMatch::PresentationMismatch;
    }

    OutputMatch::Mismatch
}

/// Strip at most one trailing line terminator; interpreters print a final
/// newline the fixtures do not carry
fn strip_one_terminator(s: &str) -> &str {
    s.strip_suffix("\r\n")
        .or_else(|| s.strip_suffix('\n'))
        .unwrap_or(s)
}

fn remove_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
