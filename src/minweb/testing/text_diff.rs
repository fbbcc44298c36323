//! Line-by-line text comparison
//!
//! Tangled code and trace output are compared as whole strings; on a mismatch these helpers
//! say which lines differ rather than dumping two long strings side by side.

/// Describe the differing lines of `expected` and `actual`, or `None` if they are equal.
pub fn diff_text(expected: &str, actual: &str) -> Option<String> {
    if expected == actual {
        return None;
    }
    let expected_lines: Vec<&str> = expected.split('\n').collect();
    let actual_lines: Vec<&str> = actual.split('\n').collect();
    let mut report = Vec::new();
    for i in 0..expected_lines.len().max(actual_lines.len()) {
        match (expected_lines.get(i), actual_lines.get(i)) {
            (Some(exp), Some(act)) if exp == act => {}
            (Some(exp), Some(act)) => {
                report.push(format!("line {}: expected {:?}", i + 1, exp));
                report.push(format!("line {}:   actual {:?}", i + 1, act));
            }
            (Some(exp), None) => report.push(format!("line {}: missing {:?}", i + 1, exp)),
            (None, Some(act)) => report.push(format!("line {}: extra {:?}", i + 1, act)),
            (None, None) => {}
        }
    }
    Some(format!(
        "texts differ ({} expected lines, {} actual lines)\n{}",
        expected_lines.len(),
        actual_lines.len(),
        report.join("\n")
    ))
}

/// Assert that two strings are equal, reporting differing lines on failure.
///
/// Lines are split on `\n` only, so a difference in trailing newlines shows up as a
/// missing or extra empty line.
pub fn assert_text_eq(expected: &str, actual: &str) {
    if let Some(report) = diff_text(expected, actual) {
        panic!("{}", report);
    }
}
