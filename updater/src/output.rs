//! User-facing messages written to stderr.

use std::fmt::Display;
use std::io::Write;

/// Reminder printed after a successful commit.
pub const TEST_REMINDER: &str = "Remember to test this change before uploading it for review!";

/// Write a line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// Report the commit created for an update.
pub fn report_commit(stderr: &mut dyn Write, summary: &str) {
    write_stderr_line(stderr, "Created commit:");
    write_stderr_line(stderr, summary);
    write_stderr_line(stderr, TEST_REMINDER);
}
