//! Shared test utilities for the updater crate.

use crate::error::{Result, UpdaterError};
use crate::exec::CommandExecutor;
use camino::Utf8Path;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
pub fn success_output() -> Output {
    stdout_output("")
}

/// Creates a successful command `Output` with the given stdout text.
pub fn stdout_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The program to execute (e.g., "git").
    pub program: &'static str,
    /// The arguments to pass to the program.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

impl ExpectedCall {
    /// Creates an expectation for `program` with `args`.
    pub fn new(program: &'static str, args: &[&str], result: Result<Output>) -> Self {
        Self {
            program,
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
            result,
        }
    }

    /// Creates an expectation for a `git` invocation that succeeds silently.
    pub fn git(args: &[&str]) -> Self {
        Self::new("git", args, Ok(success_output()))
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations, {} remaining",
            self.expected.borrow().len()
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, program: &str, args: &[&str], _working_dir: Option<&Utf8Path>) -> Result<Output> {
        let Some(call) = self.expected.borrow_mut().pop_front() else {
            return Err(UpdaterError::StubMismatch {
                message: format!("unexpected invocation: {program} {}", args.join(" ")),
            });
        };

        if call.program != program || call.args != args {
            return Err(UpdaterError::StubMismatch {
                message: format!(
                    "expected {} {}, got {program} {}",
                    call.program,
                    call.args.join(" "),
                    args.join(" ")
                ),
            });
        }

        call.result
    }
}

/// Renders a minimal POM declaring the given coordinates.
pub fn pom_xml(group_id: &str, artifact_id: &str, version: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<project>\n  \
         <modelVersion>4.0.0</modelVersion>\n  <groupId>{group_id}</groupId>\n  \
         <artifactId>{artifact_id}</artifactId>\n  <version>{version}</version>\n</project>\n"
    )
}

/// Writes a zip archive containing `entries` to `path`.
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn write_zip(path: &Utf8Path, entries: &[(&str, &[u8])]) {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let file = std::fs::File::create(path).expect("create archive");
    let mut writer = zip::ZipWriter::new(file);
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, SimpleFileOptions::default())
                .expect("add directory");
        } else {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start entry");
            writer.write_all(contents).expect("write entry");
        }
    }
    writer.finish().expect("finish archive");
}

/// Entries of a typical AAR payload.
pub fn sample_aar_entries() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("AndroidManifest.xml", b"<manifest package=\"com.example\"/>".as_slice()),
        ("classes.jar", b"jar".as_slice()),
        ("R.txt", b"int id x 0x1".as_slice()),
        ("public.txt", b"".as_slice()),
        ("annotations.zip", b"zip".as_slice()),
        ("res/values/values.xml", b"<resources/>".as_slice()),
        ("libs/noto-emoji-compat-java.jar", b"jar".as_slice()),
        ("proguard.txt", b"-keep class *".as_slice()),
    ]
}

/// Lays out one artifact version inside a Maven repository.
///
/// Writes `<library>-<version>.pom` and, unless `extension` is `None`, a
/// payload built from `entries`. Returns the version directory.
///
/// # Panics
///
/// Panics if the files cannot be written.
pub fn write_maven_artifact(
    repo: &Utf8Path,
    group_id: &str,
    artifact_id: &str,
    version: &str,
    extension: Option<&str>,
    entries: &[(&str, &[u8])],
) -> camino::Utf8PathBuf {
    let dir = repo
        .join(group_id.replace('.', "/"))
        .join(artifact_id)
        .join(version);
    std::fs::create_dir_all(&dir).expect("create version dir");
    std::fs::write(
        dir.join(format!("{artifact_id}-{version}.pom")),
        pom_xml(group_id, artifact_id, version),
    )
    .expect("write pom");
    if let Some(ext) = extension {
        write_zip(&dir.join(format!("{artifact_id}-{version}.{ext}")), entries);
    }
    dir
}
