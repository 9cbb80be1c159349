//! Unit tests for the git bookkeeping guard.

use super::*;
use crate::test_utils::{ExpectedCall, StubExecutor, exit_status, failure_output, stdout_output};
use rstest::rstest;

const REPO: &str = "/work/prebuilts";

fn dirty() -> ExpectedCall {
    ExpectedCall::new(
        "git",
        &["diff", "--quiet"],
        Ok(Output {
            status: exit_status(1),
            stdout: Vec::new(),
            stderr: Vec::new(),
        }),
    )
}

fn clean_checks() -> Vec<ExpectedCall> {
    vec![
        ExpectedCall::git(&["diff", "--quiet"]),
        ExpectedCall::git(&["diff", "--quiet", "--cached"]),
    ]
}

fn cleanup_calls() -> Vec<ExpectedCall> {
    vec![
        ExpectedCall::git(&["add", "-Af", "."]),
        ExpectedCall::git(&[
            "commit",
            "-m",
            "COMMIT TO REVERT - RESET ME!!!",
            "--allow-empty",
        ]),
        ExpectedCall::git(&["reset", "--hard", "HEAD~1"]),
    ]
}

#[test]
fn clean_tree_reports_no_changes() {
    let executor = StubExecutor::new(clean_checks());
    let vcs = VcsGuard::new(&executor, Utf8Path::new(REPO));

    assert!(!vcs.has_uncommitted_changes().expect("diff"));
    executor.assert_finished();
}

#[test]
fn staged_changes_count_as_dirty() {
    let executor = StubExecutor::new(vec![
        ExpectedCall::git(&["diff", "--quiet"]),
        ExpectedCall::new(
            "git",
            &["diff", "--quiet", "--cached"],
            Ok(failure_output("")),
        ),
    ]);
    let vcs = VcsGuard::new(&executor, Utf8Path::new(REPO));

    assert!(vcs.has_uncommitted_changes().expect("diff"));
    executor.assert_finished();
}

#[test]
fn diff_outside_repository_is_a_git_error() {
    let executor = StubExecutor::new(vec![ExpectedCall::new(
        "git",
        &["diff", "--quiet"],
        Ok(Output {
            status: exit_status(129),
            stdout: Vec::new(),
            stderr: b"warning: Not a git repository\n".to_vec(),
        }),
    )]);
    let vcs = VcsGuard::new(&executor, Utf8Path::new(REPO));

    let err = vcs.ensure_clean(false).expect_err("expected git failure");
    assert!(
        matches!(
            err,
            UpdaterError::Git { operation: "diff", ref message }
                if message.contains("Not a git repository")
        ),
        "got {err:?}"
    );
    executor.assert_finished();
}

#[rstest]
#[case::without_commit_first(false)]
#[case::commit_fails_to_clean(true)]
fn dirty_tree_is_rejected(#[case] commit_first: bool) {
    let mut calls = vec![dirty()];
    if commit_first {
        calls.push(ExpectedCall::git(&["add", "-u"]));
        calls.push(ExpectedCall::git(&["commit", "-m", "save working state"]));
    }
    calls.push(dirty());
    let executor = StubExecutor::new(calls);
    let vcs = VcsGuard::new(&executor, Utf8Path::new(REPO));

    let err = vcs.ensure_clean(commit_first).expect_err("expected dirty tree");
    assert!(matches!(err, UpdaterError::VcsState));
    executor.assert_finished();
}

#[test]
fn commit_first_saves_working_state() {
    let mut calls = vec![
        dirty(),
        ExpectedCall::git(&["add", "-u"]),
        ExpectedCall::git(&["commit", "-m", "save working state"]),
    ];
    calls.extend(clean_checks());
    let executor = StubExecutor::new(calls);
    let vcs = VcsGuard::new(&executor, Utf8Path::new(REPO));

    vcs.ensure_clean(true).expect("clean after commit");
    executor.assert_finished();
}

#[test]
fn commit_update_stages_destination_and_reports_summary() {
    let keys = vec!["androidx.core:core".to_owned(), "com.example:widget".to_owned()];
    let message =
        "Import androidx.core:core\ncom.example:widget from GMaven\n\nupdate-prebuilts -v";
    let executor = StubExecutor::new(vec![
        ExpectedCall::git(&["add", "gmaven"]),
        ExpectedCall::git(&["commit", "-q", "-m", message]),
        ExpectedCall::new(
            "git",
            &["log", "-1", "--oneline"],
            Ok(stdout_output("abc1234 Import androidx.core:core\n")),
        ),
    ]);
    let vcs = VcsGuard::new(&executor, Utf8Path::new(REPO));

    let summary = vcs
        .commit_update(Utf8Path::new("gmaven"), &keys, "update-prebuilts -v")
        .expect("commit");
    assert_eq!(summary, "abc1234 Import androidx.core:core");
    executor.assert_finished();
}

#[test]
fn failed_commit_reports_git_error() {
    let executor = StubExecutor::new(vec![
        ExpectedCall::git(&["add", "gmaven"]),
        ExpectedCall::new(
            "git",
            &["commit", "-q", "-m", "Import a:b from GMaven\n\nx"],
            Ok(failure_output("nothing to commit\n")),
        ),
    ]);
    let vcs = VcsGuard::new(&executor, Utf8Path::new(REPO));

    let err = vcs
        .commit_update(Utf8Path::new("gmaven"), &["a:b".to_owned()], "x")
        .expect_err("expected commit failure");
    assert!(matches!(
        err,
        UpdaterError::Git { operation: "commit", ref message } if message == "nothing to commit"
    ));
}

#[test]
fn cleanup_guard_resets_on_drop() {
    let executor = StubExecutor::new(cleanup_calls());
    let vcs = VcsGuard::new(&executor, Utf8Path::new(REPO));

    {
        let _cleanup = vcs.cleanup_guard();
    }
    executor.assert_finished();
}

#[test]
fn cleanup_guard_stops_at_first_failure() {
    let executor = StubExecutor::new(vec![ExpectedCall::new(
        "git",
        &["add", "-Af", "."],
        Ok(failure_output("index.lock exists")),
    )]);
    let vcs = VcsGuard::new(&executor, Utf8Path::new(REPO));

    drop(vcs.cleanup_guard());
    executor.assert_finished();
}
