//! Collector log discovery and content checks against scratch directories

use itt_harness::assertions::take_failures;
use itt_harness::config::LOG_DIR_ENV;
use itt_harness::{
    check, check_eq, check_log_contains, check_log_matches, check_msg, wait_for_log_content,
    LogVerifier, ScopedEnvVar, TestRegistrar, DEFAULT_WAIT_TIMEOUT,
};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const SAMPLE_LOG: &str = "\
__itt_domain_create: name=org.itt.harness
__itt_task_begin: domain=org.itt.harness name=Worker_7
__itt_task_end: domain=org.itt.harness
";

pub fn register(registrar: &mut TestRegistrar<'_>) {
    registrar
        .test("CollectorLog", "LatestByModificationTime", latest_by_modification_time)
        .test("CollectorLog", "ContentChecks", content_checks)
        .test("CollectorLog", "MissingLogIsReported", missing_log_is_reported)
        .test("CollectorLog", "WaitForDelayedFlush", wait_for_delayed_flush)
        .test("CollectorLog", "ClearRemovesOnlyCollectorLogs", clear_removes_only_collector_logs)
        .test("CollectorLog", "DirectoryFromEnvironment", directory_from_environment);
}

fn scratch_dir() -> Option<TempDir> {
    match tempfile::tempdir() {
        Ok(dir) => Some(dir),
        Err(e) => {
            check_msg!(false, format!("cannot create scratch directory: {}", e));
            None
        }
    }
}

fn write_log(dir: &Path, name: &str, content: &str, modified: SystemTime) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content)?;
    File::options().write(true).open(&path)?.set_modified(modified)?;
    Ok(path)
}

fn latest_by_modification_time() {
    let Some(dir) = scratch_dir() else { return };
    let now = SystemTime::now();
    let older = write_log(
        dir.path(),
        "libittnotify_refcol_200.log",
        "old run",
        now - Duration::from_secs(60),
    );
    let newer = write_log(dir.path(), "libittnotify_refcol_100.log", "new run", now);
    let (Ok(_), Ok(newer)) = (older, newer) else {
        check_msg!(false, "failed to write log fixtures");
        return;
    };

    check_eq!(LogVerifier::new(dir.path()).find_latest_log(), Some(newer));
}

fn content_checks() {
    let Some(dir) = scratch_dir() else { return };
    if let Err(e) = write_log(dir.path(), "libittnotify_refcol_1.log", SAMPLE_LOG, SystemTime::now()) {
        check_msg!(false, format!("failed to write log fixture: {}", e));
        return;
    }
    let verifier = LogVerifier::new(dir.path());

    check_log_contains!(verifier, "org.itt.harness");
    check_log_matches!(verifier, r"name=Worker_\d+");

    let content = verifier
        .find_latest_log()
        .map(|path| verifier.read_log(&path))
        .unwrap_or_default();
    check_eq!(LogVerifier::count_occurrences(&content, "__itt_task_"), 2);
    check_eq!(
        LogVerifier::matching_lines(&content, "task_begin"),
        vec!["__itt_task_begin: domain=org.itt.harness name=Worker_7".to_string()]
    );
}

fn missing_log_is_reported() {
    let Some(dir) = scratch_dir() else { return };
    let verifier = LogVerifier::new(dir.path());

    check_log_contains!(verifier, "anything");
    let recorded = take_failures();

    check_eq!(recorded.len(), 1);
    check!(recorded.first().is_some_and(|m| m.ends_with("Log file not found")));
}

fn wait_for_delayed_flush() {
    let Some(dir) = scratch_dir() else { return };
    let verifier = LogVerifier::new(dir.path());
    let path = dir.path().join("libittnotify_refcol_42.log");

    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        fs::write(path, "__itt_frame_end: flushed\n")
    });

    check!(wait_for_log_content(&verifier, "flushed", DEFAULT_WAIT_TIMEOUT));
    check!(matches!(writer.join(), Ok(Ok(()))));
}

fn clear_removes_only_collector_logs() {
    let Some(dir) = scratch_dir() else { return };
    let now = SystemTime::now();
    let unrelated = dir.path().join("notes.txt");
    let written = write_log(dir.path(), "libittnotify_refcol_1.log", "a", now)
        .and_then(|_| write_log(dir.path(), "run_libittnotify_refcol_2.log", "b", now))
        .and_then(|_| fs::write(&unrelated, "keep me"));
    if let Err(e) = written {
        check_msg!(false, format!("failed to write fixtures: {}", e));
        return;
    }

    let verifier = LogVerifier::new(dir.path());
    check!(verifier.clear_logs().is_ok());
    check!(verifier.find_latest_log().is_none());
    check!(unrelated.exists());
}

fn directory_from_environment() {
    let Some(dir) = scratch_dir() else { return };
    let _guard = ScopedEnvVar::set(LOG_DIR_ENV, &dir.path().to_string_lossy());

    check_eq!(LogVerifier::from_env().log_dir(), dir.path());
}
