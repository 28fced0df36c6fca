use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::bail;
use relaywatch::action::convert::{schedule_conversion, ConvertContext, ConvertOutcome};
use relaywatch::engine::RuntimeEvent;
use relaywatch::media::{MediaConverter, MediaFormat};
use relaywatch::vcs::{VcsClient, VcsError};
use tokio::sync::{mpsc, Semaphore};

type TestResult = Result<(), Box<dyn Error>>;

/// Converter that writes a marker file, or fails on demand. Records each
/// source it was asked to convert and whether the destination already
/// existed when it ran.
#[derive(Default)]
struct MockConverter {
    fail: bool,
    calls: Mutex<Vec<PathBuf>>,
    dest_existed: Mutex<Vec<bool>>,
}

impl MediaConverter for MockConverter {
    fn convert_media(&self, source: &Path, dest: &Path, _format: MediaFormat) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(source.to_path_buf());
        self.dest_existed.lock().unwrap().push(dest.exists());
        if self.fail {
            bail!("mock converter failure");
        }
        fs::write(dest, b"fresh")?;
        Ok(())
    }
}

/// Vcs client that records the order of operations and can fail add/commit.
#[derive(Default)]
struct MockVcs {
    fail_add: bool,
    fail_commit: bool,
    calls: Mutex<Vec<String>>,
}

impl MockVcs {
    fn record(&self, op: &str) {
        self.calls.lock().unwrap().push(op.to_string());
    }
}

impl VcsClient for MockVcs {
    fn is_working_copy(&self, _path: &Path) -> bool {
        self.record("is_working_copy");
        true
    }

    fn check_out(&self, _url: &str, _path: &Path) -> Result<bool, VcsError> {
        self.record("check_out");
        Ok(true)
    }

    fn add(&self, path: &Path) -> Result<bool, VcsError> {
        self.record("add");
        if self.fail_add {
            return Err(VcsError::new(155007, path, "not a working copy"));
        }
        Ok(true)
    }

    fn commit(&self, path: &Path) -> Result<bool, VcsError> {
        self.record("commit");
        if self.fail_commit {
            return Err(VcsError::new(165001, path, "commit blocked by hook"));
        }
        Ok(true)
    }

    fn delete(&self, _path: &Path) -> Result<bool, VcsError> {
        self.record("delete");
        Ok(true)
    }
}

struct Fixture {
    _work: tempfile::TempDir,
    _publish: tempfile::TempDir,
    source: PathBuf,
    publish_root: PathBuf,
    converter: Arc<MockConverter>,
    vcs: Option<Arc<MockVcs>>,
}

fn fixture(converter: MockConverter, vcs: Option<MockVcs>) -> Fixture {
    let work = tempfile::tempdir().unwrap();
    let publish = tempfile::tempdir().unwrap();

    let source = work.path().join("clip.avi");
    fs::write(&source, b"avi bytes").unwrap();

    Fixture {
        source,
        publish_root: publish.path().to_path_buf(),
        converter: Arc::new(converter),
        vcs: vcs.map(Arc::new),
        _work: work,
        _publish: publish,
    }
}

fn context(fx: &Fixture) -> ConvertContext {
    ConvertContext {
        publish_root: fx.publish_root.clone(),
        repo_url: None,
        converter: fx.converter.clone(),
        vcs: fx.vcs.clone().map(|v| v as Arc<dyn VcsClient>),
        permits: Arc::new(Semaphore::new(2)),
    }
}

async fn run_and_wait(fx: &Fixture) -> Result<(PathBuf, ConvertOutcome), Box<dyn Error>> {
    let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(8);
    let dest = schedule_conversion(&context(fx), fx.source.clone(), tx)?;

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await?
        .expect("conversion reports a terminal state");

    match event {
        RuntimeEvent::ConversionFinished { source, outcome } => {
            assert_eq!(source, fx.source);
            Ok((dest, outcome))
        }
        other => panic!("unexpected runtime event: {other:?}"),
    }
}

#[tokio::test]
async fn output_lands_next_to_publish_root_with_mp4_extension() -> TestResult {
    let fx = fixture(MockConverter::default(), None);

    let (dest, outcome) = run_and_wait(&fx).await?;
    assert_eq!(dest, fx.publish_root.join("clip.mp4"));
    assert_eq!(outcome, ConvertOutcome::Converted);
    assert_eq!(fs::read(&dest)?, b"fresh");

    Ok(())
}

#[tokio::test]
async fn stale_output_is_deleted_before_the_converter_runs() -> TestResult {
    let fx = fixture(MockConverter::default(), None);
    fs::write(fx.publish_root.join("clip.mp4"), b"stale")?;

    let (dest, outcome) = run_and_wait(&fx).await?;
    assert_eq!(outcome, ConvertOutcome::Converted);
    assert_eq!(fs::read(&dest)?, b"fresh");
    // The converter never saw the stale file.
    assert_eq!(fx.converter.dest_existed.lock().unwrap().as_slice(), &[false]);

    Ok(())
}

#[tokio::test]
async fn successful_publish_runs_add_then_commit() -> TestResult {
    let fx = fixture(MockConverter::default(), Some(MockVcs::default()));

    let (_, outcome) = run_and_wait(&fx).await?;
    assert_eq!(outcome, ConvertOutcome::Committed);

    let calls = fx.vcs.as_ref().unwrap().calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["is_working_copy", "add", "commit"]);

    Ok(())
}

#[tokio::test]
async fn add_failure_suppresses_commit() -> TestResult {
    let vcs = MockVcs {
        fail_add: true,
        ..Default::default()
    };
    let fx = fixture(MockConverter::default(), Some(vcs));

    let (_, outcome) = run_and_wait(&fx).await?;
    assert_eq!(outcome, ConvertOutcome::AddFailed);

    let calls = fx.vcs.as_ref().unwrap().calls.lock().unwrap().clone();
    assert!(!calls.contains(&"commit".to_string()), "commit must not run: {calls:?}");

    Ok(())
}

#[tokio::test]
async fn commit_failure_is_terminal_without_rollback() -> TestResult {
    let vcs = MockVcs {
        fail_commit: true,
        ..Default::default()
    };
    let fx = fixture(MockConverter::default(), Some(vcs));

    let (dest, outcome) = run_and_wait(&fx).await?;
    assert_eq!(outcome, ConvertOutcome::CommitFailed);
    // The converted output and the add are left in place.
    assert_eq!(fs::read(&dest)?, b"fresh");

    Ok(())
}

#[tokio::test]
async fn converter_failure_skips_publishing_entirely() -> TestResult {
    let converter = MockConverter {
        fail: true,
        ..Default::default()
    };
    let fx = fixture(converter, Some(MockVcs::default()));

    let (_, outcome) = run_and_wait(&fx).await?;
    assert_eq!(outcome, ConvertOutcome::ConvertFailed);
    assert!(fx.vcs.as_ref().unwrap().calls.lock().unwrap().is_empty());

    Ok(())
}
