use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::bail;
use relaywatch::action::convert::ConvertContext;
use relaywatch::engine::{Runtime, RuntimeEvent};
use relaywatch::media::{MediaConverter, MediaFormat};
use relaywatch::watch::event::{ChangeKind, RawEvent};
use relaywatch::watch::Debouncer;
use tokio::sync::{mpsc, Semaphore};

type TestResult = Result<(), Box<dyn Error>>;

#[derive(Default)]
struct MockConverter {
    fail: bool,
    calls: Mutex<Vec<PathBuf>>,
}

impl MediaConverter for MockConverter {
    fn convert_media(&self, source: &Path, dest: &Path, _format: MediaFormat) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(source.to_path_buf());
        if self.fail {
            bail!("mock converter failure");
        }
        fs::write(dest, b"fresh")?;
        Ok(())
    }
}

struct Rig {
    integration: tempfile::TempDir,
    publish: tempfile::TempDir,
    converter: Arc<MockConverter>,
}

impl Rig {
    fn new(fail_conversions: bool) -> Self {
        Self {
            integration: tempfile::tempdir().unwrap(),
            publish: tempfile::tempdir().unwrap(),
            converter: Arc::new(MockConverter {
                fail: fail_conversions,
                ..Default::default()
            }),
        }
    }

    fn runtime(
        &self,
        exclusion_marker: Option<String>,
        rx: mpsc::Receiver<RuntimeEvent>,
        tx: mpsc::Sender<RuntimeEvent>,
    ) -> Runtime {
        let convert = ConvertContext {
            publish_root: self.publish.path().to_path_buf(),
            repo_url: None,
            converter: self.converter.clone(),
            vcs: None,
            permits: Arc::new(Semaphore::new(2)),
        };
        Runtime::new(
            self.integration.path().to_path_buf(),
            exclusion_marker,
            convert,
            rx,
            tx,
        )
    }
}

fn event(path: impl Into<PathBuf>, kind: ChangeKind) -> RawEvent {
    RawEvent::new(path, kind).expect("path has a file name")
}

/// A burst of created + changed events for one video file, flowing through
/// the real debouncer and expiry loop, produces exactly one conversion of
/// the first event's path.
#[tokio::test]
async fn avi_burst_converts_exactly_once() -> TestResult {
    let work = tempfile::tempdir()?;
    let clip_dir = work.path().join("a");
    fs::create_dir(&clip_dir)?;
    let clip = clip_dir.join("video.avi");
    fs::write(&clip, b"avi bytes")?;

    let rig = Rig::new(false);
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);

    let debouncer = Debouncer::new(Duration::from_millis(60));
    let _expiry = debouncer.spawn_expiry_loop(tx.clone());

    let runtime = rig.runtime(None, rx, tx.clone());
    let runtime_task = tokio::spawn(runtime.run());

    debouncer.notify(event(&clip, ChangeKind::Created));
    debouncer.notify(event(&clip, ChangeKind::Changed));
    debouncer.notify(event(&clip, ChangeKind::Changed));

    // Let the window elapse and the background conversion finish.
    tokio::time::sleep(Duration::from_millis(500)).await;
    tx.send(RuntimeEvent::ShutdownRequested).await?;
    runtime_task.await??;

    let calls = rig.converter.calls.lock().unwrap().clone();
    assert_eq!(calls, vec![clip.clone()]);
    assert_eq!(fs::read(rig.publish.path().join("video.mp4"))?, b"fresh");

    Ok(())
}

/// A handler failure must not stop the loop: a later event is still served.
#[tokio::test]
async fn runtime_survives_a_failing_conversion() -> TestResult {
    let work = tempfile::tempdir()?;
    let media = work.path().join("media");
    fs::create_dir(&media)?;
    let clip = media.join("broken.avi");
    fs::write(&clip, b"avi bytes")?;
    let note = media.join("notes.txt");
    fs::write(&note, b"remember")?;

    let rig = Rig::new(true);
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let runtime = rig.runtime(None, rx, tx.clone());
    let runtime_task = tokio::spawn(runtime.run());

    tx.send(RuntimeEvent::EntryExpired(event(&clip, ChangeKind::Created)))
        .await?;
    tx.send(RuntimeEvent::EntryExpired(event(&note, ChangeKind::Created)))
        .await?;

    tokio::time::sleep(Duration::from_millis(300)).await;
    tx.send(RuntimeEvent::ShutdownRequested).await?;
    runtime_task.await??;

    // The conversion failed, but the copy after it still happened.
    assert_eq!(rig.converter.calls.lock().unwrap().len(), 1);
    let copied = rig.integration.path().join("media").join("notes.txt");
    assert_eq!(fs::read(&copied)?, b"remember");

    Ok(())
}

/// A path containing the exclusion marker never reaches any handler.
#[tokio::test]
async fn excluded_paths_produce_no_side_effects() -> TestResult {
    let work = tempfile::tempdir()?;
    let skipped = work.path().join("docs_postfix");
    fs::create_dir(&skipped)?;
    let file = skipped.join("readme.txt");
    fs::write(&file, b"ignored")?;

    let rig = Rig::new(false);
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let runtime = rig.runtime(Some("_Postfix".to_string()), rx, tx.clone());
    let runtime_task = tokio::spawn(runtime.run());

    tx.send(RuntimeEvent::EntryExpired(event(&file, ChangeKind::Created)))
        .await?;
    tx.send(RuntimeEvent::EntryExpired(event(&skipped, ChangeKind::Created)))
        .await?;

    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.send(RuntimeEvent::ShutdownRequested).await?;
    runtime_task.await??;

    assert!(rig.converter.calls.lock().unwrap().is_empty());
    assert!(fs::read_dir(rig.integration.path())?.next().is_none());

    Ok(())
}
