//! Filesystem store for flow runs and the artifacts they produce.
//!
//! Layout: `<root>/<flow>/<run_id>/run.json` holds the [`RunRecord`],
//! `artifacts.json` the flow output and `card.md` an optional report.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const RUN_FILE: &str = "run.json";
const ARTIFACTS_FILE: &str = "artifacts.json";
const CARD_FILE: &str = "card.md";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    pub flow: String,
    pub run_id: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct RunStore {
    root: PathBuf,
}

impl RunStore {
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create run store {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_dir(&self, flow: &str, run_id: &str) -> PathBuf {
        self.root.join(flow).join(run_id)
    }

    pub fn start_run(
        &self,
        flow: &str,
        parameters: BTreeMap<String, String>,
    ) -> anyhow::Result<RunHandle> {
        validate_segment("flow", flow)?;
        let record = RunRecord {
            flow: flow.to_string(),
            run_id: uuid::Uuid::new_v4().to_string(),
            status: RunStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            parameters,
        };
        let dir = self.run_dir(flow, &record.run_id);
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
        write_json(&dir.join(RUN_FILE), &record)?;
        tracing::debug!(flow = %flow, run_id = %record.run_id, "run started");
        Ok(RunHandle { record, dir })
    }

    /// Runs of `flow`, newest first. Unreadable run records are skipped.
    pub fn list_runs(&self, flow: &str) -> anyhow::Result<Vec<RunRecord>> {
        validate_segment("flow", flow)?;
        let flow_dir = self.root.join(flow);
        let entries = match fs::read_dir(&flow_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to list {}", flow_dir.display()))
            }
        };
        let mut runs = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, flow = %flow, "failed to read run directory");
                    continue;
                }
            };
            let path = entry.path().join(RUN_FILE);
            if !path.is_file() {
                continue;
            }
            match read_json::<RunRecord>(&path) {
                Ok(record) => runs.push(record),
                Err(err) => {
                    tracing::warn!(error = %err, path = %path.display(), "failed to read run record");
                }
            }
        }
        runs.sort_by(|a, b| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| b.finished_at.cmp(&a.finished_at))
        });
        Ok(runs)
    }

    pub fn latest_successful_run(&self, flow: &str) -> anyhow::Result<Option<RunRecord>> {
        let runs = self.list_runs(flow)?;
        Ok(runs.into_iter().find(|run| {
            run.status == RunStatus::Succeeded
                && self.run_dir(&run.flow, &run.run_id).join(ARTIFACTS_FILE).is_file()
        }))
    }

    pub fn load_artifacts<T: DeserializeOwned>(&self, flow: &str, run_id: &str) -> anyhow::Result<T> {
        validate_segment("flow", flow)?;
        validate_segment("run_id", run_id)?;
        read_json(&self.run_dir(flow, run_id).join(ARTIFACTS_FILE))
    }

    pub fn load_card(&self, flow: &str, run_id: &str) -> anyhow::Result<Option<String>> {
        validate_segment("flow", flow)?;
        validate_segment("run_id", run_id)?;
        let path = self.run_dir(flow, run_id).join(CARD_FILE);
        match fs::read_to_string(&path) {
            Ok(card) => Ok(Some(card)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }
}

/// An in-progress run. Dropping it without [`RunHandle::finish`] leaves the
/// run marked `running`, which readers treat as unusable.
#[derive(Debug)]
pub struct RunHandle {
    record: RunRecord,
    dir: PathBuf,
}

impl RunHandle {
    pub fn run_id(&self) -> &str {
        &self.record.run_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_artifacts<T: Serialize>(&self, artifacts: &T) -> anyhow::Result<()> {
        write_json(&self.dir.join(ARTIFACTS_FILE), artifacts)
    }

    pub fn save_card(&self, markdown: &str) -> anyhow::Result<()> {
        let path = self.dir.join(CARD_FILE);
        fs::write(&path, markdown).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn finish(mut self, status: RunStatus) -> anyhow::Result<RunRecord> {
        if status == RunStatus::Running {
            anyhow::bail!("cannot finish run {} as running", self.record.run_id);
        }
        self.record.status = status;
        self.record.finished_at = Some(Utc::now());
        write_json(&self.dir.join(RUN_FILE), &self.record)?;
        tracing::debug!(
            flow = %self.record.flow,
            run_id = %self.record.run_id,
            status = ?status,
            "run finished"
        );
        Ok(self.record)
    }
}

fn validate_segment(label: &str, value: &str) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{label} cannot be empty");
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        anyhow::bail!("{label} {value:?} is not a valid path segment");
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let payload = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        value: u32,
    }

    fn store() -> (tempfile::TempDir, RunStore) {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let store = RunStore::open(dir.path().join("runs")).expect("open");
        (dir, store)
    }

    fn finished_run(store: &RunStore, value: u32, status: RunStatus) -> RunRecord {
        let run = store.start_run("DemoFlow", BTreeMap::new()).expect("start");
        run.save_artifacts(&Payload { value }).expect("save");
        run.finish(status).expect("finish")
    }

    #[test]
    fn missing_flow_has_no_runs() {
        let (_dir, store) = store();
        assert!(store.list_runs("DemoFlow").expect("list").is_empty());
        assert!(store.latest_successful_run("DemoFlow").expect("latest").is_none());
    }

    #[test]
    fn latest_successful_run_skips_failed_and_running() {
        let (_dir, store) = store();
        let good = finished_run(&store, 1, RunStatus::Succeeded);
        finished_run(&store, 2, RunStatus::Failed);
        let running = store.start_run("DemoFlow", BTreeMap::new()).expect("start");
        running.save_artifacts(&Payload { value: 3 }).expect("save");

        let latest = store
            .latest_successful_run("DemoFlow")
            .expect("latest")
            .expect("some run");
        assert_eq!(latest.run_id, good.run_id);
        let payload: Payload = store
            .load_artifacts("DemoFlow", &latest.run_id)
            .expect("load");
        assert_eq!(payload, Payload { value: 1 });
    }

    #[test]
    fn newest_successful_run_wins() {
        let (_dir, store) = store();
        finished_run(&store, 1, RunStatus::Succeeded);
        let newer = finished_run(&store, 2, RunStatus::Succeeded);
        let latest = store
            .latest_successful_run("DemoFlow")
            .expect("latest")
            .expect("some run");
        assert_eq!(latest.run_id, newer.run_id);
        assert_eq!(store.list_runs("DemoFlow").expect("list").len(), 2);
    }

    #[test]
    fn succeeded_run_without_artifacts_is_ignored() {
        let (_dir, store) = store();
        let run = store.start_run("DemoFlow", BTreeMap::new()).expect("start");
        run.finish(RunStatus::Succeeded).expect("finish");
        assert!(store.latest_successful_run("DemoFlow").expect("latest").is_none());
    }

    #[test]
    fn corrupt_run_record_is_skipped() {
        let (_dir, store) = store();
        let good = finished_run(&store, 1, RunStatus::Succeeded);
        let broken = store.root().join("DemoFlow").join("broken");
        fs::create_dir_all(&broken).expect("mkdir");
        fs::write(broken.join(RUN_FILE), "{not json").expect("write");
        let runs = store.list_runs("DemoFlow").expect("list");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].run_id, good.run_id);
    }

    #[test]
    fn card_round_trips_and_finish_stamps_time() {
        let (_dir, store) = store();
        let run = store
            .start_run("DemoFlow", BTreeMap::from([("region".to_string(), "1,2,3".to_string())]))
            .expect("start");
        run.save_card("# Results").expect("card");
        let record = run.finish(RunStatus::Succeeded).expect("finish");
        assert!(record.finished_at.is_some());
        assert_eq!(record.parameters["region"], "1,2,3");
        assert_eq!(
            store.load_card("DemoFlow", &record.run_id).expect("card"),
            Some("# Results".to_string())
        );
    }

    #[test]
    fn rejects_path_like_names() {
        let (_dir, store) = store();
        assert!(store.start_run("../escape", BTreeMap::new()).is_err());
        assert!(store.list_runs("").is_err());
        assert!(store.load_artifacts::<Payload>("DemoFlow", "..").is_err());
    }
}
