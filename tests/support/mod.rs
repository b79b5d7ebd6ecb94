use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use taskboard::comment::CommentRecord;
use taskboard::local::seed_demo_data;
use tempfile::TempDir;

pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Fresh temp directory with seeded demo data (organization "acme").
    pub fn seeded() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        seed_demo_data(dir.path()).expect("failed to seed demo data");
        Self { dir }
    }

    /// Fresh temp directory with no data files at all.
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join(".taskboard.toml");
        fs::write(&path, contents).expect("failed to write config");
        path
    }

    /// Command builder pointed at this workspace's data directory, with
    /// environment selection cleared so host variables cannot leak in.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskboard").expect("binary");
        cmd.current_dir(self.dir.path());
        cmd.env_remove("TASKBOARD_ORG");
        cmd.env_remove("TASKBOARD_DATA_DIR");
        cmd.arg("--data-dir").arg(self.dir.path());
        cmd
    }

    pub fn read_comments(&self) -> Vec<CommentRecord> {
        let path = self.dir.path().join("comments.jsonl");
        if !path.exists() {
            return Vec::new();
        }
        let contents = fs::read_to_string(&path).expect("failed to read comments");
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).expect("comment line parses"))
            .collect()
    }
}
