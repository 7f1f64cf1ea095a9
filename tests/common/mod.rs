#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use flowdeploy::config::Settings;
pub use flowdeploy_test_utils::builders::SettingsBuilder;
pub use flowdeploy_test_utils::fake_cluster::FakeCluster;
pub use flowdeploy_test_utils::{init_tracing, with_timeout};

/// A throwaway project directory with a deployment manifest in it.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("prefect.yaml"),
            "deployments:\n  - name: default\n    entrypoint: flows/do_flow.py:do_flow\n",
        )
        .expect("write manifest");
        Self { dir }
    }

    /// A project whose manifest was never written.
    pub fn without_manifest() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn settings(&self) -> Settings {
        SettingsBuilder::new(self.root()).build()
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, contents).expect("write file");
    }
}
