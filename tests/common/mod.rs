// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed workspace holding a source tree
// under `files/` and a destination under `dest/`, plus a fluent builder so
// each integration test can set up an isolated run without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use template_tree::cli::{ApplyOpts, GlobalOpts};
use template_tree::commands::apply;
use template_tree::logging::BufferedLog;
use template_tree::tree::Outcome;

/// An isolated workspace backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory containing `files/` and `dest/`.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create an empty workspace with `files/` and `dest/` directories.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("files")).expect("create files dir");
        std::fs::create_dir_all(root.path().join("dest")).expect("create dest dir");
        Self { root }
    }

    /// Workspace root; relative sources resolve against it.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Destination root.
    pub fn dest(&self) -> PathBuf {
        self.root.path().join("dest")
    }

    /// Apply options targeting `dest/` with the given source roots.
    pub fn opts(&self, sources: &[&str]) -> ApplyOpts {
        ApplyOpts {
            src: sources.iter().map(ToString::to_string).collect(),
            dest: Some(self.dest().to_string_lossy().into_owned()),
            base_dir: Some(self.root.path().to_path_buf()),
            ..ApplyOpts::default()
        }
    }

    /// Run the apply command, returning the outcome and the captured log.
    pub fn apply(&self, opts: &ApplyOpts) -> (Outcome, Arc<BufferedLog>) {
        let (outcome, log) = self.try_apply(opts, false);
        (outcome.expect("apply"), log)
    }

    /// Run the apply command in check mode.
    pub fn check(&self, opts: &ApplyOpts) -> (Outcome, Arc<BufferedLog>) {
        let (outcome, log) = self.try_apply(opts, true);
        (outcome.expect("check"), log)
    }

    /// Run the apply command, returning the raw result.
    pub fn try_apply(
        &self,
        opts: &ApplyOpts,
        dry_run: bool,
    ) -> (anyhow::Result<Outcome>, Arc<BufferedLog>) {
        let global = GlobalOpts {
            dry_run,
            parallel: true,
        };
        let log = Arc::new(BufferedLog::new());
        let result = apply::reconcile(&global, opts, log.clone());
        (result, log)
    }

    /// Sorted destination listing, relative to `dest/`, directories with a
    /// trailing `/`.
    pub fn dest_tree(&self) -> Vec<String> {
        let dest = self.dest();
        let mut entries: Vec<String> = walkdir::WalkDir::new(&dest)
            .min_depth(1)
            .into_iter()
            .map(|e| e.expect("walk dest"))
            .map(|e| {
                let rel = e
                    .path()
                    .strip_prefix(&dest)
                    .expect("under dest")
                    .to_string_lossy()
                    .replace('\\', "/");
                if e.file_type().is_dir() {
                    format!("{rel}/")
                } else {
                    rel
                }
            })
            .collect();
        entries.sort();
        entries
    }

    /// Content of a destination file.
    pub fn read_dest(&self, rel: &str) -> String {
        std::fs::read_to_string(self.dest().join(rel)).expect("read dest file")
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new, empty workspace.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write a file under `files/`.
    pub fn with_source_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.root.path().join("files").join(rel), content);
        self
    }

    /// Create a directory under `files/`.
    pub fn with_source_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.ctx.root.path().join("files").join(rel))
            .expect("create source dir");
        self
    }

    /// Write a file under `dest/`.
    pub fn with_dest_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.dest().join(rel), content);
        self
    }

    /// Create a directory under `dest/`.
    pub fn with_dest_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.ctx.dest().join(rel)).expect("create dest dir");
        self
    }

    /// Write a run file at the workspace root.
    pub fn with_run_file(self, content: &str) -> Self {
        write(&self.ctx.root.path().join("run.toml"), content);
        self
    }

    /// Finalise the builder.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}
