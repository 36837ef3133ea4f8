//! Operation executor: applies a plan, deletes first.
use std::path::Path;

use super::{Context, EntryKind, ReconciliationPlan};
use crate::error::TreeError;
use crate::operations::OpResult;

/// Report one applied operation.
fn announce(ctx: &Context, verb: &str, path: &Path, result: &OpResult) {
    let msg = format!("{verb}: {}", path.display());
    if !result.changed {
        ctx.log.debug(&format!("{msg} (unchanged)"));
    } else if ctx.dry_run {
        ctx.log.dry_run(&msg);
    } else {
        ctx.log.info(&msg);
    }
}

/// Apply every delete, then every create, in plan order.
///
/// The first failure aborts the run.  Nothing is rolled back: operations
/// that succeeded before it stay applied, and a rerun converges.
///
/// # Errors
///
/// Returns [`TreeError::OperationFailed`] carrying the collaborator's message
/// for the first operation that fails.
pub fn execute(plan: &ReconciliationPlan, ctx: &Context) -> Result<Vec<OpResult>, TreeError> {
    let mut results = Vec::with_capacity(plan.to_delete.len() + plan.to_create.len());

    for remote in &plan.to_delete {
        let result = ctx
            .remover
            .remove(&remote.path)
            .map_err(|e| TreeError::operation(&remote.path, &e))?;
        announce(ctx, "DELETE", &remote.path, &result);
        results.push(result);
    }

    for entry in &plan.to_create {
        let result = match entry.kind {
            EntryKind::Directory => {
                let result = ctx
                    .writer
                    .ensure_directory(&entry.dest, &entry.attributes)
                    .map_err(|e| TreeError::operation(&entry.dest, &e))?;
                announce(ctx, "DIR", &entry.dest, &result);
                result
            }
            EntryKind::File => {
                let content =
                    entry
                        .content
                        .as_deref()
                        .ok_or_else(|| TreeError::ContentUnavailable {
                            path: entry.source.clone().unwrap_or_else(|| entry.dest.clone()),
                            reason: "content was not resolved".to_string(),
                        })?;
                let result = ctx
                    .writer
                    .write_file(&entry.dest, content, &entry.attributes)
                    .map_err(|e| TreeError::operation(&entry.dest, &e))?;
                announce(ctx, "COPY", &entry.dest, &result);
                result
            }
        };
        results.push(result);
    }

    Ok(results)
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{BufferedLog, LogLevel};
    use crate::operations::memory::MemoryDestination;
    use crate::operations::{
        Attributes, DiffRecord, MockPathRemover, MockPathWriter, PathState, RemoteEntry,
    };
    use crate::tree::PlannedEntry;
    use mockall::Sequence;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn file(dest: &str, content: &str) -> PlannedEntry {
        PlannedEntry {
            dest: PathBuf::from(dest),
            kind: EntryKind::File,
            source: Some(PathBuf::from("/src/f")),
            attributes: Attributes::default(),
            is_template: false,
            content: Some(content.as_bytes().to_vec()),
        }
    }

    fn dir(dest: &str) -> PlannedEntry {
        PlannedEntry {
            dest: PathBuf::from(dest),
            kind: EntryKind::Directory,
            source: None,
            attributes: Attributes::default(),
            is_template: false,
            content: None,
        }
    }

    fn memory_context(dest: MemoryDestination) -> (Context, Arc<MemoryDestination>, Arc<BufferedLog>) {
        let dest = Arc::new(dest);
        let log = Arc::new(BufferedLog::new());
        let ctx = Context::with_destination(log.clone(), Arc::clone(&dest));
        (ctx, dest, log)
    }

    #[test]
    fn deletes_run_before_creates() {
        let (ctx, dest, _) = memory_context(
            MemoryDestination::new()
                .with_dir("/opt/app")
                .with_dir("/opt/app/config.yml"),
        );
        let plan = ReconciliationPlan {
            to_delete: vec![RemoteEntry::directory("/opt/app/config.yml")],
            to_create: vec![dir("/opt/app"), file("/opt/app/config.yml", "port: 80\n")],
        };

        let results = execute(&plan, &ctx).unwrap();
        assert_eq!(
            dest.calls(),
            vec![
                "remove /opt/app/config.yml",
                "mkdir /opt/app",
                "write /opt/app/config.yml",
            ]
        );
        assert_eq!(results.len(), 3);
        assert!(!results[1].changed, "existing directory should be unchanged");
        assert_eq!(dest.content("/opt/app/config.yml").as_deref(), Some("port: 80\n"));
    }

    #[test]
    fn first_failure_aborts_without_rollback() {
        let (ctx, dest, _) = memory_context(
            MemoryDestination::new()
                .with_file("/opt/app/a", "x")
                .with_file("/opt/app/b", "x")
                .failing_on("/opt/app/b"),
        );
        let plan = ReconciliationPlan {
            to_delete: vec![RemoteEntry::file("/opt/app/a"), RemoteEntry::file("/opt/app/b")],
            to_create: vec![dir("/opt/app/new")],
        };

        let err = execute(&plan, &ctx).unwrap_err();
        assert_eq!(err.to_string(), "simulated failure at /opt/app/b");
        assert!(matches!(err, TreeError::OperationFailed { ref path, .. } if path == Path::new("/opt/app/b")));
        assert_eq!(dest.calls(), vec!["remove /opt/app/a", "remove /opt/app/b"]);
        assert_eq!(dest.tree(), vec!["/opt/app/b (file)"]);
    }

    #[test]
    fn already_absent_delete_is_not_a_failure() {
        let (ctx, _, log) = memory_context(MemoryDestination::new().with_dir("/opt/app/old"));
        let plan = ReconciliationPlan {
            to_delete: vec![
                RemoteEntry::directory("/opt/app/old"),
                RemoteEntry::file("/opt/app/old/child"),
            ],
            to_create: Vec::new(),
        };
        let results = execute(&plan, &ctx).unwrap();
        assert!(results[0].changed);
        assert!(!results[1].changed);
        assert_eq!(log.messages(LogLevel::Info), vec!["DELETE: /opt/app/old"]);
    }

    #[test]
    fn unresolved_file_content_is_rejected() {
        let (ctx, dest, _) = memory_context(MemoryDestination::new());
        let mut entry = file("/opt/app/f", "");
        entry.content = None;
        let plan = ReconciliationPlan {
            to_delete: Vec::new(),
            to_create: vec![entry],
        };
        let err = execute(&plan, &ctx).unwrap_err();
        assert!(matches!(err, TreeError::ContentUnavailable { .. }));
        assert!(dest.calls().is_empty());
    }

    #[test]
    fn collaborators_called_in_plan_order() {
        let mut seq = Sequence::new();
        let mut remover = MockPathRemover::new();
        let mut writer = MockPathWriter::new();

        remover
            .expect_remove()
            .withf(|p| p == Path::new("/opt/app/old.txt"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|p| {
                Ok(OpResult::changed(
                    p,
                    PathState::Absent,
                    DiffRecord::state_change(p, PathState::File, PathState::Absent),
                ))
            });
        writer
            .expect_ensure_directory()
            .withf(|p, _| p == Path::new("/opt/app/data"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|p, _| Ok(OpResult::unchanged(p, PathState::Directory)));
        writer
            .expect_write_file()
            .withf(|p, content, _| p == Path::new("/opt/app/config.yml") && content == b"v")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|p, _, _| Ok(OpResult::unchanged(p, PathState::File)));

        let (ctx, _, _) = memory_context(MemoryDestination::new());
        let ctx = ctx
            .with_remover(Arc::new(remover))
            .with_writer(Arc::new(writer));
        let plan = ReconciliationPlan {
            to_delete: vec![RemoteEntry::file("/opt/app/old.txt")],
            to_create: vec![dir("/opt/app/data"), file("/opt/app/config.yml", "v")],
        };
        let results = execute(&plan, &ctx).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn dry_run_changes_are_logged_as_dry_run() {
        let (mut ctx, _, log) = memory_context(MemoryDestination::new());
        ctx.dry_run = true;
        let plan = ReconciliationPlan {
            to_delete: Vec::new(),
            to_create: vec![dir("/opt/app")],
        };
        execute(&plan, &ctx).unwrap();
        assert_eq!(log.messages(LogLevel::DryRun), vec!["DIR: /opt/app"]);
    }
}
