//! Command: reconcile a destination with its source trees.
use anyhow::{Context as _, Result};
use std::sync::Arc;

use crate::cli::{ApplyOpts, GlobalOpts};
use crate::config::{RawConfig, RunConfig, load_config};
use crate::logging::{Log, Logger};
use crate::tree::{self, Context, Outcome};

/// Run-file options set on the command line.
#[must_use]
pub fn overrides(opts: &ApplyOpts) -> RawConfig {
    let list = |items: &[String]| {
        (!items.is_empty()).then(|| {
            toml::Value::Array(items.iter().cloned().map(toml::Value::String).collect())
        })
    };
    RawConfig {
        src: list(&opts.src),
        dest: opts.dest.clone(),
        owner: opts.owner.clone(),
        group: opts.group.clone(),
        file_mode: opts.file_mode.clone().map(toml::Value::String),
        directory_mode: opts.directory_mode.clone().map(toml::Value::String),
        exclusive: opts.exclusive,
        exclusive_ignore: list(&opts.exclusive_ignore),
        template_extension: opts.template_extension.clone(),
        base_dir: opts.base_dir.clone(),
        vars: opts
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), toml::Value::String(v.clone())))
            .collect(),
    }
}

/// Load the run file (if any), layer the command-line options on top, and
/// validate the result.
///
/// Relative sources resolve against the run file's directory, or the
/// current directory without one.
///
/// # Errors
///
/// Returns an error if the run file cannot be read or parsed, or the merged
/// configuration is invalid.
pub fn load(opts: &ApplyOpts, log: &dyn Log) -> Result<RunConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let (raw, base_dir) = match &opts.config {
        Some(path) => {
            let raw = load_config(path)?;
            let base = path.parent().map_or_else(|| cwd.clone(), |p| cwd.join(p));
            (raw, base)
        }
        None => (RawConfig::default(), cwd),
    };
    Ok(RunConfig::from_raw(raw.merge(overrides(opts)), &base_dir, log)?)
}

/// Load the configuration and reconcile the local destination.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the run aborts.
pub fn reconcile(global: &GlobalOpts, opts: &ApplyOpts, log: Arc<dyn Log>) -> Result<Outcome> {
    log.stage("Loading configuration");
    let config = load(opts, log.as_ref())?;
    log.info(&format!(
        "{} source root(s) -> {}",
        config.sources.len(),
        config.dest.display()
    ));
    if global.dry_run {
        log.info("check mode: the destination will not be modified");
    }

    let ctx = Context::local(log, global.dry_run, global.parallel);
    Ok(tree::reconcile(&config, &ctx)?)
}

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the run aborts, or the
/// outcome cannot be serialized.
pub fn run(global: &GlobalOpts, opts: &ApplyOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("template-tree {}", super::version::version()));
    let outcome = reconcile(global, opts, Arc::clone(log) as Arc<dyn Log>)?;

    if opts.diff {
        print!("{}", outcome.unified_diff());
    }
    if opts.json {
        let json = serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?;
        println!("{json}");
    }
    log.print_summary(&outcome.summary());
    Ok(())
}
