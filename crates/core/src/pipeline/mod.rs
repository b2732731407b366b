//! Build pipeline: a fixed list of named stages run in order over one
//! [`BuildContext`].

pub mod clean;
pub mod package;
mod steps;

use std::time::Instant;

use anyhow::Result;
use log::{debug, error, info};

pub use steps::BUILD_STAGES;

use crate::{
    config::BuildConfig, context::BuildContext, error::PipelineError, identity::resolve_identity,
};

/// A labelled stage action.
pub type Stage<C> = (&'static str, fn(&mut C) -> Result<()>);

pub type PipelineStage = Stage<BuildContext>;

fn run_stage<C>(
    label: &'static str,
    step_num: usize,
    total: usize,
    ctx: &mut C,
    action: fn(&mut C) -> Result<()>,
) -> Result<()> {
    info!("→ {label}");
    debug!("stage {step_num}/{total}");
    let start = Instant::now();
    action(ctx).map_err(|source| PipelineError { stage: label, source: source.into() })?;
    info!("  ✓ {label} ({:.2}s)", start.elapsed().as_secs_f64());
    Ok(())
}

/// Run `stages` in order, stopping at the first failure. The error is a
/// [`PipelineError`] naming the failed stage.
pub fn run_stages<C>(stages: &[Stage<C>], ctx: &mut C) -> Result<()> {
    let total = stages.len();
    for (i, (label, action)) in stages.iter().enumerate() {
        run_stage(*label, i + 1, total, ctx, *action)?;
    }
    Ok(())
}

/// Run the full build for `config` and return the final context.
///
/// The failure banner and error chain are logged here, so callers only need
/// to turn an `Err` into a non-zero exit status.
pub fn build(config: BuildConfig) -> Result<BuildContext> {
    info!("Starting build pipeline");
    let start = Instant::now();
    let mut ctx = BuildContext::new(config);

    match prepare(&mut ctx).and_then(|()| run_stages(BUILD_STAGES, &mut ctx)) {
        Ok(()) => {
            info!("✔ Build finished successfully in {:.2}s", start.elapsed().as_secs_f64());
            info!("  Output: {}", ctx.paths.dist.display());
            Ok(ctx)
        }
        Err(e) => {
            error!("✖ Build failed");
            error!("{e:#}");
            Err(e)
        }
    }
}

fn prepare(ctx: &mut BuildContext) -> Result<()> {
    let identity = resolve_identity(&ctx.config)?;
    ctx.version = identity.version.clone();
    ctx.identity = identity.to_string();
    info!("  {}", ctx.identity);
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct Trace {
        ran: Vec<&'static str>,
    }

    fn first(ctx: &mut Trace) -> Result<()> {
        ctx.ran.push("first");
        Ok(())
    }

    fn failing(ctx: &mut Trace) -> Result<()> {
        ctx.ran.push("failing");
        bail!("disk full")
    }

    fn last(ctx: &mut Trace) -> Result<()> {
        ctx.ran.push("last");
        Ok(())
    }

    #[test]
    fn test_stages_run_in_order() {
        let mut trace = Trace::default();
        let stages: &[Stage<Trace>] = &[("first", first), ("last", last)];
        run_stages(stages, &mut trace).unwrap();
        assert_eq!(trace.ran, vec!["first", "last"]);
    }

    #[test]
    fn test_failure_stops_pipeline() {
        let mut trace = Trace::default();
        let stages: &[Stage<Trace>] = &[("first", first), ("failing", failing), ("last", last)];
        let err = run_stages(stages, &mut trace).unwrap_err();

        assert_eq!(trace.ran, vec!["first", "failing"]);
        let failure = err.downcast_ref::<PipelineError>().unwrap();
        assert_eq!(failure.stage, "failing");
        assert_eq!(format!("{err:#}"), "stage \"failing\" failed: disk full");
    }

    #[test]
    fn test_stage_labels() {
        let labels: Vec<_> = BUILD_STAGES.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec![
                "clean dist",
                "copy metadata",
                "prepare svg icons",
                "allocate codepoints",
                "build font files",
                "render templates",
                "compile scss bundles",
                "generate JS icon exports",
                "minify css bundles",
                "build draw.io library",
                "package distribution",
            ]
        );
    }

    #[test]
    fn test_build_without_version_fails_before_stages() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BuildConfig::new(dir.path());
        config.dist = Some(dir.path().join("out"));
        assert!(build(config).is_err());
        assert!(!dir.path().join("out").exists());
    }
}
