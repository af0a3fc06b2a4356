//! Finalized on-disk report generation
//!
//! Writes the non-live form of the inspection data: an entries list, one
//! metrics document per build variant, and one content-addressed JSON file
//! per identifier with transform activity, all under `reports/` next to an
//! optional static viewer bundle. Artifacts are independent: a failed
//! write aborts that artifact only and leaves the rest valid.

use crate::context::InspectContext;
use crate::error::InspectError;
use crate::recorder::BuildVariant;
use anyhow::{Context as _, Result};
use futures::future::BoxFuture;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Viewer marker rewritten when a report is finalized.
const MODE_MARKER_DEV: &str = "data-inspect-mode=\"DEV\"";
const MODE_MARKER_BUILD: &str = "data-inspect-mode=\"BUILD\"";

/// Content-addressed file name for one module's dump.
pub fn module_file_name(id: &str) -> String {
    let digest = Sha256::digest(id.as_bytes());
    format!("{}.json", hex::encode(digest))
}

/// Generate the full report under the configured output directory and
/// return its path. The directory is recreated from scratch each time.
pub async fn generate_report(ctx: &InspectContext) -> Result<PathBuf> {
    let options = ctx.options();
    let target = if options.output_dir.is_absolute() {
        options.output_dir.clone()
    } else {
        Path::new(&options.root).join(&options.output_dir)
    };
    let reports_dir = target.join("reports");

    if fs::metadata(&target).await.is_ok() {
        fs::remove_dir_all(&target)
            .await
            .with_context(|| format!("failed to clear report directory `{}`", target.display()))?;
    }
    fs::create_dir_all(&reports_dir)
        .await
        .with_context(|| format!("failed to create `{}`", reports_dir.display()))?;

    if let Some(viewer_dir) = &options.viewer_dir {
        match copy_dir(viewer_dir, &target).await {
            Ok(()) => rewrite_mode_marker(&target.join("index.html")).await,
            Err(err) => tracing::warn!(%err, "viewer bundle not copied"),
        }
    }

    write_artifact(&reports_dir.join("list.json"), &ctx.list()).await;
    write_artifact(
        &reports_dir.join("metrics.json"),
        &ctx.plugin_metrics(BuildVariant::Client),
    )
    .await;
    write_artifact(
        &reports_dir.join("metrics-ssr.json"),
        &ctx.plugin_metrics(BuildVariant::Ssr),
    )
    .await;

    dump_modules(ctx, &reports_dir, BuildVariant::Client).await;
    dump_modules(ctx, &reports_dir, BuildVariant::Ssr).await;

    Ok(target)
}

/// Write each identifier's `{resolvedId, transforms}` dump for one variant.
async fn dump_modules(ctx: &InspectContext, reports_dir: &Path, variant: BuildVariant) {
    let dir = reports_dir.join(format!("transform{}", variant.suffix()));
    if let Err(err) = fs::create_dir_all(&dir).await {
        tracing::error!(%err, dir = %dir.display(), "module dump directory not created");
        return;
    }
    for (id, info) in ctx.dump_all(variant) {
        write_artifact(&dir.join(module_file_name(&id)), &info).await;
    }
}

/// Write one JSON artifact; a failure is logged and contained.
async fn write_artifact<T: Serialize>(path: &Path, value: &T) {
    let payload = match serde_json::to_vec_pretty(value) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(%err, path = %path.display(), "report artifact not serialized");
            return;
        }
    };
    if let Err(source) = fs::write(path, payload).await {
        let err = InspectError::ReportArtifact {
            path: path.to_path_buf(),
            source,
        };
        tracing::error!(%err, "report artifact not written");
    }
}

/// Flip the viewer's mode marker from live to finalized.
async fn rewrite_mode_marker(index_html: &Path) {
    let contents = match fs::read_to_string(index_html).await {
        Ok(contents) => contents,
        Err(_) => return,
    };
    if contents.contains(MODE_MARKER_DEV) {
        let rewritten = contents.replace(MODE_MARKER_DEV, MODE_MARKER_BUILD);
        if let Err(err) = fs::write(index_html, rewritten).await {
            tracing::warn!(%err, "viewer mode marker not rewritten");
        }
    }
}

fn copy_dir<'a>(src: &'a Path, dst: &'a Path) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        fs::create_dir_all(dst).await?;
        let mut entries = fs::read_dir(src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let from = entry.path();
            let to = dst.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                copy_dir(&from, &to).await?;
            } else {
                fs::copy(&from, &to).await?;
            }
        }
        Ok(())
    })
}
