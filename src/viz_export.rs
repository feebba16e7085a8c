// src/viz_export.rs
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};
use tracing::debug;

use crate::orchestrator::UpdateReport;
use crate::out_models::{ChartId, Figure, TraceKind};
use crate::render::Renderer;
use crate::taxonomy::Category;

/* -------------------------------------------------------------------------- */
/* In-memory JSON backend                                                     */
/* -------------------------------------------------------------------------- */

/// Keeps the latest figure per chart until `write_all_viz` flushes them.
/// Without map support, map-mode figures are dropped silently so the
/// capability probe sees the refusal.
#[derive(Debug, Default)]
pub struct JsonRenderer {
    map_support: bool,
    disabled: BTreeSet<ChartId>,
    figures: BTreeMap<ChartId, Figure>,
    resized: BTreeSet<ChartId>,
}

impl JsonRenderer {
    pub fn new(map_support: bool) -> Self {
        Self {
            map_support,
            ..Self::default()
        }
    }

    /// Leave a chart out of the output entirely.
    pub fn without(mut self, chart: ChartId) -> Self {
        self.disabled.insert(chart);
        self
    }

    pub fn was_resized(&self, chart: ChartId) -> bool {
        self.resized.contains(&chart)
    }
}

impl Renderer for JsonRenderer {
    fn has_target(&self, target: ChartId) -> bool {
        !self.disabled.contains(&target)
    }

    fn react(&mut self, target: ChartId, figure: Figure) -> Result<()> {
        if figure.mode.needs_map() && !self.map_support {
            debug!("Map mode ignored - target={}, mode={:?}", target, figure.mode);
            return Ok(());
        }
        self.figures.insert(target, figure);
        Ok(())
    }

    fn accepted_mode(&self, target: ChartId) -> Option<TraceKind> {
        self.figures.get(&target).map(|f| f.mode)
    }

    fn purge(&mut self, target: ChartId) {
        self.figures.remove(&target);
    }

    fn resize(&mut self, target: ChartId) -> Result<()> {
        self.resized.insert(target);
        Ok(())
    }
}

/* -------------------------------------------------------------------------- */
/* Entry point                                                                */
/* -------------------------------------------------------------------------- */

/// Write every held figure as `viz.<chart>.json`, plus `viz.index.json`
/// with the category legend, KPIs, per-chart outcomes and the file list.
pub fn write_all_viz(
    out_dir: &Path,
    collection_line: &str,
    report: &UpdateReport,
    renderer: &JsonRenderer,
) -> Result<Vec<String>> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {:?}", out_dir))?;

    let mut files = Vec::new();
    for (chart, figure) in &renderer.figures {
        let name = format!("viz.{}.json", chart.as_str());
        let doc = json!({
            "chart": chart,
            "settled": renderer.was_resized(*chart),
            "figure": figure,
        });
        write_json(out_dir.join(&name), &doc)?;
        files.push(name);
    }

    let legend: Vec<_> = Category::ALL
        .into_iter()
        .map(|c| {
            json!({
                "code": c.code(),
                "label": c.display_label(),
                "color": c.color(),
                "description": c.description(),
            })
        })
        .collect();

    let idx = json!({
        "version": 1,
        "collection": collection_line,
        "legend": legend,
        "kpis": report.kpis,
        "charts": report.charts,
        "files": files,
    });
    write_json(out_dir.join("viz.index.json"), &idx)?;
    debug!("Wrote viz bundle - dir={}, files={}", out_dir.display(), files.len());

    Ok(files)
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("write {}", path.display()))
}
