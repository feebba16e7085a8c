// src/render.rs
use anyhow::Result;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::geo::{histogram2d, GeoPoints};
use crate::out_models::{ChartData, ChartId, Figure, TraceKind};

/// The charting backend as the engine sees it.
pub trait Renderer {
    /// False when the backend itself is missing; the only fatal condition.
    fn is_available(&self) -> bool {
        true
    }

    /// Whether the page/output has a slot for this chart at all.
    fn has_target(&self, target: ChartId) -> bool;

    fn react(&mut self, target: ChartId, figure: Figure) -> Result<()>;

    /// Mode the target actually holds after the last `react`, if any.
    fn accepted_mode(&self, target: ChartId) -> Option<TraceKind>;

    fn purge(&mut self, target: ChartId);

    fn resize(&mut self, target: ChartId) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartOutcome {
    Drawn { mode: TraceKind },
    FellBack { preferred: TraceKind, used: TraceKind },
    Skipped,
    Cleared { reason: String },
}

/// Run one chart's derivation and draw in isolation. A failure is logged and
/// the target purged; the caller always gets an outcome and moves on.
pub fn draw_safe<R, F>(renderer: &mut R, target: ChartId, f: F) -> ChartOutcome
where
    R: Renderer + ?Sized,
    F: FnOnce(&mut R) -> Result<ChartOutcome>,
{
    if !renderer.has_target(target) {
        debug!("Chart skipped - target={} not present", target);
        return ChartOutcome::Skipped;
    }
    match f(renderer) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Chart failed - target={}, error={:#}", target, e);
            renderer.purge(target);
            ChartOutcome::Cleared {
                reason: format!("{e:#}"),
            }
        }
    }
}

/// Plain draw: react, done.
pub fn draw<R: Renderer + ?Sized>(renderer: &mut R, target: ChartId, figure: Figure) -> Result<ChartOutcome> {
    let mode = figure.mode;
    renderer.react(target, figure)?;
    Ok(ChartOutcome::Drawn { mode })
}

/// One way of showing a point set. Map-backed and flat strategies share the input.
pub trait GeoStrategy {
    fn mode(&self) -> TraceKind;
    fn figure(&self, points: &GeoPoints) -> Figure;
}

/// Weighted heat over a slippy map.
pub struct DensityMap {
    pub radius: u32,
}

impl GeoStrategy for DensityMap {
    fn mode(&self) -> TraceKind {
        TraceKind::DensityMapbox
    }

    fn figure(&self, points: &GeoPoints) -> Figure {
        Figure::new(
            self.mode(),
            ChartData::Density {
                lat: points.lats(),
                lon: points.lons(),
                z: vec![1; points.len()],
                radius: self.radius,
            },
        )
    }
}

/// Lon/lat binned counts, no map tiles needed.
pub struct DensityHistogram {
    pub lon_bins: usize,
    pub lat_bins: usize,
}

impl GeoStrategy for DensityHistogram {
    fn mode(&self) -> TraceKind {
        TraceKind::Histogram2d
    }

    fn figure(&self, points: &GeoPoints) -> Figure {
        let hist = histogram2d(points, self.lon_bins, self.lat_bins);
        debug!("Histogram binned - points={}, kept={}", points.len(), hist.total());
        Figure::new(self.mode(), ChartData::Histogram(hist))
    }
}

/// Category-coloured markers on a slippy map.
pub struct ScatterMap;

impl GeoStrategy for ScatterMap {
    fn mode(&self) -> TraceKind {
        TraceKind::ScatterMapbox
    }

    fn figure(&self, points: &GeoPoints) -> Figure {
        Figure::new(
            self.mode(),
            ChartData::Points {
                lat: points.lats(),
                lon: points.lons(),
                text: points.points.iter().map(|p| p.text.clone()).collect(),
                colors: Some(points.points.iter().map(|p| p.color.clone()).collect()),
            },
        )
    }
}

/// Markers on the built-in world outline.
pub struct ScatterGlobe;

impl GeoStrategy for ScatterGlobe {
    fn mode(&self) -> TraceKind {
        TraceKind::ScatterGeo
    }

    fn figure(&self, points: &GeoPoints) -> Figure {
        Figure::new(
            self.mode(),
            ChartData::Points {
                lat: points.lats(),
                lon: points.lons(),
                text: points.points.iter().map(|p| p.text.clone()).collect(),
                colors: None,
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Accepted,
    Unavailable,
}

/// Did the target keep the mode we asked for?
pub fn probe<R: Renderer + ?Sized>(renderer: &R, target: ChartId, expected: TraceKind) -> Capability {
    if renderer.accepted_mode(target) == Some(expected) {
        Capability::Accepted
    } else {
        Capability::Unavailable
    }
}

/// Attempt the preferred strategy, probe, then commit or switch to the fallback.
/// An error from the attempt clears the target and counts as "not accepted";
/// an error from the fallback is the chart's failure.
pub fn draw_with_fallback<R: Renderer + ?Sized>(
    renderer: &mut R,
    target: ChartId,
    preferred: &dyn GeoStrategy,
    fallback: &dyn GeoStrategy,
    points: &GeoPoints,
) -> Result<ChartOutcome> {
    if let Err(e) = renderer.react(target, preferred.figure(points)) {
        debug!("Preferred mode rejected - target={}, mode={:?}, error={:#}", target, preferred.mode(), e);
        // a previous cycle's figure must not pass the probe
        renderer.purge(target);
    }

    match probe(renderer, target, preferred.mode()) {
        Capability::Accepted => Ok(ChartOutcome::Drawn {
            mode: preferred.mode(),
        }),
        Capability::Unavailable => {
            warn!(
                "Capability fallback - target={}, preferred={:?}, fallback={:?}",
                target,
                preferred.mode(),
                fallback.mode()
            );
            renderer.react(target, fallback.figure(points))?;
            Ok(ChartOutcome::FellBack {
                preferred: preferred.mode(),
                used: fallback.mode(),
            })
        }
    }
}

/// One-shot resize of every target that currently holds a figure.
/// Resize failures are ignored.
pub fn settle<R: Renderer + ?Sized>(renderer: &mut R, targets: &[ChartId]) -> usize {
    let mut resized = 0;
    for &t in targets {
        if renderer.accepted_mode(t).is_none() {
            continue;
        }
        match renderer.resize(t) {
            Ok(()) => resized += 1,
            Err(e) => debug!("Resize ignored - target={}, error={:#}", t, e),
        }
    }
    resized
}
