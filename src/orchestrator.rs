use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::aggregate::{category_distribution, top_countries, top_places_ascending};
use crate::config::DashboardConfig;
use crate::filter::filter;
use crate::geo::{geo_points, GeoPoints};
use crate::hierarchy::build_hierarchy;
use crate::kpi::{collection_line, compute_kpis, Kpis};
use crate::models::{FilterAction, FilterState, FilteredRecord, Record};
use crate::out_models::{ChartData, ChartId, Figure, StackTrace, TraceKind};
use crate::render::{
    draw, draw_safe, draw_with_fallback, settle, ChartOutcome, DensityHistogram, DensityMap,
    GeoStrategy, Renderer, ScatterGlobe, ScatterMap,
};
use crate::temporal::{calendar_grid, cumulative_series, day_series, month_category_matrix};

/// Result of one full update cycle.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub kpis: Kpis,
    pub charts: BTreeMap<ChartId, ChartOutcome>,
}

impl UpdateReport {
    pub fn failed(&self) -> usize {
        self.charts
            .values()
            .filter(|o| matches!(o, ChartOutcome::Cleared { .. }))
            .count()
    }
}

/// Flat charts come fully derived; map-capable charts carry their strategy pair
/// and draw from the cycle's shared geo points.
enum Plan {
    Flat(Figure),
    Geo {
        preferred: Box<dyn GeoStrategy>,
        fallback: Box<dyn GeoStrategy>,
    },
}

/// Owns the raw collection, the filter state and the tunables. Every
/// computation reads them from here; nothing is global.
pub struct Dashboard {
    records: Vec<Record>,
    state: FilterState,
    config: DashboardConfig,
}

impl Dashboard {
    /// Fails only when the charting backend is missing altogether.
    pub fn new<R: Renderer + ?Sized>(
        records: Vec<Record>,
        config: DashboardConfig,
        renderer: &R,
    ) -> Result<Self> {
        if !renderer.is_available() {
            bail!("Charting backend unavailable - nothing can be drawn");
        }
        if records.is_empty() {
            warn!("Event collection is missing or empty - every chart will be empty");
        }
        info!("Dashboard ready - {}", collection_line(records.len()));
        Ok(Self {
            records,
            state: FilterState::default(),
            config,
        })
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn apply(&mut self, action: FilterAction) {
        self.state.apply(action);
    }

    pub fn filtered(&self) -> Vec<FilteredRecord<'_>> {
        filter(&self.records, &self.state)
    }

    /// Filter once, then derive and dispatch every chart from that snapshot.
    pub fn update<R: Renderer + ?Sized>(&self, renderer: &mut R) -> UpdateReport {
        let start = std::time::Instant::now();
        let list = self.filtered();
        let kpis = compute_kpis(&list, &self.state);
        debug!(
            "Filter completed - matches={}, active_categories={}, query={:?}",
            list.len(),
            kpis.active_categories,
            self.state.query
        );

        let points = geo_points(&list);
        let mut charts = BTreeMap::new();

        for id in ChartId::ALL {
            let outcome = draw_safe(renderer, id, |r| match self.plan(id, &list) {
                Plan::Flat(figure) => draw(r, id, figure),
                Plan::Geo { preferred, fallback } => {
                    self.draw_geo(r, id, preferred.as_ref(), fallback.as_ref(), &points)
                }
            });
            charts.insert(id, outcome);
        }

        let report = UpdateReport { kpis, charts };
        info!(
            "Update cycle completed - duration={:.3}s, matches={}, charts={}, failed={}",
            start.elapsed().as_secs_f32(),
            report.kpis.total,
            report.charts.len(),
            report.failed()
        );
        report
    }

    /// Deferred resize once the backend has laid everything out.
    pub fn settle<R: Renderer + ?Sized>(&self, renderer: &mut R) -> usize {
        let n = settle(renderer, &ChartId::ALL);
        debug!("Settle pass completed - resized={}", n);
        n
    }

    fn draw_geo<R: Renderer + ?Sized>(
        &self,
        r: &mut R,
        id: ChartId,
        preferred: &dyn GeoStrategy,
        fallback: &dyn GeoStrategy,
        points: &GeoPoints,
    ) -> Result<ChartOutcome> {
        if self.config.prefer_maps {
            draw_with_fallback(r, id, preferred, fallback, points)
        } else {
            draw(r, id, fallback.figure(points))
        }
    }

    /// How a chart gets drawn this cycle.
    fn plan(&self, id: ChartId, list: &[FilteredRecord<'_>]) -> Plan {
        let cfg = &self.config;
        let density = |radius: u32| Plan::Geo {
            preferred: Box::new(DensityMap { radius }),
            fallback: Box::new(DensityHistogram {
                lon_bins: cfg.histogram_lon_bins,
                lat_bins: cfg.histogram_lat_bins,
            }),
        };
        let figure = match id {
            ChartId::ScatterGeo => {
                return Plan::Geo {
                    preferred: Box::new(ScatterMap),
                    fallback: Box::new(ScatterGlobe),
                }
            }
            ChartId::DensityGeo => return density(cfg.density_geo_radius),
            ChartId::Hist2dGeo => return density(cfg.hist2d_geo_radius),
            ChartId::PieCats => {
                let dist = category_distribution(list);
                Figure::new(
                    TraceKind::Pie,
                    ChartData::Pie {
                        labels: dist.iter().map(|(c, _)| c.display_label()).collect(),
                        values: dist.iter().map(|(_, n)| *n).collect(),
                        colors: dist.iter().map(|(c, _)| c.color().to_string()).collect(),
                    },
                )
            }
            ChartId::BarCountries => {
                let (x, y) = top_countries(list, cfg.top_countries).into_iter().unzip();
                Figure::new(TraceKind::Bar, ChartData::Bars { x, y, horizontal: false })
            }
            ChartId::BarTopPlaces => {
                let (x, y) = top_places_ascending(list, cfg.top_places).into_iter().unzip();
                Figure::new(TraceKind::Bar, ChartData::Bars { x, y, horizontal: true })
            }
            ChartId::LineTimeline => {
                let s = day_series(list);
                debug!("Timeline derived - days={}, dated={}", s.x.len(), s.total());
                Figure::new(TraceKind::Scatter, ChartData::Series(s))
            }
            ChartId::Cumulative => {
                Figure::new(TraceKind::Scatter, ChartData::Series(cumulative_series(list)))
            }
            ChartId::HeatCalendar => {
                let g = calendar_grid(list);
                debug!("Calendar derived - weeks={}, dated={}", g.weeks.len(), g.total());
                Figure::new(TraceKind::Heatmap, ChartData::Calendar(g))
            }
            ChartId::StackMonthCat => {
                let m = month_category_matrix(list);
                let traces = m
                    .series
                    .into_iter()
                    .map(|s| StackTrace {
                        name: s.category.short_label(),
                        color: s.category.color().to_string(),
                        y: s.y,
                    })
                    .collect();
                Figure::new(TraceKind::Bar, ChartData::Stacked { x: m.months, traces })
            }
            ChartId::CatCountryGraph => {
                let h = build_hierarchy(list, cfg);
                let (edge_x, edge_y) = h.edge_polyline();
                Figure::new(
                    TraceKind::Graph,
                    ChartData::Graph {
                        nodes: h.nodes,
                        edges: h.edges,
                        edge_x,
                        edge_y,
                    },
                )
            }
        };
        Plan::Flat(figure)
    }
}
