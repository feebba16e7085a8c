use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::Histogram2d;
use crate::hierarchy::{Edge, Node};
use crate::temporal::{CalendarGrid, Series};

/// Fixed chart identifiers; also the names of the rendering targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartId {
    PieCats,
    BarCountries,
    LineTimeline,
    HeatCalendar,
    BarTopPlaces,
    StackMonthCat,
    CatCountryGraph,
    ScatterGeo,
    DensityGeo,
    Hist2dGeo,
    Cumulative,
}

impl ChartId {
    /// Draw order within one update cycle.
    pub const ALL: [ChartId; 11] = [
        ChartId::PieCats,
        ChartId::BarCountries,
        ChartId::LineTimeline,
        ChartId::HeatCalendar,
        ChartId::BarTopPlaces,
        ChartId::StackMonthCat,
        ChartId::CatCountryGraph,
        ChartId::ScatterGeo,
        ChartId::DensityGeo,
        ChartId::Hist2dGeo,
        ChartId::Cumulative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartId::PieCats => "pieCats",
            ChartId::BarCountries => "barCountries",
            ChartId::LineTimeline => "lineTimeline",
            ChartId::HeatCalendar => "heatCalendar",
            ChartId::BarTopPlaces => "barTopPlaces",
            ChartId::StackMonthCat => "stackMonthCat",
            ChartId::CatCountryGraph => "catCountryGraph",
            ChartId::ScatterGeo => "scatterGeo",
            ChartId::DensityGeo => "densityGeo",
            ChartId::Hist2dGeo => "hist2dGeo",
            ChartId::Cumulative => "cumulative",
        }
    }

    /// Exact target name, e.g. "hist2dGeo".
    pub fn from_name(name: &str) -> Option<ChartId> {
        ChartId::ALL.into_iter().find(|id| id.as_str() == name)
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering mode requested for a target. Map modes may be refused by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Pie,
    Bar,
    Scatter,
    Heatmap,
    Graph,
    DensityMapbox,
    ScatterMapbox,
    ScatterGeo,
    Histogram2d,
}

impl TraceKind {
    pub fn needs_map(self) -> bool {
        matches!(self, TraceKind::DensityMapbox | TraceKind::ScatterMapbox)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackTrace {
    pub name: String,
    pub color: String,
    pub y: Vec<usize>,
}

/// Plain data handed to the renderer; pixels are its business.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartData {
    Pie {
        labels: Vec<String>,
        values: Vec<usize>,
        colors: Vec<String>,
    },
    Bars {
        x: Vec<String>,
        y: Vec<usize>,
        horizontal: bool,
    },
    Series(Series),
    Calendar(CalendarGrid),
    Stacked {
        x: Vec<String>,
        traces: Vec<StackTrace>,
    },
    Graph {
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        edge_x: Vec<Option<f64>>,
        edge_y: Vec<Option<f64>>,
    },
    Density {
        lat: Vec<f64>,
        lon: Vec<f64>,
        z: Vec<u32>,
        radius: u32,
    },
    Histogram(Histogram2d),
    Points {
        lat: Vec<f64>,
        lon: Vec<f64>,
        text: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        colors: Option<Vec<String>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub mode: TraceKind,
    pub data: ChartData,
}

impl Figure {
    pub fn new(mode: TraceKind, data: ChartData) -> Self {
        Self { mode, data }
    }
}
