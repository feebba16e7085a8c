// src/taxonomy.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of incident categories. Anything else is not a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Drone,
    Infra,
    Nuclear,
    Terror,
    Intel,
    Legal,
    Mil,
    Hybrid,
    Mar,
    Gps,
    Policy,
}

impl Category {
    /// Display order; also fixes the angular slot of each category in the graph.
    pub const ALL: [Category; 11] = [
        Category::Drone,
        Category::Infra,
        Category::Nuclear,
        Category::Terror,
        Category::Intel,
        Category::Legal,
        Category::Mil,
        Category::Hybrid,
        Category::Mar,
        Category::Gps,
        Category::Policy,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Category::Drone => "DRONE",
            Category::Infra => "INFRA",
            Category::Nuclear => "NUCLEAR",
            Category::Terror => "TERROR",
            Category::Intel => "INTEL",
            Category::Legal => "LEGAL",
            Category::Mil => "MIL",
            Category::Hybrid => "HYBRID",
            Category::Mar => "MAR",
            Category::Gps => "GPS",
            Category::Policy => "POLICY",
        }
    }

    /// Exact code lookup. Callers normalize case and whitespace first.
    pub fn from_code(code: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Drone => "Drones / UAV",
            Category::Infra => "Infrastructure / sabotage",
            Category::Nuclear => "Nuclear / hazardous cargo",
            Category::Terror => "Terror / violence",
            Category::Intel => "Espionage / intelligence",
            Category::Legal => "Court cases / verdicts",
            Category::Mil => "Military / defence",
            Category::Hybrid => "Influence / hybrid",
            Category::Mar => "Maritime / shadow fleet",
            Category::Gps => "GPS jamming / signals",
            Category::Policy => "Politics / policy",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Category::Drone => "🛩️",
            Category::Infra => "⚡",
            Category::Nuclear => "☢️",
            Category::Terror => "💣",
            Category::Intel => "🕵️‍♂️",
            Category::Legal => "⚖️",
            Category::Mil => "🪖",
            Category::Hybrid => "🧠",
            Category::Mar => "⚓",
            Category::Gps => "📡",
            Category::Policy => "🏛️",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Category::Drone => "#b9e3ff",
            Category::Infra => "#ffe08a",
            Category::Nuclear => "#ffd0d0",
            Category::Terror => "#ffc4b6",
            Category::Intel => "#e6e6e6",
            Category::Legal => "#c8ffcb",
            Category::Mil => "#b8efe6",
            Category::Hybrid => "#dfcffc",
            Category::Mar => "#cfe3ff",
            Category::Gps => "#eed9ff",
            Category::Policy => "#e9ffd4",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::Drone => "Incidents involving UAVs or drones.",
            Category::Infra => "Critical infrastructure, sabotage, disruptions.",
            Category::Nuclear => "Nuclear material or hazardous goods.",
            Category::Terror => "Terrorism and high-impact violent crime.",
            Category::Intel => "Espionage, intelligence, security services.",
            Category::Legal => "Legal proceedings, verdicts and court cases.",
            Category::Mil => "Military activity and defence.",
            Category::Hybrid => "Information influence and hybrid activity.",
            Category::Mar => "Events at sea and the shadow fleet.",
            Category::Gps => "GNSS interference and signal disruption.",
            Category::Policy => "Policy, agencies, governing documents.",
        }
    }

    /// Position in `ALL`.
    pub fn index(self) -> usize {
        Category::ALL
            .iter()
            .position(|&c| c == self)
            .unwrap_or_default()
    }

    /// "🛩️ Drones / UAV" for legend and pie labels.
    pub fn display_label(self) -> String {
        format!("{} {}", self.emoji(), self.label())
    }

    /// "🛩️ DRONE" for compact trace names and graph labels.
    pub fn short_label(self) -> String {
        format!("{} {}", self.emoji(), self.code())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
