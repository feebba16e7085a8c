// src/hierarchy.rs
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::aggregate::{count_by, countries_per_category};
use crate::config::DashboardConfig;
use crate::models::FilteredRecord;
use crate::taxonomy::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Category,
    Country,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    /// Owning category; for category nodes this is the node itself.
    pub category: Category,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// Category → country radial graph. Rebuilt from scratch on every update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hierarchy {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Hierarchy {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edge segments as `x0, x1, None` runs (and the same for y) so a single
    /// line trace can draw every edge.
    pub fn edge_polyline(&self) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        let mut xs = Vec::with_capacity(self.edges.len() * 3);
        let mut ys = Vec::with_capacity(self.edges.len() * 3);
        for e in &self.edges {
            let (Some(a), Some(b)) = (self.node(&e.from), self.node(&e.to)) else {
                continue;
            };
            xs.extend([Some(a.x), Some(b.x), None]);
            ys.extend([Some(a.y), Some(b.y), None]);
        }
        (xs, ys)
    }
}

pub fn category_node_id(c: Category) -> String {
    format!("cat:{}", c.code())
}

pub fn country_node_id(c: Category, country: &str) -> String {
    format!("{}|{}", c.code(), country)
}

/// Category `i` of `Category::ALL` sits at `i * 2π/11 − π/2` on the outer ring
/// (twelve o'clock first). Its top countries spread evenly on a ring of
/// `inner_radius` around it, the step set by that category's own country count.
pub fn build_hierarchy(list: &[FilteredRecord<'_>], cfg: &DashboardConfig) -> Hierarchy {
    let totals = count_by(list, |f| Some(f.category));
    let per_cat = countries_per_category(list, cfg.countries_per_category);

    let slots = Category::ALL.len() as f64;
    let step = TAU / slots;
    let mut h = Hierarchy::default();

    for cat in Category::ALL {
        let Some(&total) = totals.get(&cat) else {
            continue;
        };

        let a = cat.index() as f64 * step - FRAC_PI_2;
        let cx = cfg.outer_radius * a.cos();
        let cy = cfg.outer_radius * a.sin();
        let cat_id = category_node_id(cat);

        h.nodes.push(Node {
            id: cat_id.clone(),
            kind: NodeKind::Category,
            label: cat.short_label(),
            category: cat,
            x: cx,
            y: cy,
            size: cfg.category_size.size(total),
            color: cat.color().to_string(),
            value: total,
        });

        let countries = per_cat.get(&cat).map(Vec::as_slice).unwrap_or_default();
        if countries.is_empty() {
            continue;
        }
        let step2 = TAU / countries.len() as f64;

        for (j, (country, cnt)) in countries.iter().enumerate() {
            let a2 = j as f64 * step2;
            let id = country_node_id(cat, country);
            h.nodes.push(Node {
                id: id.clone(),
                kind: NodeKind::Country,
                label: format!("{country} ({cnt})"),
                category: cat,
                x: cx + cfg.inner_radius * a2.cos(),
                y: cy + cfg.inner_radius * a2.sin(),
                size: cfg.country_size.size(*cnt),
                color: cat.color().to_string(),
                value: *cnt,
            });
            h.edges.push(Edge {
                from: cat_id.clone(),
                to: id,
            });
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter;
    use crate::models::{FilterState, Record};

    fn rec(cat: &str, country: &str) -> Record {
        Record {
            category: Some(cat.to_string()),
            country: country.to_string(),
            ..Record::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn layout(rs: &[Record]) -> Hierarchy {
        build_hierarchy(&filter(rs, &FilterState::default()), &DashboardConfig::default())
    }

    #[test]
    fn first_category_sits_at_twelve_oclock() {
        let h = layout(&[rec("DRONE", "SE")]);
        let n = h.node("cat:DRONE").unwrap();
        assert!(close(n.x, 0.0));
        assert!(close(n.y, -1.65));
        assert_eq!(n.value, 1);
        assert_eq!(n.kind, NodeKind::Category);
    }

    #[test]
    fn category_slots_are_fixed_by_taxonomy_index() {
        let h = layout(&[rec("MIL", "SE")]);
        let n = h.node("cat:MIL").unwrap();
        let a = 6.0 * TAU / 11.0 - FRAC_PI_2;
        assert!(close(n.x, 1.65 * a.cos()));
        assert!(close(n.y, 1.65 * a.sin()));
    }

    #[test]
    fn countries_ring_their_category() {
        let rs = vec![
            rec("DRONE", "SE"),
            rec("DRONE", "SE"),
            rec("DRONE", "NO"),
            rec("DRONE", "FI"),
            rec("DRONE", "DK"),
        ];
        let h = layout(&rs);
        let c = h.node("cat:DRONE").unwrap().clone();
        let countries: Vec<_> = h.nodes.iter().filter(|n| n.kind == NodeKind::Country).collect();
        assert_eq!(countries.len(), 4);
        for n in &countries {
            let d = ((n.x - c.x).powi(2) + (n.y - c.y).powi(2)).sqrt();
            assert!(close(d, 0.62));
        }
        // SE leads the ranking and so takes angle 0
        let se = h.node("DRONE|SE").unwrap();
        assert!(close(se.x, c.x + 0.62));
        assert!(close(se.y, c.y));
        assert_eq!(se.label, "SE (2)");
        // four countries → quarter turns
        let dk = h.node("DRONE|DK").unwrap();
        assert!(close(dk.x, c.x));
        assert!(close(dk.y, c.y + 0.62));
    }

    #[test]
    fn edges_only_link_category_to_its_countries() {
        let rs = vec![rec("DRONE", "SE"), rec("MIL", "SE"), rec("MIL", "NO")];
        let h = layout(&rs);
        assert_eq!(h.edges.len(), 3);
        for e in &h.edges {
            let from = h.node(&e.from).unwrap();
            let to = h.node(&e.to).unwrap();
            assert_eq!(from.kind, NodeKind::Category);
            assert_eq!(to.kind, NodeKind::Country);
            assert_eq!(from.category, to.category);
        }
    }

    #[test]
    fn empty_categories_and_countries_have_no_nodes() {
        let rs = vec![rec("GPS", ""), rec("BOGUS", "SE")];
        let h = layout(&rs);
        assert_eq!(h.nodes.len(), 1);
        assert!(h.edges.is_empty());
        assert!(layout(&[]).nodes.is_empty());
    }

    #[test]
    fn per_category_country_cap() {
        let rs: Vec<Record> = (0..30).map(|i| rec("INTEL", &format!("C{i:02}"))).collect();
        let h = layout(&rs);
        assert_eq!(h.edges.len(), 18);
    }

    #[test]
    fn sizes_grow_sublinearly_and_clamp() {
        let mut rs: Vec<Record> = (0..400).map(|_| rec("TERROR", "FR")).collect();
        rs.push(rec("LEGAL", "FR"));
        let h = layout(&rs);
        assert_eq!(h.node("cat:TERROR").unwrap().size, 60.0);
        assert_eq!(h.node("TERROR|FR").unwrap().size, 26.0);
        assert_eq!(h.node("cat:LEGAL").unwrap().size, 20.0);
        assert_eq!(h.node("LEGAL|FR").unwrap().size, 8.0);
    }

    #[test]
    fn polyline_has_a_gap_after_each_edge() {
        let h = layout(&[rec("DRONE", "SE"), rec("DRONE", "NO")]);
        let (xs, ys) = h.edge_polyline();
        assert_eq!(xs.len(), 6);
        assert_eq!(ys.len(), 6);
        assert_eq!(xs[2], None);
        assert_eq!(ys[5], None);
    }
}
