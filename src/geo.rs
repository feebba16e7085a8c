// src/geo.rs
use serde::Serialize;

use crate::models::FilteredRecord;
use crate::normalize::parse_coord;
use crate::taxonomy::Category;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub category: Category,
    pub color: String,
    /// Hover text: category, title, place, date on separate lines.
    pub text: String,
}

/// The shared input of every map-or-fallback chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoPoints {
    pub points: Vec<GeoPoint>,
}

impl GeoPoints {
    pub fn lats(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.lat).collect()
    }

    pub fn lons(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.lon).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Records whose latitude and longitude both parse; the rest are left out.
pub fn geo_points(list: &[FilteredRecord<'_>]) -> GeoPoints {
    let points = list
        .iter()
        .filter_map(|f| {
            let lat = parse_coord(f.record.lat.as_ref())?;
            let lon = parse_coord(f.record.lng.as_ref())?;
            Some(GeoPoint {
                lat,
                lon,
                category: f.category,
                color: f.category.color().to_string(),
                text: format!(
                    "{}<br>{}<br>{}<br>{}",
                    f.category.display_label(),
                    f.record.title,
                    f.record.place,
                    f.record.date
                ),
            })
        })
        .collect();
    GeoPoints { points }
}

/// Lon/lat counts on a fixed world grid; the flat stand-in for a density map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram2d {
    /// Bin centres along longitude.
    pub x: Vec<f64>,
    /// Bin centres along latitude.
    pub y: Vec<f64>,
    /// `z[lat_bin][lon_bin]`
    pub z: Vec<Vec<u32>>,
}

impl Histogram2d {
    pub fn total(&self) -> u32 {
        self.z.iter().flatten().sum()
    }
}

/// Bin over lon [-180, 180] × lat [-90, 90]; points outside the globe are skipped.
pub fn histogram2d(points: &GeoPoints, lon_bins: usize, lat_bins: usize) -> Histogram2d {
    let lon_bins = lon_bins.max(1);
    let lat_bins = lat_bins.max(1);
    let lon_w = 360.0 / lon_bins as f64;
    let lat_w = 180.0 / lat_bins as f64;

    let mut z = vec![vec![0u32; lon_bins]; lat_bins];
    for p in &points.points {
        if !(-180.0..=180.0).contains(&p.lon) || !(-90.0..=90.0).contains(&p.lat) {
            continue;
        }
        let xi = (((p.lon + 180.0) / lon_w) as usize).min(lon_bins - 1);
        let yi = (((p.lat + 90.0) / lat_w) as usize).min(lat_bins - 1);
        z[yi][xi] += 1;
    }

    Histogram2d {
        x: (0..lon_bins).map(|i| -180.0 + (i as f64 + 0.5) * lon_w).collect(),
        y: (0..lat_bins).map(|i| -90.0 + (i as f64 + 0.5) * lat_w).collect(),
        z,
    }
}
