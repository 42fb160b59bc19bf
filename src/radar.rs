//! Radar chart of the three category scores.
//!
//! Axes point up (sharing), lower right (interaction) and lower left (growth).
//! A score of 1 sits at the centre and 6 at the outer ring.

use std::f64::consts::PI;
use std::fmt::Write;

use crate::reference::Category;
use crate::scoring::{CategoryScores, SCORE_MAX, SCORE_MIN};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarPoint {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarGeometry {
    pub center: f64,
    pub max_radius: f64,
}

impl Default for RadarGeometry {
    fn default() -> Self {
        Self {
            center: 200.0,
            max_radius: 160.0,
        }
    }
}

impl RadarGeometry {
    pub fn angle(category: Category) -> f64 {
        match category {
            Category::Sharing => -PI / 2.0,
            Category::Interaction => PI / 6.0,
            Category::Growth => 5.0 * PI / 6.0,
        }
    }

    /// Distance from the centre for a category average, clamped to the chart
    pub fn radius(&self, score: f64) -> f64 {
        let span = (SCORE_MAX - SCORE_MIN) as f64;
        let r = ((score - SCORE_MIN as f64) / span) * self.max_radius;
        r.clamp(0.0, self.max_radius)
    }

    fn at(&self, category: Category, radius: f64) -> (f64, f64) {
        let angle = Self::angle(category);
        (
            self.center + radius * angle.cos(),
            self.center + radius * angle.sin(),
        )
    }

    pub fn point(&self, category: Category, score: f64) -> RadarPoint {
        let radius = self.radius(score);
        let (x, y) = self.at(category, radius);
        RadarPoint { x, y, radius }
    }

    /// Points in axis order: sharing, interaction, growth
    pub fn points(&self, scores: &CategoryScores) -> [RadarPoint; 3] {
        Category::ALL.map(|c| self.point(c, scores.get(c)))
    }

    /// Render a self-contained SVG document
    pub fn render_svg(&self, scores: &CategoryScores) -> String {
        let size = self.center * 2.0;
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {size} {size}" width="{size}" height="{size}">"#
        );

        // One ring per scale step
        for step in SCORE_MIN + 1..=SCORE_MAX {
            let r = self.radius(step as f64);
            let ring = Category::ALL
                .map(|c| {
                    let (x, y) = self.at(c, r);
                    format!("{:.1},{:.1}", x, y)
                })
                .join(" ");
            let _ = writeln!(
                svg,
                r##"  <polygon points="{ring}" fill="none" stroke="#d0d4db" stroke-width="1"/>"##
            );
        }

        for category in Category::ALL {
            let (x, y) = self.at(category, self.max_radius);
            let _ = writeln!(
                svg,
                r##"  <line x1="{c:.1}" y1="{c:.1}" x2="{x:.1}" y2="{y:.1}" stroke="#d0d4db" stroke-width="1"/>"##,
                c = self.center
            );
            let (lx, ly) = self.at(category, self.max_radius + 22.0);
            let _ = writeln!(
                svg,
                r##"  <text x="{lx:.1}" y="{ly:.1}" text-anchor="middle" dominant-baseline="middle" font-family="sans-serif" font-size="14" fill="#333">{label} {score:.1}</text>"##,
                label = category.label(),
                score = scores.get(category)
            );
        }

        let points = self.points(scores);
        let shape = points
            .iter()
            .map(|p| format!("{:.1},{:.1}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            svg,
            r##"  <polygon points="{shape}" fill="#4f7cff" fill-opacity="0.35" stroke="#4f7cff" stroke-width="2"/>"##
        );
        for p in &points {
            let _ = writeln!(
                svg,
                r##"  <circle cx="{:.1}" cy="{:.1}" r="4" fill="#4f7cff"/>"##,
                p.x, p.y
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}
