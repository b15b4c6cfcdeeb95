use serde::Serialize;

use crate::classifier::MagnitudeBucket;

/// One swatch row of the legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub color: &'static str,
    pub lower_bound: f64,
    /// `None` for the open-ended top bucket.
    pub upper_bound: Option<f64>,
}

impl LegendEntry {
    /// `low–high`, or `low+` for the top bucket.
    pub fn label(&self) -> String {
        match self.upper_bound {
            Some(upper) => format!("{}\u{2013}{}", self.lower_bound, upper),
            None => format!("{}+", self.lower_bound),
        }
    }
}

/// Static magnitude key shown in a map corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendWidget {
    pub position: &'static str,
    pub entries: Vec<LegendEntry>,
}

impl LegendWidget {
    /// Markup for a Leaflet control with the `info legend` classes.
    pub fn to_html(&self) -> String {
        let mut html = String::from(r#"<div class="info legend">"#);
        for entry in &self.entries {
            html.push_str(&format!(
                r#"<i style="background:{}"></i>{}"#,
                entry.color,
                html_escape::encode_text(&entry.label())
            ));
            if entry.upper_bound.is_some() {
                html.push_str("<br>");
            }
        }
        html.push_str("</div>");
        html
    }
}

/// Builds the legend from the same bucket table the classifier uses.
pub fn build_legend(buckets: &[MagnitudeBucket]) -> LegendWidget {
    let entries = buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| LegendEntry {
            color: bucket.color,
            lower_bound: bucket.lower_bound,
            upper_bound: buckets.get(i + 1).map(|next| next.lower_bound),
        })
        .collect();

    LegendWidget {
        position: "bottomright",
        entries,
    }
}
