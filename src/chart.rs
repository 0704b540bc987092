//! Waterfall chart of feature contributions.
//!
//! [`WaterfallChart`] is a plain data structure; [`WaterfallChart::to_plotly`]
//! turns it into a Plotly figure and [`WaterfallChart::render_text`] draws it
//! in a terminal.

use serde::Serialize;
use serde_json::{json, Value};

use crate::attribution::ContributionVector;

pub const CHART_TITLE: &str = "Feature Impact on Risk";
pub const TRACE_NAME: &str = "Risk Contribution";
pub const CONNECTOR_COLOR: &str = "rgb(63, 63, 63)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallBar {
    pub x: String,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallChart {
    pub title: String,
    pub name: String,
    pub orientation: &'static str,
    pub connector_color: String,
    pub show_legend: bool,
    /// Where the first bar starts
    pub base: f64,
    pub bars: Vec<WaterfallBar>,
}

/// One bar per feature, in schema order, zero contributions included.
pub fn waterfall_chart(contributions: &ContributionVector) -> WaterfallChart {
    WaterfallChart {
        title: CHART_TITLE.to_string(),
        name: TRACE_NAME.to_string(),
        orientation: "v",
        connector_color: CONNECTOR_COLOR.to_string(),
        show_legend: false,
        base: contributions.base_value(),
        bars: contributions
            .iter()
            .map(|c| WaterfallBar {
                x: c.feature.clone(),
                y: c.contribution,
                text: format!("{:.2}", c.contribution),
            })
            .collect(),
    }
}

impl WaterfallChart {
    /// Plotly figure JSON (`data` + `layout`) for a `waterfall` trace.
    pub fn to_plotly(&self) -> Value {
        json!({
            "data": [{
                "type": "waterfall",
                "name": self.name,
                "orientation": self.orientation,
                "x": self.bars.iter().map(|b| b.x.as_str()).collect::<Vec<_>>(),
                "y": self.bars.iter().map(|b| b.y).collect::<Vec<_>>(),
                "text": self.bars.iter().map(|b| b.text.as_str()).collect::<Vec<_>>(),
                "connector": { "line": { "color": self.connector_color } },
            }],
            "layout": {
                "title": { "text": self.title },
                "showlegend": self.show_legend,
            },
        })
    }

    /// Running total after the last bar.
    pub fn end(&self) -> f64 {
        self.base + self.bars.iter().map(|b| b.y).sum::<f64>()
    }

    /// Horizontal text waterfall. Each row shows the bar spanning from the
    /// running total before the feature to the total after it.
    pub fn render_text(&self, width: usize) -> String {
        let width = width.max(10);
        let label_width = self.bars.iter().map(|b| b.x.len()).max().unwrap_or(0);

        let mut running = self.base;
        let mut lo = running;
        let mut hi = running;
        for bar in &self.bars {
            running += bar.y;
            lo = lo.min(running);
            hi = hi.max(running);
        }
        let span = if hi - lo > f64::EPSILON { hi - lo } else { 1.0 };
        let column = |v: f64| (((v - lo) / span) * (width - 1) as f64).round() as usize;

        let mut out = format!("{}\n", self.title);
        let mut running = self.base;
        for bar in &self.bars {
            let start = column(running);
            running += bar.y;
            let end = column(running);
            let (from, to) = if start <= end { (start, end) } else { (end, start) };
            let fill = if bar.y > 0.0 {
                '+'
            } else if bar.y < 0.0 {
                '-'
            } else {
                '|'
            };

            let mut cells = vec![' '; width];
            for cell in cells.iter_mut().take(to + 1).skip(from) {
                *cell = fill;
            }
            let row: String = cells.into_iter().collect();
            out.push_str(&format!(
                "{:<label_width$} {} {:>6}\n",
                bar.x,
                row.trim_end(),
                bar.text,
                label_width = label_width
            ));
        }
        out.push_str(&format!(
            "{:<label_width$} base {:.2} -> {:.2}\n",
            "",
            self.base,
            self.end(),
            label_width = label_width
        ));
        out
    }
}
