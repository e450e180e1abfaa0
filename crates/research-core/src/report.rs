use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::RenderSurface;

/// One plotted value; `None` leaves a gap in the line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl ChartPoint {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesKind {
    Line,
    /// Line drawn with a marker at every point
    MarkedLine,
    BuyMarkers,
    SellMarkers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub kind: SeriesKind,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn new(label: impl Into<String>, kind: SeriesKind, points: Vec<ChartPoint>) -> Self {
        Self {
            label: label.into(),
            kind,
            points,
        }
    }

    /// Last point that carries a value
    pub fn last_defined(&self) -> Option<ChartPoint> {
        self.points.iter().rev().find(|p| p.value.is_some()).copied()
    }

    /// Number of points that carry a value
    pub fn defined_len(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }
}

/// A titled chart with its explanatory text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPanel {
    pub title: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
    pub captions: Vec<String>,
}

impl ReportPanel {
    pub fn new(title: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            y_label: y_label.into(),
            series: Vec::new(),
            captions: Vec::new(),
        }
    }

    pub fn with_series(mut self, series: ChartSeries) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.captions.push(caption.into());
        self
    }

    pub fn series_named(&self, label: &str) -> Option<&ChartSeries> {
        self.series.iter().find(|s| s.label == label)
    }
}

/// A highlighted header followed by zero or more panels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub header: String,
    pub panels: Vec<ReportPanel>,
}

impl ReportSection {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            panels: Vec::new(),
        }
    }

    pub fn with_panel(mut self, panel: ReportPanel) -> Self {
        self.panels.push(panel);
        self
    }
}

/// The complete page for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub title: String,
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}

impl ResearchReport {
    pub fn section(&self, header: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.header == header)
    }

    /// Walk the report in page order, handing each part to the surface
    pub fn render_to(&self, surface: &mut dyn RenderSurface) -> std::io::Result<()> {
        surface.title(&self.title)?;
        for section in &self.sections {
            surface.header(&section.header)?;
            for panel in &section.panels {
                surface.panel(panel)?;
            }
        }
        surface.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<String>,
    }

    impl RenderSurface for RecordingSurface {
        fn title(&mut self, title: &str) -> std::io::Result<()> {
            self.calls.push(format!("title:{}", title));
            Ok(())
        }

        fn header(&mut self, header: &str) -> std::io::Result<()> {
            self.calls.push(format!("header:{}", header));
            Ok(())
        }

        fn panel(&mut self, panel: &ReportPanel) -> std::io::Result<()> {
            self.calls.push(format!("panel:{}", panel.title));
            Ok(())
        }

        fn finish(&mut self) -> std::io::Result<()> {
            self.calls.push("finish".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_last_defined_skips_gaps() {
        let series = ChartSeries::new(
            "MA",
            SeriesKind::Line,
            vec![
                ChartPoint::new(day(1), None),
                ChartPoint::new(day(2), Some(1.5)),
                ChartPoint::new(day(3), None),
            ],
        );

        assert_eq!(series.last_defined(), Some(ChartPoint::new(day(2), Some(1.5))));
        assert_eq!(series.defined_len(), 1);
    }

    #[test]
    fn test_render_to_visits_in_page_order() {
        let report = ResearchReport {
            title: "Equity Research".to_string(),
            symbol: "AMZN".to_string(),
            generated_at: Utc::now(),
            sections: vec![
                ReportSection::new("Stock - AMZN"),
                ReportSection::new("Financial Ratios")
                    .with_panel(ReportPanel::new("Price to Book Ratio", "P/B Ratio"))
                    .with_panel(ReportPanel::new("Price to Sales Ratio", "P/S Ratio")),
            ],
        };

        let mut surface = RecordingSurface::default();
        report.render_to(&mut surface).unwrap();

        assert_eq!(
            surface.calls,
            vec![
                "title:Equity Research",
                "header:Stock - AMZN",
                "header:Financial Ratios",
                "panel:Price to Book Ratio",
                "panel:Price to Sales Ratio",
                "finish",
            ]
        );
    }
}
