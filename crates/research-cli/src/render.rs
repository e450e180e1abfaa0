use research_core::{ChartSeries, RenderSurface, ReportPanel, SeriesKind};
use research_orchestrator::EquityResearch;
use std::io::Write;

use crate::config::OutputFormat;

/// Plain-text page: banners, panel titles, a one-line summary per series
pub struct TextSurface<W: Write> {
    out: W,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn series_line(&mut self, series: &ChartSeries) -> std::io::Result<()> {
        match series.kind {
            SeriesKind::Line | SeriesKind::MarkedLine => match series.last_defined() {
                Some(point) => writeln!(
                    self.out,
                    "  {}: {} points, latest {:.2} on {}",
                    series.label,
                    series.defined_len(),
                    point.value.unwrap_or_default(),
                    point.date
                ),
                None => writeln!(self.out, "  {}: no data", series.label),
            },
            SeriesKind::BuyMarkers | SeriesKind::SellMarkers => {
                if series.points.is_empty() {
                    return writeln!(self.out, "  {}: none", series.label);
                }
                let dates: Vec<String> = series
                    .points
                    .iter()
                    .map(|p| match p.value {
                        Some(close) => format!("{} @ {:.2}", p.date, close),
                        None => p.date.to_string(),
                    })
                    .collect();
                writeln!(
                    self.out,
                    "  {} ({}): {}",
                    series.label,
                    series.points.len(),
                    dates.join(", ")
                )
            }
        }
    }
}

impl<W: Write> RenderSurface for TextSurface<W> {
    fn title(&mut self, title: &str) -> std::io::Result<()> {
        writeln!(self.out, "{}", title)?;
        writeln!(self.out, "{}", "=".repeat(title.len()))
    }

    fn header(&mut self, header: &str) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "## {}", header)
    }

    fn panel(&mut self, panel: &ReportPanel) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", panel.title)?;
        for series in &panel.series {
            self.series_line(series)?;
        }
        for caption in &panel.captions {
            writeln!(self.out, "  {}", caption)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }
}

/// Write the research in the requested format
pub fn render<W: Write>(research: &EquityResearch, format: OutputFormat, out: W) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            let mut surface = TextSurface::new(out);
            research.report.render_to(&mut surface)?;
            let mut out = surface.into_inner();
            writeln!(out)?;
            writeln!(out, "Trend: {}", research.stance.to_label())?;
            match &research.latest_crossover {
                Some(c) => writeln!(
                    out,
                    "Latest crossover: {} on {} at {:.2}",
                    c.kind.to_label(),
                    c.date,
                    c.close
                )?,
                None => writeln!(out, "Latest crossover: none")?,
            }
        }
        OutputFormat::Json => {
            let mut out = out;
            serde_json::to_writer_pretty(&mut out, research)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
