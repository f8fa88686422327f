use std::io::{self, Write};

use serde_json::json;
use serde_json::Value as JSValue;

use crate::report::views::*;
use crate::report::*;

/// Receives the tables of a report, in order.
pub trait ChartRenderer {
    fn title(&mut self, title: &str, subtitle: Option<&str>) -> io::Result<()>;
    fn view_title(&mut self, title: &str) -> io::Result<()>;
    fn heading(&mut self, heading: &str) -> io::Result<()>;
    fn distribution(&mut self, table: &FrequencyTable, chart: ChartKind) -> io::Result<()>;
    fn comparison(&mut self, table: &ComparisonTable) -> io::Result<()>;
}

pub fn render_view<R: ChartRenderer + ?Sized>(
    renderer: &mut R,
    report: &ViewReport,
) -> io::Result<()> {
    renderer.view_title(report.view.title())?;
    for section in report.sections.iter() {
        renderer.heading(&section.heading)?;
        match &section.body {
            SectionBody::Distribution { table, chart } => renderer.distribution(table, *chart)?,
            SectionBody::Comparison { table } => renderer.comparison(table)?,
        }
    }
    Ok(())
}

/// Plain text output, for a terminal.
pub struct TextRenderer<W: Write> {
    out: W,
    bar_width: usize,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> TextRenderer<W> {
        TextRenderer { out, bar_width: 40 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

fn label_width<'a, I: Iterator<Item = &'a str>>(labels: I) -> usize {
    labels.map(|s| s.chars().count()).max().unwrap_or(0).max(5)
}

pub fn format_percentage(p: Option<f64>) -> String {
    match p {
        Some(x) => format!("{:.2}", x),
        None => "n/a".to_string(),
    }
}

impl<W: Write> ChartRenderer for TextRenderer<W> {
    fn title(&mut self, title: &str, subtitle: Option<&str>) -> io::Result<()> {
        writeln!(self.out, "{}", title)?;
        writeln!(self.out, "{}", "=".repeat(title.chars().count()))?;
        if let Some(s) = subtitle {
            writeln!(self.out, "{}", s)?;
        }
        writeln!(self.out)
    }

    fn view_title(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out, "{}", title)?;
        writeln!(self.out, "{}", "-".repeat(title.chars().count()))
    }

    fn heading(&mut self, heading: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", heading)
    }

    fn distribution(&mut self, table: &FrequencyTable, chart: ChartKind) -> io::Result<()> {
        if table.is_empty() {
            return writeln!(self.out, "  (no responses)");
        }
        let entries = table.sorted_by_count();
        let width = label_width(entries.iter().map(|(c, _)| c.as_str()));
        let total = table.total();
        let max = entries.first().map(|(_, n)| *n).unwrap_or(0);
        for (category, count) in entries.iter() {
            let graphic = match chart {
                ChartKind::Bar => {
                    let len = ((*count as f64) / (max as f64) * (self.bar_width as f64)).round()
                        as usize;
                    "#".repeat(len.max(1))
                }
                ChartKind::Pie => {
                    format!("{:>6.2}%", (*count as f64) / (total as f64) * 100.0)
                }
            };
            writeln!(
                self.out,
                "  {}  {:>6}  {}",
                pad(category.as_str(), width),
                count,
                graphic
            )?;
        }
        Ok(())
    }

    fn comparison(&mut self, table: &ComparisonTable) -> io::Result<()> {
        if table.is_empty() {
            return writeln!(self.out, "  (no responses)");
        }
        let width = label_width(table.rows().iter().map(|r| r.category.as_str()));
        writeln!(
            self.out,
            "  {}  {:>6}  {:>6}  {:>10}",
            pad("", width),
            "Count",
            "Total",
            "Percentage"
        )?;
        for row in table.rows() {
            writeln!(
                self.out,
                "  {}  {:>6}  {:>6}  {:>10}",
                pad(row.category.as_str(), width),
                row.count,
                row.total,
                format_percentage(row.percentage)
            )?;
        }
        Ok(())
    }
}

fn distribution_to_json(table: &FrequencyTable) -> Vec<JSValue> {
    table
        .sorted_by_count()
        .iter()
        .map(|(category, count)| json!({"value": category.as_str(), "count": count}))
        .collect()
}

fn comparison_to_json(table: &ComparisonTable) -> Vec<JSValue> {
    table
        .rows()
        .iter()
        .map(|r| {
            json!({
                "value": r.category.as_str(),
                "count": r.count,
                "total": r.total,
                "percentage": r.percentage,
            })
        })
        .collect()
}

fn section_to_json(section: &Section) -> JSValue {
    match &section.body {
        SectionBody::Distribution { table, chart } => json!({
            "heading": section.heading,
            "column": section.column,
            "candidate": section.candidate,
            "kind": "distribution",
            "chart": chart.name(),
            "table": distribution_to_json(table),
        }),
        SectionBody::Comparison { table } => json!({
            "heading": section.heading,
            "column": section.column,
            "candidate": section.candidate,
            "kind": "comparison",
            "table": comparison_to_json(table),
        }),
    }
}

/// The JSON summary of a run, as written with `--out`.
pub fn build_summary_js(
    settings: &ReportSettings,
    reports: &[ViewReport],
    failures: &[(View, ReportError)],
) -> JSValue {
    let views: Vec<JSValue> = reports
        .iter()
        .map(|r| {
            json!({
                "view": r.view.name(),
                "title": r.view.title(),
                "sections": r.sections.iter().map(section_to_json).collect::<Vec<JSValue>>(),
            })
        })
        .collect();
    let errors: Vec<JSValue> = failures
        .iter()
        .map(|(v, e)| json!({"view": v.name(), "error": e.to_string()}))
        .collect();
    json!({
        "report": settings,
        "views": views,
        "errors": errors,
    })
}
