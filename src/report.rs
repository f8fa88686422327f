use log::{debug, info, warn};

use crosstab::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;
use crate::report::render::*;
use crate::report::views::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;
pub mod render;
pub mod views;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {worksheet_name:?} not found in {path}"))]
    MissingWorksheet {
        path: String,
        worksheet_name: String,
    },
    #[snafu(display("{path} does not contain a header row"))]
    EmptyInput { path: String },
    #[snafu(display("Line {lineno}: cannot read cell {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Input type {provider:?} is not supported (use xlsx or csv)"))]
    UnknownProvider { provider: String },
    #[snafu(display("No input file: use --input or the dataSource section of the configuration"))]
    MissingInput {},
    #[snafu(display("Error opening file {path}"))]
    OpeningJson { source: std::io::Error, path: String },
    #[snafu(display("Error parsing json"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingOutput { source: std::io::Error, path: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Field {field} is not bound to a column"))]
    MissingField { field: String },
    #[snafu(display("Field {field}: {reference} does not designate a column"))]
    BadFieldReference { field: String, reference: String },
    #[snafu(display("Expected FIELD=COLUMN with a known field, got {argument:?}"))]
    BadFieldArgument { argument: String },
    #[snafu(display("Unknown view {view:?}"))]
    UnknownView { view: String },
    #[snafu(display("{source}"))]
    Schema { source: SchemaError },
    #[snafu(display("{failed} view(s) could not be produced"))]
    ViewsFailed { failed: usize },
    #[snafu(display("Difference detected between the report and the reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

pub type BReportResult<T> = Result<T, Box<ReportError>>;

/// The input resolved from the command line and the configuration file.
#[derive(Eq, PartialEq, Debug, Clone)]
struct InputSpec {
    path: String,
    provider: String,
    worksheet_name: Option<String>,
}

fn resolve_input(args: &Args, config: &ReportConfig, root: &Path) -> ReportResult<InputSpec> {
    let source = config.data_source.as_ref();
    let path: String = match (&args.input, source) {
        (Some(p), _) => p.clone(),
        (None, Some(ds)) => {
            let p: PathBuf = root.join(&ds.file_path);
            p.display().to_string()
        }
        (None, None) => return MissingInputSnafu {}.fail(),
    };
    let provider = match args
        .input_type
        .clone()
        .or_else(|| source.and_then(|ds| ds.provider.clone()))
        .or_else(|| io_common::infer_provider(&path))
    {
        Some(p) => p,
        None => {
            whatever!(
                "Cannot guess the type of {}, use --input-type",
                io_common::simplify_file_name(&path)
            )
        }
    };
    let worksheet_name = args
        .excel_worksheet_name
        .clone()
        .or_else(|| source.and_then(|ds| ds.excel_worksheet_name.clone()));
    Ok(InputSpec {
        path,
        provider,
        worksheet_name,
    })
}

fn read_dataset(input: &InputSpec) -> BReportResult<Dataset> {
    info!("Attempting to read survey file {:?}", input.path);
    let dataset = match input.provider.as_str() {
        "xlsx" | "excel" => io_xlsx::read_xlsx_dataset(&input.path, input.worksheet_name.as_deref()),
        "csv" => io_csv::read_csv_dataset(&input.path),
        x => {
            return Err(Box::new(ReportError::UnknownProvider {
                provider: x.to_string(),
            }))
        }
    }?;
    info!(
        "Read {} responses with {} columns",
        dataset.len(),
        dataset.schema().columns().len()
    );
    Ok(dataset)
}

/// Applies the `--field` and `--candidate` arguments over the configuration.
fn apply_overrides(args: &Args, config: &mut ReportConfig) -> ReportResult<()> {
    for argument in args.fields.iter() {
        let (field, reference) = parse_field_argument(argument)?;
        config.fields.set(field, reference);
    }
    if !args.candidates.is_empty() {
        config.candidates = args
            .candidates
            .iter()
            .map(|name| SurveyCandidate {
                name: name.clone(),
                label: None,
            })
            .collect();
    }
    Ok(())
}

fn load_config(args: &Args) -> BReportResult<(ReportConfig, PathBuf)> {
    match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            Ok((config, root))
        }
        None => Ok((ReportConfig::default(), PathBuf::from("."))),
    }
}

fn write_output<W: Write>(path: &str, contents: &str, out: &mut W) -> ReportResult<()> {
    if path == "stdout" {
        writeln!(out, "{}", contents).context(WritingOutputSnafu { path })
    } else {
        info!("Writing summary to {}", path);
        fs::write(path, contents).context(WritingOutputSnafu { path })
    }
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> BReportResult<()> {
    let summary_ref: JSValue = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary {}", reference_path);
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return Err(Box::new(ReportError::ReferenceMismatch {}));
    }
    info!("The report matches the reference summary");
    Ok(())
}

/// Loads the survey, builds the requested views and writes them out.
///
/// A view that fails is reported and skipped; the run still fails at the end.
pub fn run_report(args: &Args) -> BReportResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_report_to(args, &mut out)
}

/// Like [`run_report`], with the text report (and a summary sent to
/// `stdout`) written to `out`.
pub fn run_report_to<W: Write>(args: &Args, out: &mut W) -> BReportResult<()> {
    let views = View::parse_selection(&args.view)?;

    let (mut config, root) = load_config(args)?;
    apply_overrides(args, &mut config)?;
    debug!("run_report: config: {:?}", config);

    let input = resolve_input(args, &config, &root)?;
    let dataset = read_dataset(&input)?;
    let bindings = FieldBindings::resolve(&config.fields, dataset.schema())?;

    if config.candidates.is_empty() {
        warn!("No candidates configured, only the distributions will be reported");
    }

    let ctx = ReportContext {
        dataset: &dataset,
        bindings: &bindings,
        candidates: &config.candidates,
    };
    let (reports, failures) = build_views(&ctx, &views);

    let json_to_stdout = args.out.as_deref() == Some("stdout");
    if !json_to_stdout {
        let mut renderer = TextRenderer::new(&mut *out);
        render_all(&mut renderer, &config.report_settings, &reports, &failures)
            .context(WritingOutputSnafu { path: "stdout" })?;
    }

    if args.out.is_some() || args.reference.is_some() {
        let summary_js = build_summary_js(&config.report_settings, &reports, &failures);
        let pretty_js_stats =
            serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
        if let Some(out_path) = &args.out {
            write_output(out_path, &pretty_js_stats, out)?;
        }
        // The reference summary, if provided for comparison
        if let Some(reference_path) = &args.reference {
            check_reference(reference_path, &pretty_js_stats)?;
        }
    }

    if !failures.is_empty() {
        return Err(Box::new(ReportError::ViewsFailed {
            failed: failures.len(),
        }));
    }
    Ok(())
}

fn render_all<R: ChartRenderer + ?Sized>(
    renderer: &mut R,
    settings: &ReportSettings,
    reports: &[ViewReport],
    failures: &[(View, ReportError)],
) -> io::Result<()> {
    if let Some(title) = &settings.title {
        renderer.title(title, settings.subtitle.as_deref())?;
    }
    for report in reports.iter() {
        render_view(renderer, report)?;
        renderer.heading("")?;
    }
    for (view, e) in failures.iter() {
        renderer.heading(&format!("{}: not available ({})", view.title(), e))?;
    }
    Ok(())
}
