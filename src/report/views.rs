// The views of the report, and what each of them contains.

use crate::report::*;

/// How a distribution is meant to be drawn.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ChartKind {
    Bar,
    Pie,
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum View {
    Overview,
    Caste,
    Age,
    Profession,
    Education,
    Village,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Overview,
        View::Caste,
        View::Age,
        View::Profession,
        View::Education,
        View::Village,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::Caste => "caste",
            View::Age => "age",
            View::Profession => "profession",
            View::Education => "education",
            View::Village => "village",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Caste => "Caste-wise Analysis",
            View::Age => "Age-wise Analysis",
            View::Profession => "Profession-wise Analysis",
            View::Education => "Education-wise Analysis",
            View::Village => "Village-wise Analysis",
        }
    }

    /// Parses the `--view` argument: a view name or `all`.
    pub fn parse_selection(selection: &str) -> ReportResult<Vec<View>> {
        let s = selection.trim().to_lowercase();
        if s == "all" {
            return Ok(View::ALL.to_vec());
        }
        View::ALL
            .iter()
            .find(|v| v.name() == s)
            .map(|v| vec![*v])
            .context(UnknownViewSnafu { view: selection })
    }
}

/// A view that breaks the population and each candidate's supporters down
/// along one survey field.
struct DimensionView {
    view: View,
    field: Field,
    label: &'static str,
    chart: ChartKind,
}

const DIMENSION_VIEWS: [DimensionView; 5] = [
    DimensionView {
        view: View::Caste,
        field: Field::Caste,
        label: "Caste",
        chart: ChartKind::Bar,
    },
    DimensionView {
        view: View::Age,
        field: Field::Age,
        label: "Age",
        chart: ChartKind::Pie,
    },
    DimensionView {
        view: View::Profession,
        field: Field::Profession,
        label: "Profession",
        chart: ChartKind::Pie,
    },
    DimensionView {
        view: View::Education,
        field: Field::Education,
        label: "Education",
        chart: ChartKind::Pie,
    },
    DimensionView {
        view: View::Village,
        field: Field::Village,
        label: "Village",
        chart: ChartKind::Bar,
    },
];

const OVERVIEW_SECTIONS: [(Field, ChartKind); 9] = [
    (Field::Village, ChartKind::Bar),
    (Field::Age, ChartKind::Pie),
    (Field::Education, ChartKind::Pie),
    (Field::Caste, ChartKind::Bar),
    (Field::Profession, ChartKind::Pie),
    (Field::StateSatisfaction, ChartKind::Pie),
    (Field::MlaSatisfaction, ChartKind::Pie),
    (Field::PartyChoice, ChartKind::Bar),
    (Field::CandidatePreference, ChartKind::Bar),
];

#[derive(PartialEq, Debug, Clone)]
pub enum SectionBody {
    Distribution {
        table: FrequencyTable,
        chart: ChartKind,
    },
    Comparison {
        table: ComparisonTable,
    },
}

#[derive(PartialEq, Debug, Clone)]
pub struct Section {
    pub heading: String,
    /// The column being tabulated.
    pub column: String,
    /// Set when the section is restricted to the supporters of a candidate.
    pub candidate: Option<String>,
    pub body: SectionBody,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ViewReport {
    pub view: View,
    pub sections: Vec<Section>,
}

/// Everything a view needs. The dataset is only read.
pub struct ReportContext<'a> {
    pub dataset: &'a Dataset,
    pub bindings: &'a FieldBindings,
    pub candidates: &'a [SurveyCandidate],
}

pub fn build_view(ctx: &ReportContext<'_>, view: View) -> ReportResult<ViewReport> {
    info!("Building view {}", view.name());
    match DIMENSION_VIEWS.iter().find(|dv| dv.view == view) {
        Some(dv) => build_dimension_view(ctx, dv),
        None => build_overview(ctx),
    }
}

/// Builds the requested views. A view that fails does not prevent the
/// others from being built.
pub fn build_views(
    ctx: &ReportContext<'_>,
    views: &[View],
) -> (Vec<ViewReport>, Vec<(View, ReportError)>) {
    let mut reports: Vec<ViewReport> = Vec::new();
    let mut failures: Vec<(View, ReportError)> = Vec::new();
    for view in views {
        match build_view(ctx, *view) {
            Ok(r) => reports.push(r),
            Err(e) => {
                warn!("View {} could not be produced: {}", view.name(), e);
                failures.push((*view, e));
            }
        }
    }
    (reports, failures)
}

fn build_overview(ctx: &ReportContext<'_>) -> ReportResult<ViewReport> {
    let mut sections: Vec<Section> = Vec::new();
    for (field, chart) in OVERVIEW_SECTIONS {
        let column = match ctx.bindings.column(field)? {
            Some(c) => c,
            None if field.is_required() => ctx.bindings.require(field)?,
            None => {
                debug!("build_overview: skipping unbound field {}", field.key());
                continue;
            }
        };
        let table = frequency_distribution(ctx.dataset, column).context(SchemaSnafu {})?;
        sections.push(Section {
            heading: format!("{}. {}", sections.len() + 1, field.title()),
            column: column.to_string(),
            candidate: None,
            body: SectionBody::Distribution { table, chart },
        });
    }
    Ok(ViewReport {
        view: View::Overview,
        sections,
    })
}

fn build_dimension_view(ctx: &ReportContext<'_>, dv: &DimensionView) -> ReportResult<ViewReport> {
    let column = ctx.bindings.require(dv.field)?;
    let preference_column = ctx.bindings.require(Field::CandidatePreference)?;

    let mut sections: Vec<Section> = Vec::new();
    let population = frequency_distribution(ctx.dataset, column).context(SchemaSnafu {})?;
    sections.push(Section {
        heading: format!("1. {} distribution", dv.label),
        column: column.to_string(),
        candidate: None,
        body: SectionBody::Distribution {
            table: population,
            chart: dv.chart,
        },
    });

    for candidate in ctx.candidates {
        let name = candidate.display_name();
        let filter = ColumnEquals::new(preference_column, &candidate.name);

        let subgroup = frequency_distribution_where(ctx.dataset, column, &filter)
            .context(SchemaSnafu {})?;
        sections.push(Section {
            heading: format!("{}. {} distribution for {}", sections.len() + 1, dv.label, name),
            column: column.to_string(),
            candidate: Some(candidate.name.clone()),
            body: SectionBody::Distribution {
                table: subgroup,
                chart: dv.chart,
            },
        });

        let table = compare_frequencies(ctx.dataset, column, &filter).context(SchemaSnafu {})?;
        sections.push(Section {
            heading: format!("{}. {}-wise preference for {}", sections.len() + 1, dv.label, name),
            column: column.to_string(),
            candidate: Some(candidate.name.clone()),
            body: SectionBody::Comparison { table },
        });
    }

    Ok(ViewReport {
        view: dv.view,
        sections,
    })
}
