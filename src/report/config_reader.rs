use std::collections::HashMap;
use std::fs;

use crate::report::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// The survey questions the report knows about.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Field {
    CandidatePreference,
    Village,
    Age,
    Education,
    Caste,
    Profession,
    StateSatisfaction,
    MlaSatisfaction,
    PartyChoice,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::CandidatePreference,
        Field::Village,
        Field::Age,
        Field::Education,
        Field::Caste,
        Field::Profession,
        Field::StateSatisfaction,
        Field::MlaSatisfaction,
        Field::PartyChoice,
    ];

    /// The key used in the configuration file and with `--field`.
    pub fn key(&self) -> &'static str {
        match self {
            Field::CandidatePreference => "candidatePreference",
            Field::Village => "village",
            Field::Age => "age",
            Field::Education => "education",
            Field::Caste => "caste",
            Field::Profession => "profession",
            Field::StateSatisfaction => "stateSatisfaction",
            Field::MlaSatisfaction => "mlaSatisfaction",
            Field::PartyChoice => "partyChoice",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().find(|f| f.key() == key).cloned()
    }

    /// Only the overview uses the optional fields.
    pub fn is_required(&self) -> bool {
        !matches!(
            self,
            Field::StateSatisfaction | Field::MlaSatisfaction | Field::PartyChoice
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            Field::CandidatePreference => "Candidate Preference",
            Field::Village => "Villages",
            Field::Age => "Age",
            Field::Education => "Education",
            Field::Caste => "Caste",
            Field::Profession => "Employment",
            Field::StateSatisfaction => "State Government Satisfaction",
            Field::MlaSatisfaction => "MLA Satisfaction",
            Field::PartyChoice => "Party Choice",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportSettings {
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

/// The columns holding each survey field, as written in the configuration.
///
/// A reference is either a column name, a column number (starting at 1) or
/// an Excel column letter.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct FieldRefs {
    #[serde(rename = "candidatePreference")]
    pub candidate_preference: Option<JSValue>,
    pub village: Option<JSValue>,
    pub age: Option<JSValue>,
    pub education: Option<JSValue>,
    pub caste: Option<JSValue>,
    pub profession: Option<JSValue>,
    #[serde(rename = "stateSatisfaction")]
    pub state_satisfaction: Option<JSValue>,
    #[serde(rename = "mlaSatisfaction")]
    pub mla_satisfaction: Option<JSValue>,
    #[serde(rename = "partyChoice")]
    pub party_choice: Option<JSValue>,
}

impl FieldRefs {
    pub fn get(&self, field: Field) -> Option<&JSValue> {
        match field {
            Field::CandidatePreference => self.candidate_preference.as_ref(),
            Field::Village => self.village.as_ref(),
            Field::Age => self.age.as_ref(),
            Field::Education => self.education.as_ref(),
            Field::Caste => self.caste.as_ref(),
            Field::Profession => self.profession.as_ref(),
            Field::StateSatisfaction => self.state_satisfaction.as_ref(),
            Field::MlaSatisfaction => self.mla_satisfaction.as_ref(),
            Field::PartyChoice => self.party_choice.as_ref(),
        }
    }

    pub fn set(&mut self, field: Field, reference: JSValue) {
        let slot = match field {
            Field::CandidatePreference => &mut self.candidate_preference,
            Field::Village => &mut self.village,
            Field::Age => &mut self.age,
            Field::Education => &mut self.education,
            Field::Caste => &mut self.caste,
            Field::Profession => &mut self.profession,
            Field::StateSatisfaction => &mut self.state_satisfaction,
            Field::MlaSatisfaction => &mut self.mla_satisfaction,
            Field::PartyChoice => &mut self.party_choice,
        };
        *slot = Some(reference);
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyCandidate {
    /// The value found in the candidate preference column.
    pub name: String,
    /// How the candidate is called in headings. Defaults to the name.
    pub label: Option<String>,
}

impl SurveyCandidate {
    pub fn display_name(&self) -> &str {
        match &self.label {
            Some(l) if !l.is_empty() => l.as_str(),
            _ => self.name.as_str(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    #[serde(rename = "reportSettings", default)]
    pub report_settings: ReportSettings,
    #[serde(rename = "dataSource")]
    pub data_source: Option<DataSource>,
    #[serde(default)]
    pub fields: FieldRefs,
    #[serde(default)]
    pub candidates: Vec<SurveyCandidate>,
}

pub fn read_config(path: &str) -> BReportResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ReportConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Reads a JSON summary previously written with `--out`.
pub fn read_summary(path: &str) -> BReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Parses a `key=column` command line argument.
pub fn parse_field_argument(argument: &str) -> ReportResult<(Field, JSValue)> {
    let (key, column) = argument
        .split_once('=')
        .context(BadFieldArgumentSnafu { argument })?;
    let field = Field::from_key(key.trim()).context(BadFieldArgumentSnafu { argument })?;
    Ok((field, JSValue::String(column.to_string())))
}

/// The survey fields bound to the columns of a loaded dataset.
///
/// Positions used in the configuration are turned into column names once,
/// when the dataset is loaded. A reference to a column the dataset does not
/// have is kept as an error: it only fails the views that read this field.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FieldBindings {
    columns: HashMap<Field, Result<String, SchemaError>>,
}

impl FieldBindings {
    pub fn resolve(refs: &FieldRefs, schema: &Schema) -> BReportResult<FieldBindings> {
        let mut columns: HashMap<Field, Result<String, SchemaError>> = HashMap::new();
        for field in Field::ALL {
            match refs.get(field) {
                Some(reference) => match resolve_column(field, reference, schema) {
                    Ok(column) => {
                        debug!("FieldBindings: {} -> {:?}", field.key(), column);
                        columns.insert(field, Ok(column));
                    }
                    Err(ReportError::Schema { source }) => {
                        warn!("Field {}: {}", field.key(), source);
                        columns.insert(field, Err(source));
                    }
                    Err(e) => return Err(Box::new(e)),
                },
                None if field.is_required() => {
                    return Err(Box::new(ReportError::MissingField {
                        field: field.key().to_string(),
                    }));
                }
                None => {
                    debug!("FieldBindings: optional field {} not bound", field.key());
                }
            }
        }
        Ok(FieldBindings { columns })
    }

    pub fn from_columns(columns: HashMap<Field, String>) -> FieldBindings {
        FieldBindings {
            columns: columns.into_iter().map(|(f, c)| (f, Ok(c))).collect(),
        }
    }

    /// The column of a field, `None` if the field is not bound.
    pub fn column(&self, field: Field) -> ReportResult<Option<&str>> {
        match self.columns.get(&field) {
            Some(Ok(c)) => Ok(Some(c.as_str())),
            Some(Err(e)) => Err(ReportError::Schema { source: e.clone() }),
            None => Ok(None),
        }
    }

    pub fn require(&self, field: Field) -> ReportResult<&str> {
        self.column(field)?
            .context(MissingFieldSnafu { field: field.key() })
    }
}

fn resolve_column(field: Field, reference: &JSValue, schema: &Schema) -> ReportResult<String> {
    let columns = schema.columns();
    let bad_reference = || BadFieldReferenceSnafu {
        field: field.key(),
        reference: reference.to_string(),
    };
    let (position, text): (usize, String) = match reference {
        // Column numbers start at 1 to respect most conventions in the excel world
        JSValue::Number(n) => {
            let position = n
                .as_u64()
                .filter(|x| *x >= 1)
                .map(|x| (x - 1) as usize)
                .with_context(bad_reference)?;
            (position, n.to_string())
        }
        // Names always win over the other interpretations.
        JSValue::String(s) if schema.contains(s) => return Ok(s.clone()),
        JSValue::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            (excel_column_position(s).with_context(bad_reference)?, s.clone())
        }
        JSValue::String(s) => match s.parse::<usize>() {
            Ok(x) if x >= 1 => (x - 1, s.clone()),
            _ => {
                return Err(ReportError::Schema {
                    source: SchemaError::MissingColumn { column: s.clone() },
                })
            }
        },
        _ => return bad_reference().fail(),
    };
    match columns.get(position) {
        Some(c) => Ok(c.clone()),
        None => Err(ReportError::Schema {
            source: SchemaError::MissingColumn { column: text },
        }),
    }
}

/// `A` is the first column, `Z` the 26th, `AA` the 27th.
fn excel_column_position(letters: &str) -> Option<usize> {
    if letters.len() > 3 {
        return None;
    }
    let mut res: usize = 0;
    for c in letters.to_ascii_uppercase().chars() {
        res = res * 26 + (c as usize - 'A' as usize + 1);
    }
    Some(res - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        let names: Vec<String> = (0..30).map(|i| format!("col{}", i)).collect();
        Schema::new(names).unwrap()
    }

    #[test]
    fn column_references() {
        let schema = schema();
        let f = Field::Caste;
        assert_eq!(resolve_column(f, &json!("col7"), &schema).unwrap(), "col7");
        assert_eq!(resolve_column(f, &json!(1), &schema).unwrap(), "col0");
        assert_eq!(resolve_column(f, &json!("9"), &schema).unwrap(), "col8");
        assert_eq!(resolve_column(f, &json!("I"), &schema).unwrap(), "col8");
        assert_eq!(resolve_column(f, &json!("i"), &schema).unwrap(), "col8");
        assert_eq!(resolve_column(f, &json!("AB"), &schema).unwrap(), "col27");
    }

    #[test]
    fn bad_column_references() {
        let schema = schema();
        let f = Field::Age;
        assert!(matches!(
            resolve_column(f, &json!(0), &schema),
            Err(ReportError::BadFieldReference { .. })
        ));
        assert!(matches!(
            resolve_column(f, &json!("ABCD"), &schema),
            Err(ReportError::BadFieldReference { .. })
        ));
        // Past the last column.
        assert!(matches!(
            resolve_column(f, &json!(31), &schema),
            Err(ReportError::Schema { source: SchemaError::MissingColumn { ref column } }) if column == "31"
        ));
        assert!(matches!(
            resolve_column(f, &json!("ZZ"), &schema),
            Err(ReportError::Schema { .. })
        ));
        assert!(matches!(
            resolve_column(f, &json!(true), &schema),
            Err(ReportError::BadFieldReference { .. })
        ));
        assert!(matches!(
            resolve_column(f, &json!("no such column"), &schema),
            Err(ReportError::Schema { .. })
        ));
    }

    #[test]
    fn required_fields() {
        let schema = schema();
        let mut refs = FieldRefs::default();
        for (idx, field) in Field::ALL.iter().enumerate() {
            if field.is_required() {
                refs.set(*field, json!(idx + 1));
            }
        }
        let bindings = FieldBindings::resolve(&refs, &schema).unwrap();
        assert_eq!(bindings.column(Field::CandidatePreference).unwrap(), Some("col0"));
        assert_eq!(bindings.column(Field::PartyChoice).unwrap(), None);
        assert!(matches!(
            bindings.require(Field::PartyChoice),
            Err(ReportError::MissingField { .. })
        ));

        refs.caste = None;
        let err = FieldBindings::resolve(&refs, &schema).unwrap_err();
        assert!(matches!(*err, ReportError::MissingField { ref field } if field == "caste"));
    }

    #[test]
    fn unknown_columns_are_kept_per_field() {
        let schema = schema();
        let mut refs = FieldRefs::default();
        for (idx, field) in Field::ALL.iter().enumerate() {
            if field.is_required() {
                refs.set(*field, json!(idx + 1));
            }
        }
        refs.set(Field::PartyChoice, json!("no such question"));
        refs.set(Field::Village, json!(99));
        let bindings = FieldBindings::resolve(&refs, &schema).unwrap();
        assert_eq!(bindings.require(Field::Caste).unwrap(), "col4");
        assert!(matches!(
            bindings.column(Field::PartyChoice),
            Err(ReportError::Schema { source: SchemaError::MissingColumn { ref column } })
                if column == "no such question"
        ));
        assert!(matches!(
            bindings.require(Field::Village),
            Err(ReportError::Schema { .. })
        ));

        // A reference that cannot designate any column still stops the run.
        refs.set(Field::Age, json!(true));
        let err = FieldBindings::resolve(&refs, &schema).unwrap_err();
        assert!(matches!(*err, ReportError::BadFieldReference { .. }));
    }

    #[test]
    fn field_arguments() {
        let (field, reference) = parse_field_argument("partyChoice=J").unwrap();
        assert_eq!(field, Field::PartyChoice);
        assert_eq!(reference, json!("J"));
        // Column names may contain '='
        let (_, reference) = parse_field_argument("caste=a=b").unwrap();
        assert_eq!(reference, json!("a=b"));
        assert!(parse_field_argument("caste").is_err());
        assert!(parse_field_argument("religion=K").is_err());
    }

    #[test]
    fn parse_config() {
        let js = r#"{
            "reportSettings": {"title": "Gharaunda Analysis Report"},
            "dataSource": {"provider": "csv", "filePath": "survey.csv"},
            "fields": {"candidatePreference": "I", "age": 3},
            "candidates": [{"name": "X", "label": "Mr. X"}, {"name": "Y"}]
        }"#;
        let config: ReportConfig = serde_json::from_str(js).unwrap();
        assert_eq!(
            config.report_settings.title.as_deref(),
            Some("Gharaunda Analysis Report")
        );
        assert_eq!(config.fields.age, Some(json!(3)));
        assert_eq!(config.candidates[0].display_name(), "Mr. X");
        assert_eq!(config.candidates[1].display_name(), "Y");
        assert_eq!(
            config.data_source.unwrap().excel_worksheet_name,
            None::<String>
        );
    }
}
