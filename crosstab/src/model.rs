// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

/// The content of one cell of a survey response.
///
/// Readers map whatever the source format provides into one of these.
#[derive(PartialEq, Debug, Clone)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    /// An empty cell, or a question the respondent did not answer.
    Missing,
}

impl Value {
    /// The category this value falls into, if any.
    ///
    /// Blank text and NaN floats are treated as missing. Floats holding an
    /// integral value fall into the same category as the matching integer:
    /// spreadsheets store most numbers as floats.
    pub fn category(&self) -> Option<Category> {
        match self {
            Value::Text(s) if s.trim().is_empty() => None,
            Value::Text(s) => Some(Category(s.clone())),
            Value::Int(i) => Some(Category(i.to_string())),
            Value::Float(f) if f.is_nan() => None,
            Value::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
                Some(Category((*f as i64).to_string()))
            }
            Value::Float(f) => Some(Category(f.to_string())),
            Value::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.category().is_none()
    }
}

/// A distinct value of a category column, in canonical text form.
#[derive(Eq, PartialEq, Debug, Clone, Hash, PartialOrd, Ord)]
pub struct Category(String);

impl Category {
    pub fn new(s: &str) -> Category {
        Category(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Category {
        Category::new(s)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The names of the columns of a dataset, in order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Schema {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Schema {
    pub fn new(columns: Vec<String>) -> Result<Schema, SchemaError> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (idx, name) in columns.iter().enumerate() {
            if positions.insert(name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateColumn {
                    column: name.clone(),
                });
            }
        }
        Ok(Schema { columns, positions })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).cloned()
    }

    /// The position of a column that must be present.
    pub fn require(&self, column: &str) -> Result<usize, SchemaError> {
        self.position(column).ok_or_else(|| SchemaError::MissingColumn {
            column: column.to_string(),
        })
    }
}

/// A table of survey responses.
///
/// It is built once by a reader and then only read. Every row holds exactly
/// one value per column of the schema.
#[derive(PartialEq, Debug, Clone)]
pub struct Dataset {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Builds a dataset from a header and its rows.
    ///
    /// Rows shorter than the header are completed with missing values, cells
    /// beyond the last named column are dropped.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Dataset, SchemaError> {
        let schema = Schema::new(columns)?;
        let width = schema.columns().len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Missing);
                row
            })
            .collect();
        Ok(Dataset { schema, rows })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        let schema = &self.schema;
        self.rows.iter().map(move |values| Record {
            schema,
            values: values.as_slice(),
        })
    }
}

/// A view over one row of a dataset.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    schema: &'a Schema,
    values: &'a [Value],
}

impl<'a> Record<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.schema
            .position(column)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn value_at(&self, position: usize) -> Option<&'a Value> {
        self.values.get(position)
    }

    pub fn category(&self, column: &str) -> Option<Category> {
        self.get(column).and_then(|v| v.category())
    }
}

// ********* Filters **********

/// Selects the records that belong to a subgroup.
///
/// Any closure over a record is a filter.
pub trait RecordFilter {
    fn matches(&self, record: &Record<'_>) -> bool;

    /// Checks that the columns the filter reads exist in the schema.
    fn check_schema(&self, _schema: &Schema) -> Result<(), SchemaError> {
        Ok(())
    }
}

impl<F> RecordFilter for F
where
    F: Fn(&Record<'_>) -> bool,
{
    fn matches(&self, record: &Record<'_>) -> bool {
        self(record)
    }
}

/// Every record of the dataset.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct AllRecords;

impl RecordFilter for AllRecords {
    fn matches(&self, _record: &Record<'_>) -> bool {
        true
    }
}

/// The records whose value in `column` falls into the category `value`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnEquals {
    pub column: String,
    pub value: Category,
}

impl ColumnEquals {
    pub fn new(column: &str, value: &str) -> ColumnEquals {
        ColumnEquals {
            column: column.to_string(),
            value: Category::new(value),
        }
    }
}

impl RecordFilter for ColumnEquals {
    fn matches(&self, record: &Record<'_>) -> bool {
        record.category(&self.column).as_ref() == Some(&self.value)
    }

    fn check_schema(&self, schema: &Schema) -> Result<(), SchemaError> {
        schema.require(&self.column).map(|_| ())
    }
}

// ******** Output data structures *********

/// Number of records per category value.
///
/// Entries are kept in the order in which the categories were first seen.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<(Category, u64)>,
    index: HashMap<Category, usize>,
}

impl FrequencyTable {
    pub fn new() -> FrequencyTable {
        FrequencyTable::default()
    }

    pub fn add(&mut self, category: Category) {
        self.add_count(category, 1);
    }

    pub fn add_count(&mut self, category: Category, count: u64) {
        if let Some(idx) = self.index.get(&category) {
            self.entries[*idx].1 += count;
        } else {
            self.index.insert(category.clone(), self.entries.len());
            self.entries.push((category, count));
        }
    }

    pub fn get(&self, category: &Category) -> Option<u64> {
        self.index.get(category).map(|idx| self.entries[*idx].1)
    }

    /// The count for a category given as text, 0 if it never occurs.
    pub fn count_of(&self, category: &str) -> u64 {
        self.get(&Category::new(category)).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of records counted in the table.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, u64)> {
        self.entries.iter().map(|(cat, c)| (cat, *c))
    }

    /// The entries by decreasing count. Ties keep their first-seen order.
    pub fn sorted_by_count(&self) -> Vec<(Category, u64)> {
        let mut res = self.entries.clone();
        res.sort_by(|a, b| b.1.cmp(&a.1));
        res
    }
}

/// One line of a comparison table.
#[derive(PartialEq, Debug, Clone)]
pub struct ComparisonRow {
    pub category: Category,
    /// Records of the subgroup in this category.
    pub count: u64,
    /// Records of the whole population in this category.
    pub total: u64,
    /// `count / total * 100`, or `None` when the total is zero.
    pub percentage: Option<f64>,
}

impl ComparisonRow {
    pub fn new(category: Category, count: u64, total: u64) -> ComparisonRow {
        let percentage = if total > 0 {
            Some((count as f64) / (total as f64) * 100.0)
        } else {
            None
        };
        ComparisonRow {
            category,
            count,
            total,
            percentage,
        }
    }
}

/// The share of a subgroup in each category of the population.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ComparisonTable {
    rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn from_rows(rows: Vec<ComparisonRow>) -> ComparisonTable {
        ComparisonTable { rows }
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn get(&self, category: &Category) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.category == *category)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_count(&self) -> u64 {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn total_population(&self) -> u64 {
        self.rows.iter().map(|r| r.total).sum()
    }
}

// ******** Errors *********

/// A column was requested that the dataset does not provide.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SchemaError {
    MissingColumn { column: String },
    DuplicateColumn { column: String },
}

impl Error for SchemaError {}

impl Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::MissingColumn { column } => {
                write!(f, "column {:?} does not exist in the dataset", column)
            }
            SchemaError::DuplicateColumn { column } => {
                write!(f, "column {:?} appears more than once in the header", column)
            }
        }
    }
}
