// Primitives for reading Excel workbooks.

use calamine::DataType;
use chrono::Timelike;

use crate::report::{
    io_common::{header_name, text_value, unique_headers},
    *,
};

pub fn read_xlsx_dataset(path: &str, worksheet_name: Option<&str>) -> BReportResult<Dataset> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header_row = iter.next().context(EmptyInputSnafu { path })?;
    let header: Vec<String> = unique_headers(
        header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| header_name(idx, header_text(cell)))
            .collect(),
    );
    debug!("read_xlsx_dataset: header: {:?}", header);

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        // The header is line 1
        let lineno = (idx + 2) as u64;
        debug!("read_xlsx_dataset: lineno: {:?} row: {:?}", lineno, row);
        let mut values: Vec<Value> = Vec::with_capacity(row.len());
        for cell in row {
            values.push(read_cell(cell, lineno)?);
        }
        rows.push(values);
    }
    let dataset = Dataset::new(header, rows).context(SchemaSnafu {})?;
    Ok(dataset)
}

fn header_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => Some(s.clone()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

fn read_cell(cell: &DataType, lineno: u64) -> ReportResult<Value> {
    match cell {
        DataType::String(s) => Ok(text_value(s)),
        DataType::Int(i) => Ok(Value::Int(*i)),
        DataType::Float(f) => Ok(Value::Float(*f)),
        DataType::DateTime(_) => Ok(date_value(cell)),
        DataType::Bool(b) => Ok(Value::Text(b.to_string())),
        DataType::Empty => Ok(Value::Missing),
        DataType::Error(e) => {
            warn!("read_xlsx_dataset: line {}: cell error {:?}", lineno, e);
            Ok(Value::Missing)
        }
        #[allow(unreachable_patterns)]
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

/// Dates are reported as they read in the sheet, without the time of day
/// when it is midnight.
fn date_value(cell: &DataType) -> Value {
    match cell.as_datetime() {
        Some(dt) if dt.num_seconds_from_midnight() == 0 => {
            Value::Text(dt.format("%Y-%m-%d").to_string())
        }
        Some(dt) => Value::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        None => Value::Missing,
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> BReportResult<calamine::Range<DataType>> {
    debug!(
        "read_xlsx_dataset: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                worksheet_name,
            })?
            .context(OpeningExcelSnafu { path })?;
        return Ok(wrange);
    }

    let mut all_worksheets = workbook.worksheets();
    if all_worksheets.len() > 1 {
        warn!(
            "read_xlsx_dataset: {} has {} worksheets, using the first one ({:?}). Use --excel-worksheet-name to choose another one.",
            path,
            all_worksheets.len(),
            all_worksheets[0].0
        );
    }
    if all_worksheets.is_empty() {
        return Err(Box::new(ReportError::EmptyInput { path: path.into() }));
    }
    let (name, wrange) = all_worksheets.swap_remove(0);
    debug!("read_xlsx_dataset: using worksheet {:?}", name);
    Ok(wrange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    fn survey_xlsx() -> String {
        format!("{}/tests/data/survey.xlsx", env!("CARGO_MANIFEST_DIR"))
    }

    #[test]
    fn first_worksheet() {
        let dataset = read_xlsx_dataset(&survey_xlsx(), None).unwrap();
        assert_eq!(
            dataset.schema().columns(),
            &["उम्र", "जाति", "2023", "Unnamed: 3", "तारीख", "जाति.1"]
        );
        assert_eq!(dataset.len(), 3);

        // "NA" is a missing answer, as in csv files.
        let age = frequency_distribution(&dataset, "उम्र").unwrap();
        assert_eq!(age.total(), 2);
        assert_eq!(age.count_of("18-25"), 1);
        assert_eq!(age.count_of("26-40"), 1);

        let caste = frequency_distribution(&dataset, "जाति").unwrap();
        assert_eq!(caste.count_of("रोड़"), 2);
        assert_eq!(caste.count_of("जाट"), 1);

        // Numbers are stored as floats, the error cell is missing.
        let numbers = frequency_distribution(&dataset, "2023").unwrap();
        assert_eq!(numbers.total(), 2);
        assert_eq!(numbers.count_of("1"), 1);
        assert_eq!(numbers.count_of("2"), 1);

        let mixed = frequency_distribution(&dataset, "Unnamed: 3").unwrap();
        assert_eq!(mixed.total(), 2);
        assert_eq!(mixed.count_of("4.5"), 1);
        assert_eq!(mixed.count_of("true"), 1);

        let dates = frequency_distribution(&dataset, "तारीख").unwrap();
        assert_eq!(dates.total(), 2);
        assert_eq!(dates.count_of("2023-07-16"), 1);
        assert_eq!(dates.count_of("2023-07-16 12:00:00"), 1);

        let repeated = frequency_distribution(&dataset, "जाति.1").unwrap();
        assert_eq!(repeated.total(), 2);
        assert_eq!(repeated.count_of("हाँ"), 1);
    }

    #[test]
    fn named_worksheet() {
        let dataset = read_xlsx_dataset(&survey_xlsx(), Some("Notes")).unwrap();
        assert_eq!(dataset.schema().columns(), &["टिप्पणी"]);
        assert_eq!(dataset.len(), 1);

        let err = read_xlsx_dataset(&survey_xlsx(), Some("Sheet9")).unwrap_err();
        assert!(matches!(
            *err,
            ReportError::MissingWorksheet { ref worksheet_name, .. } if worksheet_name == "Sheet9"
        ));
    }

    #[test]
    fn cells() {
        assert_eq!(read_cell(&DataType::Int(3), 2).unwrap(), Value::Int(3));
        assert_eq!(read_cell(&DataType::Empty, 2).unwrap(), Value::Missing);
        assert_eq!(
            read_cell(&DataType::Error(CellErrorType::NA), 2).unwrap(),
            Value::Missing
        );
        assert_eq!(
            read_cell(&DataType::String("N/A".to_string()), 2).unwrap(),
            Value::Missing
        );
        assert_eq!(
            read_cell(&DataType::DateTime(44197.25), 2).unwrap(),
            Value::Text("2021-01-01 06:00:00".to_string())
        );
        assert_eq!(header_text(&DataType::Float(2023.0)), Some("2023".to_string()));
        assert_eq!(header_text(&DataType::Empty), None);
    }
}
