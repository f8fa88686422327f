// Primitives for reading CSV files.

use std::fs::File;

use crate::report::{
    io_common::{header_name, parse_text_cell, unique_headers},
    *,
};

pub fn read_csv_dataset(path: &str) -> BReportResult<Dataset> {
    let mut records = get_records(path)?;

    let header: Vec<String> = match records.next() {
        Some(line_r) => {
            let line = line_r.context(CsvLineParseSnafu { lineno: 1usize })?;
            unique_headers(
                line.iter()
                    .enumerate()
                    .map(|(idx, s)| header_name(idx, Some(s.to_string())))
                    .collect(),
            )
        }
        None => return Err(Box::new(ReportError::EmptyInput { path: path.into() })),
    };
    debug!("read_csv_dataset: header: {:?}", header);

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is line 1
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_dataset: lineno: {:?} row: {:?}", lineno, line);
        if line.len() > header.len() {
            warn!(
                "read_csv_dataset: line {} has {} cells for {} columns, dropping the extra cells",
                lineno,
                line.len(),
                header.len()
            );
        }
        rows.push(line.iter().map(parse_text_cell).collect());
    }
    let dataset = Dataset::new(header, rows).context(SchemaSnafu {})?;
    Ok(dataset)
}

fn get_records(path: &str) -> ReportResult<csv::StringRecordsIntoIter<File>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    Ok(rdr.into_records())
}
