/*!

This is the long-form manual for `crosstab` and `surveytab`.

## Input formats

The following formats are supported:
* `xlsx` Excel workbooks
* `csv` Comma Separated Values

In both cases the first row holds the column names and every following row
is one response. Empty cells are missing answers: they are not counted in
any table.

### `xlsx`

If the workbook has more than one worksheet, pass `--excel-worksheet-name`
(or `excelWorksheetName` in the configuration). Otherwise the first worksheet
is used.

Dates are reported as `2023-07-16`, with the time of day when it is not
midnight. Cells holding an Excel error (`#DIV/0!`, ...) are missing answers.

### `csv`

Cells are read as integers or decimal numbers when they look like one, and
as text otherwise.

In both formats, `NA`, `N/A`, `#N/A`, `NaN`, `nan`, `null` and `NULL` are
read as missing answers. A column name that appears more than once gets a
`.1`, `.2`, ... suffix: the second `जाति` column is `जाति.1`.

## Configuration

The configuration is a JSON file:

```json
{
  "reportSettings": { "title": "Gharaunda Analysis Report", "subtitle": "Name: ..." },
  "dataSource": { "provider": "xlsx", "filePath": "Survey Complete.xlsx" },
  "fields": {
    "candidatePreference": "I",
    "village": "ग्राम पंचायत का नाम / नगर पालिका का नाम?",
    "age": "उम्र",
    "education": 4,
    "caste": "जाति",
    "profession": "रोजगार"
  },
  "candidates": [ { "name": "हरविन्द्र कल्याण", "label": "Harvinder Kalyan" } ]
}
```

`filePath` is relative to the directory of the configuration file.

Each field refers to a column by its name, by its number (the first column
is `1`), or by its Excel letter (`"A"` is the first column). A name always
takes precedence. Numbers and letters are turned into names when the file is
loaded.

The fields `candidatePreference`, `village`, `age`, `education`, `caste` and
`profession` are required. `stateSatisfaction`, `mlaSatisfaction` and
`partyChoice` are optional and only appear in the overview.

Every option can also be given on the command line:

```bash
surveytab -i survey.csv --field candidatePreference=I --field caste=जाति ... \
  --candidate "हरविन्द्र कल्याण" --view caste
```

## Views

* `overview` the distribution of every field
* `caste`, `age`, `profession`, `education`, `village` the distribution of
  one field, then for each candidate the distribution among the candidate's
  supporters and the comparison table
* `all` (default) all of the above

A comparison table gives, for each value of the field:
* `Count` the supporters of the candidate with this value
* `Total` all the respondents with this value, whatever their preference
* `Percentage` `Count / Total * 100`

`Total` includes the respondents who did not answer the preference question.

If a view cannot be produced (for example because a field refers to a
column the file does not have), the other views are still produced and
`surveytab` exits with an error.

## Output

The report is printed as text. With `--out`, a JSON summary is also written.
A summary written this way can be passed back with `--reference` to check
that a later run produces the same numbers.

*/
