use clap::Parser;

/// Cross-tabulation report for constituency surveys.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the report: the survey file, the columns holding each
    /// question and the candidates to compare. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) A reference summary in JSON format. If provided, surveytab checks that the
    /// produced summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the report will be written in JSON format
    /// to the given location. With 'stdout', the JSON replaces the text report.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The survey file. Setting this option overrides the file of the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv) The type of the input. Guessed from the extension when not specified.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (overview, caste, age, profession, education, village or all) The view to produce.
    #[clap(long, value_parser, default_value = "all")]
    pub view: String,

    /// (FIELD=COLUMN, repeatable) Binds a survey field (candidatePreference, village, age, education, caste,
    /// profession, stateSatisfaction, mlaSatisfaction, partyChoice) to a column name, a column number
    /// starting at 1, or an Excel column letter.
    #[clap(long = "field", value_parser)]
    pub fields: Vec<String>,

    /// (repeatable) A candidate to compare, as written in the candidate preference column. Replaces the
    /// candidates of the configuration.
    #[clap(long = "candidate", value_parser)]
    pub candidates: Vec<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
