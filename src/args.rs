use clap::Parser;

/// This program renders a dashboard of the suspicious votes found in a table of ballot records.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the settings of the dashboard.
    /// For more information about the file format, read the manual of the voter_fraud crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path or empty) The table of vote records. Setting this option overrides the
    /// file that may be specified with the --config option. Without an input, only the
    /// upload prompt is rendered.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, 'stdout' or empty) Where the HTML dashboard is written.
    /// Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, 'stdout' or empty) If specified, a summary of the statistics will be written
    /// in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    /// (file path) A reference file containing the summary in JSON format. If provided, fraudview
    /// will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (name or key, default: first non-empty category) The category of suspicious voters to inspect:
    /// identity-theft, cross-constituency, double-voting or all-suspicious.
    #[clap(long, value_parser)]
    pub category: Option<String>,

    /// (voter id, default: first voter of the category) The voter whose records are displayed.
    #[clap(long, value_parser)]
    pub voter: Option<String>,

    /// (default identity-theft) The analytics tab shown first: identity-theft,
    /// cross-constituency or double-voting.
    #[clap(long, value_parser)]
    pub tab: Option<String>,

    /// (directory) The directory against which relative image paths are resolved.
    #[clap(long, value_parser)]
    pub image_root: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
