use log::{debug, info, warn};

use voter_fraud::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::dashboard::config_reader::*;
use crate::dashboard::io_common::InputType;
use crate::dashboard::view::{resolve_stage, ViewState};

pub mod charts;
pub mod config_reader;
pub mod images;
mod io_common;
mod io_csv;
mod io_excel;
pub mod render_html;
pub mod summary;
pub mod view;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DashboardError {
    #[snafu(display("error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("error parsing JSON"))]
    ParsingJson { source: serde_json::Error },

    #[snafu(display("error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("error reading the CSV input"))]
    CsvRead { source: csv::Error },
    #[snafu(display("error parsing line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: u64 },
    #[snafu(display("missing required column: {column}"))]
    MissingColumn { column: String },
    #[snafu(display("invalid boolean {value:?} for is_suspicious on line {lineno}"))]
    InvalidBool { value: String, lineno: u64 },
    #[snafu(display("cannot decode facenet_embedding on line {lineno}"))]
    EmbeddingParse { value: String, lineno: u64 },

    #[snafu(display("error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("the workbook {path} does not contain any data"))]
    EmptyExcel { path: String },
    #[snafu(display("worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },

    #[snafu(display("unknown input type {input_type}"))]
    UnknownInputType { input_type: String },
    #[snafu(display("unknown category {name}"))]
    UnknownCategory { name: String },
    #[snafu(display("unknown tab {name}"))]
    UnknownTab { name: String },
    #[snafu(display("category {category} does not contain any voter"))]
    EmptyCategory { category: String },
    #[snafu(display("voter {voter} is not listed under {category}"))]
    UnknownSelection { voter: String, category: String },

    #[snafu(display("error rendering the dashboard"))]
    Rendering { source: std::fmt::Error },
    #[snafu(display("error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("difference detected between calculated summary and reference summary"))]
    SummaryMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// The table read from one input, and everything computed from it.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub source: String,
    pub records: Vec<VoteRecord>,
    pub data: DashboardData,
}

impl LoadedTable {
    pub fn new(source: &str, records: Vec<VoteRecord>) -> LoadedTable {
        let data = analyze(&records);
        LoadedTable {
            source: source.to_string(),
            records,
            data,
        }
    }
}

/// Where a document is written.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn parse(s: &str) -> OutputTarget {
        if s == "stdout" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(s))
        }
    }
}

pub fn load_table(
    path: &Path,
    input_type: InputType,
    worksheet: Option<&str>,
) -> DashboardResult<LoadedTable> {
    let p = path.display().to_string();
    info!("Attempting to read vote file {:?} as {:?}", p, input_type);
    let votes = match input_type {
        InputType::Csv => io_csv::read_csv_votes(path)?,
        InputType::Xlsx => io_excel::read_excel_votes(path, worksheet)?,
    };
    info!("Read {} vote records from {:?}", votes.records.len(), p);
    io_common::report_inconsistencies(&votes);
    Ok(LoadedTable::new(&p, votes.records))
}

fn write_output(target: &OutputTarget, contents: &str) -> DashboardResult<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{}", contents);
        }
        OutputTarget::File(p) => {
            let path = p.display().to_string();
            info!("Writing {:?}", path);
            fs::write(p, contents).context(WritingOutputSnafu { path })?;
        }
    }
    Ok(())
}

fn check_reference(reference_path: &str, summary_js: &JSValue) -> DashboardResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("reference summary: {:?}", summary_ref);
    let pretty_js_stats = serde_json::to_string_pretty(summary_js).context(ParsingJsonSnafu {})?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_stats.as_ref(),
            "\n",
        );
        return SummaryMismatchSnafu {}.fail();
    }
    info!("The summary matches the reference {:?}", reference_path);
    Ok(())
}

/// Renders the dashboard for the given arguments.
///
/// Every call reads the input again: nothing is kept from one rendering to the next.
pub fn run_dashboard(args: &Args) -> DashboardResult<()> {
    let config = match args.config.as_deref() {
        Some(p) => Some(read_config(p)?),
        None => None,
    };
    let settings = Settings::resolve(args, config.as_ref())?;
    debug!("settings: {:?}", settings);

    let view = ViewState::new(
        settings.input.clone(),
        args.category.as_deref(),
        args.voter.as_deref(),
        args.tab.as_deref(),
    )?;

    let loaded: Option<LoadedTable> = match view.input.as_deref() {
        Some(p) => Some(load_table(
            p,
            settings.input_type,
            settings.excel_worksheet_name.as_deref(),
        )?),
        None => {
            info!("No input provided, rendering the upload prompt");
            None
        }
    };

    let stage = resolve_stage(&view, loaded.as_ref().map(|l| &l.data))?;
    info!("Rendering stage {:?}", stage);
    let html = render_html::render_page(&settings.render, &view, &stage, loaded.as_ref())?;
    write_output(&settings.output, &html)?;

    let table = match loaded {
        Some(t) => t,
        None => {
            if settings.summary.is_some() || settings.reference.is_some() {
                whatever!("A summary cannot be produced without an input file");
            }
            return Ok(());
        }
    };

    if settings.summary.is_none() && settings.reference.is_none() {
        return Ok(());
    }
    let summary_js = summary::build_summary_js(&settings.render.title, &table);
    if let Some(target) = settings.summary.as_ref() {
        let pretty = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
        write_output(target, &pretty)?;
    }
    if let Some(reference_path) = settings.reference.as_deref() {
        check_reference(reference_path, &summary_js)?;
    }
    Ok(())
}
