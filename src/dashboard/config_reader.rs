use crate::args::Args;
use crate::dashboard::io_common::InputType;
use crate::dashboard::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

pub const DEFAULT_TITLE: &str = "Suspicious Voter Monitoring System";
pub const DEFAULT_OUTPUT: &str = "dashboard.html";
pub const DEFAULT_GALLERY_COLUMNS: usize = 4;
pub const DEFAULT_IMAGE_WIDTH: u32 = 150;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    pub title: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "summaryPath")]
    pub summary_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "inputType")]
    pub input_type: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "imageRoot")]
    pub image_root: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(rename = "galleryColumns")]
    pub gallery_columns: Option<usize>,
    #[serde(rename = "imageWidth")]
    pub image_width: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    #[serde(rename = "inputSettings")]
    pub input_settings: Option<InputSettings>,
    pub display: Option<DisplaySettings>,
}

/// A configuration file, with the directory that its relative paths refer to.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LoadedConfig {
    pub config: DashboardConfig,
    pub root: PathBuf,
}

pub fn read_config(path: &str) -> DashboardResult<LoadedConfig> {
    info!("Reading configuration {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config = parse_config(&contents)?;
    debug!("config: {:?}", config);
    let root = Path::new(path)
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    Ok(LoadedConfig { config, root })
}

pub fn parse_config(contents: &str) -> DashboardResult<DashboardConfig> {
    serde_json::from_str(contents).context(ParsingJsonSnafu {})
}

pub fn read_summary(path: &str) -> DashboardResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

/// The options that only affect how the page looks.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RenderSettings {
    pub title: String,
    pub gallery_columns: usize,
    pub image_width: u32,
    /// Relative image paths are resolved against this directory.
    pub image_root: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            title: DEFAULT_TITLE.to_string(),
            gallery_columns: DEFAULT_GALLERY_COLUMNS,
            image_width: DEFAULT_IMAGE_WIDTH,
            image_root: None,
        }
    }
}

/// The merged settings: the command line first, then the configuration file,
/// then the defaults.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub input: Option<PathBuf>,
    pub input_type: InputType,
    pub excel_worksheet_name: Option<String>,
    pub output: OutputTarget,
    pub summary: Option<OutputTarget>,
    pub reference: Option<String>,
    pub render: RenderSettings,
}

impl Settings {
    pub fn resolve(args: &Args, config: Option<&LoadedConfig>) -> DashboardResult<Settings> {
        let output_settings = config.and_then(|c| c.config.output_settings.clone());
        let input_settings = config.and_then(|c| c.config.input_settings.clone());
        let display = config.and_then(|c| c.config.display.clone());
        // Paths coming from the configuration file are relative to it.
        let from_config = |p: &String| -> PathBuf {
            match config {
                Some(c) => c.root.join(p),
                None => PathBuf::from(p),
            }
        };

        let input: Option<PathBuf> = match args.input.as_ref() {
            Some(p) => Some(PathBuf::from(p)),
            None => input_settings
                .as_ref()
                .and_then(|i| i.file_path.as_ref())
                .map(from_config),
        };

        let input_type_s = args
            .input_type
            .clone()
            .or_else(|| input_settings.as_ref().and_then(|i| i.input_type.clone()));
        let input_type = match input_type_s {
            Some(s) => InputType::parse(&s)?,
            None => InputType::default(),
        };

        let output = match args.out.as_ref() {
            Some(p) => OutputTarget::parse(p),
            None => match output_settings.as_ref().and_then(|o| o.output_path.as_ref()) {
                Some(p) if p == "stdout" => OutputTarget::Stdout,
                Some(p) => OutputTarget::File(from_config(p)),
                None => OutputTarget::File(PathBuf::from(DEFAULT_OUTPUT)),
            },
        };

        let summary = match args.summary.as_ref() {
            Some(p) => Some(OutputTarget::parse(p)),
            None => match output_settings.as_ref().and_then(|o| o.summary_path.as_ref()) {
                Some(p) if p == "stdout" => Some(OutputTarget::Stdout),
                Some(p) => Some(OutputTarget::File(from_config(p))),
                None => None,
            },
        };

        let image_root = match args.image_root.as_ref() {
            Some(p) => Some(PathBuf::from(p)),
            None => input_settings
                .as_ref()
                .and_then(|i| i.image_root.as_ref())
                .map(from_config),
        };

        let gallery_columns = display
            .as_ref()
            .and_then(|d| d.gallery_columns)
            .unwrap_or(DEFAULT_GALLERY_COLUMNS);
        if gallery_columns == 0 {
            whatever!("galleryColumns must be at least 1");
        }

        let render = RenderSettings {
            title: output_settings
                .as_ref()
                .and_then(|o| o.title.clone())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            gallery_columns,
            image_width: display
                .as_ref()
                .and_then(|d| d.image_width)
                .unwrap_or(DEFAULT_IMAGE_WIDTH),
            image_root,
        };

        Ok(Settings {
            input,
            input_type,
            excel_worksheet_name: args
                .excel_worksheet_name
                .clone()
                .or_else(|| input_settings.and_then(|i| i.excel_worksheet_name)),
            output,
            summary,
            reference: args.reference.clone(),
            render,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(line: &[&str]) -> Args {
        let mut all = vec!["fraudview"];
        all.extend_from_slice(line);
        Args::parse_from(all)
    }

    fn loaded(js: &str) -> LoadedConfig {
        LoadedConfig {
            config: parse_config(js).unwrap(),
            root: PathBuf::from("/data/elections"),
        }
    }

    #[test]
    fn defaults_without_config() {
        let s = Settings::resolve(&args(&[]), None).unwrap();
        assert_eq!(s.input, None);
        assert_eq!(s.input_type, InputType::Csv);
        assert_eq!(s.output, OutputTarget::File(PathBuf::from("dashboard.html")));
        assert_eq!(s.summary, None);
        assert_eq!(s.render, RenderSettings::default());
    }

    #[test]
    fn config_paths_are_relative_to_the_config_file() {
        let c = loaded(
            r#"{
                "outputSettings": {"title": "District 9", "outputPath": "out/index.html", "summaryPath": "stdout"},
                "inputSettings": {"filePath": "votes.xlsx", "inputType": "xlsx", "imageRoot": "faces"},
                "display": {"galleryColumns": 3, "imageWidth": 200}
            }"#,
        );
        let s = Settings::resolve(&args(&[]), Some(&c)).unwrap();
        assert_eq!(s.input, Some(PathBuf::from("/data/elections/votes.xlsx")));
        assert_eq!(s.input_type, InputType::Xlsx);
        assert_eq!(
            s.output,
            OutputTarget::File(PathBuf::from("/data/elections/out/index.html"))
        );
        assert_eq!(s.summary, Some(OutputTarget::Stdout));
        assert_eq!(s.render.title, "District 9");
        assert_eq!(s.render.gallery_columns, 3);
        assert_eq!(s.render.image_width, 200);
        assert_eq!(
            s.render.image_root,
            Some(PathBuf::from("/data/elections/faces"))
        );
    }

    #[test]
    fn command_line_overrides_config() {
        let c = loaded(r#"{"inputSettings": {"filePath": "votes.xlsx", "inputType": "xlsx"}}"#);
        let s = Settings::resolve(
            &args(&["-i", "other.csv", "--input-type", "csv", "-o", "stdout"]),
            Some(&c),
        )
        .unwrap();
        assert_eq!(s.input, Some(PathBuf::from("other.csv")));
        assert_eq!(s.input_type, InputType::Csv);
        assert_eq!(s.output, OutputTarget::Stdout);
    }

    #[test]
    fn invalid_settings() {
        assert!(matches!(
            Settings::resolve(&args(&["--input-type", "parquet"]), None),
            Err(DashboardError::UnknownInputType { .. })
        ));
        let c = loaded(r#"{"display": {"galleryColumns": 0}}"#);
        assert!(Settings::resolve(&args(&[]), Some(&c)).is_err());
        assert!(matches!(
            parse_config("{not json"),
            Err(DashboardError::ParsingJson { .. })
        ));
    }
}
