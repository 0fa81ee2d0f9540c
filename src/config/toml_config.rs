use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ConvertError, Result};
use crate::utils::validation::{
    validate_extension, validate_path, validate_template, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_DESCRIPTOR_FILE: &str = "problem.xml";
pub const DEFAULT_TESTS_DIR: &str = "tests";
pub const DEFAULT_OUTPUT_DIR: &str = "cms_tests";
pub const DEFAULT_ARCHIVE_NAME: &str = "cms_tests.zip";
pub const DEFAULT_SCORE_FILE: &str = "score_params.txt";
pub const DEFAULT_POLYGON_INPUT_TEMPLATE: &str = "{id}";
pub const DEFAULT_POLYGON_OUTPUT_TEMPLATE: &str = "{id}.a";
pub const DEFAULT_CMS_INPUT_TEMPLATE: &str = "input.{id}_{group}";
pub const DEFAULT_CMS_OUTPUT_TEMPLATE: &str = "output.{id}_{group}";
/// Points of a group that does not declare any.
pub const DEFAULT_GROUP_POINTS: u64 = 0;

const TEMPLATE_PLACEHOLDERS: [&str; 2] = ["id", "group"];

/// Layout of a Polygon package and of the CMS output produced from it.
///
/// Every field may be omitted from the TOML file and falls back to the
/// layout Polygon and CMS use out of the box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    pub descriptor_file: String,
    pub testset: Option<String>,
    pub tests_dir: String,
    pub output_dir: String,
    pub archive_name: String,
    pub score_file: String,
    pub polygon_input_template: String,
    pub polygon_output_template: String,
    pub cms_input_template: String,
    pub cms_output_template: String,
    pub default_points: u64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            descriptor_file: DEFAULT_DESCRIPTOR_FILE.to_string(),
            testset: None,
            tests_dir: DEFAULT_TESTS_DIR.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            score_file: DEFAULT_SCORE_FILE.to_string(),
            polygon_input_template: DEFAULT_POLYGON_INPUT_TEMPLATE.to_string(),
            polygon_output_template: DEFAULT_POLYGON_OUTPUT_TEMPLATE.to_string(),
            cms_input_template: DEFAULT_CMS_INPUT_TEMPLATE.to_string(),
            cms_output_template: DEFAULT_CMS_OUTPUT_TEMPLATE.to_string(),
            default_points: DEFAULT_GROUP_POINTS,
        }
    }
}

/// Drops `.` components so that `./tests` and `tests` compare equal.
fn normalized(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

impl ConvertConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| ConvertError::ConfigError {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses the configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConvertError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("descriptor_file", &self.descriptor_file)?;
        validate_path("tests_dir", &self.tests_dir)?;
        validate_path("output_dir", &self.output_dir)?;
        validate_path("archive_name", &self.archive_name)?;
        validate_extension("archive_name", &self.archive_name, "zip")?;
        validate_path("score_file", &self.score_file)?;

        let tests_dir = normalized(&self.tests_dir);
        let output_dir = normalized(&self.output_dir);
        if tests_dir.starts_with(&output_dir) || output_dir.starts_with(&tests_dir) {
            return Err(ConvertError::InvalidConfigValueError {
                field: "output_dir".to_string(),
                value: self.output_dir.clone(),
                reason: "Output directory must not overlap the tests directory".to_string(),
            });
        }

        if let Some(testset) = &self.testset {
            crate::utils::validation::validate_non_empty_string("testset", testset)?;
        }

        validate_template(
            "polygon_input_template",
            &self.polygon_input_template,
            &TEMPLATE_PLACEHOLDERS,
            &["id"],
        )?;
        validate_template(
            "polygon_output_template",
            &self.polygon_output_template,
            &TEMPLATE_PLACEHOLDERS,
            &["id"],
        )?;
        validate_template(
            "cms_input_template",
            &self.cms_input_template,
            &TEMPLATE_PLACEHOLDERS,
            &["id", "group"],
        )?;
        validate_template(
            "cms_output_template",
            &self.cms_output_template,
            &TEMPLATE_PLACEHOLDERS,
            &["id", "group"],
        )?;

        if self.cms_input_template == self.cms_output_template {
            return Err(ConvertError::InvalidConfigValueError {
                field: "cms_output_template".to_string(),
                value: self.cms_output_template.clone(),
                reason: "Input and output files would get the same name".to_string(),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for ConvertConfig {
    fn descriptor_file(&self) -> &str {
        &self.descriptor_file
    }

    fn tests_dir(&self) -> &str {
        &self.tests_dir
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn archive_name(&self) -> &str {
        &self.archive_name
    }

    fn score_file(&self) -> &str {
        &self.score_file
    }

    fn polygon_input_template(&self) -> &str {
        &self.polygon_input_template
    }

    fn polygon_output_template(&self) -> &str {
        &self.polygon_output_template
    }

    fn cms_input_template(&self) -> &str {
        &self.cms_input_template
    }

    fn cms_output_template(&self) -> &str {
        &self.cms_output_template
    }

    fn default_points(&self) -> u64 {
        self.default_points
    }

    fn testset(&self) -> Option<&str> {
        self.testset.as_deref()
    }
}

impl Validate for ConvertConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
