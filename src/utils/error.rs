use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Directory traversal failed: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Descriptor parse error: {0}")]
    DescriptorParseError(#[from] quick_xml::de::DeError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Package root not found: {}", path.display())]
    MissingPackageRootError { path: PathBuf },

    #[error("Descriptor file not found: {}", path.display())]
    MissingDescriptorError { path: PathBuf },

    #[error("Test directory not found: {}", path.display())]
    MissingTestDirectoryError { path: PathBuf },

    #[error("Test {position} is missing its file {}", path.display())]
    MissingTestFileError { position: usize, path: PathBuf },

    #[error("Descriptor error: {message}")]
    DescriptorError { message: String },

    #[error("Group name '{group}' cannot be used in file names: {reason}")]
    InvalidGroupNameError { group: String, reason: String },

    #[error("Test {position} would be written outside the output directory: {}", path.display())]
    PathEscapeError { position: usize, path: PathBuf },

    #[error("Group '{group}' is declared more than once")]
    DuplicateGroupError { group: String },

    #[error("Group '{group}' depends on undeclared group '{dependency}'")]
    UnknownDependencyError { group: String, dependency: String },

    #[error("Test {position} is assigned to undeclared group '{group}'")]
    UnknownTestGroupError { position: usize, group: String },

    #[error("Test {position} has no group")]
    UngroupedTestError { position: usize },

    #[error("Group '{group}' has invalid points '{value}'")]
    InvalidPointsError { group: String, value: String },

    #[error("Pattern for group '{group}' is not a valid regex: {source}")]
    InvalidPatternError {
        group: String,
        #[source]
        source: regex::Error,
    },

    #[error("Template '{template}' is invalid: {reason}")]
    TemplateError { template: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Descriptor,
    Dependency,
    FileSystem,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The input package or configuration is wrong; fix it and re-run.
    High,
    /// The environment failed underneath us (disk, permissions, archive).
    Critical,
}

impl ConvertError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConvertError::ConfigError { .. }
            | ConvertError::InvalidConfigValueError { .. }
            | ConvertError::TemplateError { .. } => ErrorCategory::Configuration,
            ConvertError::DescriptorParseError(_)
            | ConvertError::MissingDescriptorError { .. }
            | ConvertError::DescriptorError { .. }
            | ConvertError::UnknownTestGroupError { .. }
            | ConvertError::UngroupedTestError { .. }
            | ConvertError::InvalidPointsError { .. }
            | ConvertError::InvalidGroupNameError { .. } => ErrorCategory::Descriptor,
            ConvertError::DuplicateGroupError { .. }
            | ConvertError::UnknownDependencyError { .. }
            | ConvertError::InvalidPatternError { .. } => ErrorCategory::Dependency,
            ConvertError::IoError(_)
            | ConvertError::WalkError(_)
            | ConvertError::MissingPackageRootError { .. }
            | ConvertError::MissingTestDirectoryError { .. }
            | ConvertError::MissingTestFileError { .. }
            | ConvertError::PathEscapeError { .. } => ErrorCategory::FileSystem,
            ConvertError::ZipError(_) | ConvertError::SerializationError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ConvertError::IoError(_)
            | ConvertError::WalkError(_)
            | ConvertError::ZipError(_)
            | ConvertError::SerializationError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Descriptor => format!("Cannot read the Polygon package: {}", self),
            ErrorCategory::Dependency => format!("Invalid group dependencies: {}", self),
            ErrorCategory::FileSystem => format!("File system problem: {}", self),
            ErrorCategory::Output => format!("Cannot write the CMS output: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ConvertError::MissingPackageRootError { .. } => {
                "Pass the path of an unpacked Polygon package directory"
            }
            ConvertError::MissingDescriptorError { .. } => {
                "Make sure the package contains problem.xml (or set descriptor_file in the config)"
            }
            ConvertError::MissingTestDirectoryError { .. }
            | ConvertError::MissingTestFileError { .. } => {
                "Download the full package with generated tests, not the standard one"
            }
            ConvertError::UnknownDependencyError { .. }
            | ConvertError::DuplicateGroupError { .. }
            | ConvertError::UnknownTestGroupError { .. }
            | ConvertError::UngroupedTestError { .. } => {
                "Fix the test groups in Polygon and rebuild the package"
            }
            ConvertError::InvalidGroupNameError { .. } | ConvertError::PathEscapeError { .. } => {
                "Rename the group so that it contains no path separators"
            }
            ConvertError::InvalidPatternError { .. } => {
                "Rename the group so that it contains no regex metacharacters"
            }
            _ => match self.category() {
                ErrorCategory::Configuration => "Check the configuration file values",
                ErrorCategory::Descriptor => "Check that problem.xml is a valid Polygon descriptor",
                ErrorCategory::FileSystem | ErrorCategory::Output => {
                    "Check file permissions and free disk space, then re-run"
                }
                ErrorCategory::Dependency => "Fix the test groups in Polygon and rebuild the package",
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
