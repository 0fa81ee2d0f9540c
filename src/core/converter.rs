use crate::core::descriptor::DescriptorReader;
use crate::core::materializer::TestMaterializer;
use crate::core::resolver::DependencyGraph;
use crate::core::score::{score_parameters, serialize_score_params};
use crate::domain::model::ScoreParameter;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ConvertError, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// The serialized score parameters, exactly as written to `score_file`.
    pub score_params: String,
    pub parameters: Vec<ScoreParameter>,
    pub tests_dir: PathBuf,
    pub archive: PathBuf,
    pub score_file: PathBuf,
    pub groups: usize,
    pub tests: usize,
}

/// Turns a Polygon package into CMS test data plus score parameters.
pub struct Converter<C: ConfigProvider> {
    config: C,
}

impl<C: ConfigProvider> Converter<C> {
    pub fn new(config: C) -> Self {
        Self { config }
    }

    pub fn run(&self, package_root: &Path) -> Result<ConversionReport> {
        if !package_root.is_dir() {
            return Err(ConvertError::MissingPackageRootError {
                path: package_root.to_path_buf(),
            });
        }
        tracing::info!("Converting Polygon package {}", package_root.display());

        // Everything that can be rejected is checked before the file system is touched.
        let package = DescriptorReader::new(&self.config).read(package_root)?;
        let closures = DependencyGraph::from_groups(&package.groups)?.resolve();
        let parameters = score_parameters(&package.groups, &closures)?;
        let score_params = serialize_score_params(&parameters)?;

        let materialized =
            TestMaterializer::new(&self.config).materialize(package_root, &package.tests)?;

        let score_file = package_root.join(self.config.score_file());
        std::fs::write(&score_file, &score_params)?;
        tracing::info!("Score parameters saved to {}", score_file.display());

        Ok(ConversionReport {
            score_params,
            parameters,
            tests_dir: materialized.directory,
            archive: materialized.archive,
            score_file,
            groups: package.groups.len(),
            tests: materialized.renamed,
        })
    }
}
