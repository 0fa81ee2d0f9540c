pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ConvertConfig;

pub use crate::core::{
    converter::{ConversionReport, Converter},
    descriptor::DescriptorReader,
    materializer::{MaterializedTests, TestMaterializer},
    resolver::{Closures, DependencyGraph},
    score::{group_pattern, score_parameters, serialize_score_params},
};
pub use domain::model::{Group, Package, ScoreParameter, Test};
pub use utils::error::{ConvertError, Result};
