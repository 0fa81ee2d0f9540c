pub mod converter;
pub mod descriptor;
pub mod materializer;
pub mod resolver;
pub mod score;

pub use crate::domain::model::{Group, Package, ScoreParameter, Test};
pub use crate::domain::ports::ConfigProvider;
pub use crate::utils::error::Result;
