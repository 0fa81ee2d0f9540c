use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "polyconv")]
#[command(about = "Convert Polygon test data into CMS format and print the score parameters")]
pub struct CliConfig {
    #[arg(help = "Path to the Polygon package folder")]
    pub polygon_path: PathBuf,

    #[arg(long, value_name = "FILE", help = "TOML file overriding the package layout")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
