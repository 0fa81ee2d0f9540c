use clap::Parser;
use polyconv::utils::{logger, validation::Validate};
use polyconv::{CliConfig, ConvertConfig, ConvertError, Converter};

fn main() {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(&cli) {
        tracing::error!(
            "❌ Conversion failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &CliConfig) -> Result<(), ConvertError> {
    let config = match &cli.config {
        Some(path) => ConvertConfig::from_file(path)?,
        None => ConvertConfig::default(),
    };
    config.validate()?;

    let package_root = std::fs::canonicalize(&cli.polygon_path).map_err(|_| {
        ConvertError::MissingPackageRootError {
            path: cli.polygon_path.clone(),
        }
    })?;

    let report = Converter::new(config).run(&package_root)?;
    tracing::info!(
        "✅ Converted {} tests in {} groups into {}",
        report.tests,
        report.groups,
        report.archive.display()
    );

    println!("CMS Score Parameters:\n{}", report.score_params);
    Ok(())
}
