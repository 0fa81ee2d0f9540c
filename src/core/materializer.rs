use crate::domain::model::Test;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ConvertError, Result};
use crate::utils::template::render;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime};

/// Where the materialized tests ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedTests {
    pub directory: PathBuf,
    pub archive: PathBuf,
    pub renamed: usize,
}

/// Copies a package's test files, renames them to CMS names and zips the result.
pub struct TestMaterializer<'a, C: ConfigProvider> {
    config: &'a C,
}

impl<'a, C: ConfigProvider> TestMaterializer<'a, C> {
    pub fn new(config: &'a C) -> Self {
        Self { config }
    }

    pub fn materialize(&self, package_root: &Path, tests: &[Test]) -> Result<MaterializedTests> {
        let source = package_root.join(self.config.tests_dir());
        if !source.is_dir() {
            return Err(ConvertError::MissingTestDirectoryError { path: source });
        }

        let directory = package_root.join(self.config.output_dir());
        if directory.exists() {
            tracing::info!("Removing previous {}", directory.display());
            fs::remove_dir_all(&directory)?;
        }

        tracing::info!("Copying {} to {}", source.display(), directory.display());
        copy_tree(&source, &directory)?;

        let renamed = self.rename_tests(&directory, tests)?;

        let archive = package_root.join(self.config.archive_name());
        tracing::info!("📦 Writing {}", archive.display());
        write_archive(&directory, &archive)?;

        Ok(MaterializedTests {
            directory,
            archive,
            renamed,
        })
    }

    fn rename_tests(&self, directory: &Path, tests: &[Test]) -> Result<usize> {
        let width = tests.len().to_string().len();

        for test in tests {
            let id = format!("{:0width$}", test.position, width = width);
            let vars = [("id", id.as_str()), ("group", test.group.as_str())];

            let pairs = [
                (
                    self.config.polygon_input_template(),
                    self.config.cms_input_template(),
                ),
                (
                    self.config.polygon_output_template(),
                    self.config.cms_output_template(),
                ),
            ];
            for (polygon_template, cms_template) in pairs {
                let from = contained(directory, &render(polygon_template, &vars)?, test.position)?;
                let to = contained(directory, &render(cms_template, &vars)?, test.position)?;

                if !from.is_file() {
                    return Err(ConvertError::MissingTestFileError {
                        position: test.position,
                        path: from,
                    });
                }
                if let Some(parent) = to.parent() {
                    fs::create_dir_all(parent)?;
                }
                tracing::debug!("{} -> {}", from.display(), to.display());
                fs::rename(&from, &to)?;
            }
        }

        tracing::info!("Renamed {} tests", tests.len());
        Ok(tests.len())
    }
}

/// Joins a rendered file name onto `directory`, refusing anything that could leave it.
fn contained(directory: &Path, relative: &str, position: usize) -> Result<PathBuf> {
    let path = Path::new(relative);
    let inside = !relative.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !inside {
        return Err(ConvertError::PathEscapeError {
            position,
            path: path.to_path_buf(),
        });
    }
    Ok(directory.join(path))
}

fn copy_tree(source: &Path, destination: &Path) -> Result<()> {
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Zips `directory`'s contents with paths relative to it.
///
/// Entries are sorted and carry a fixed timestamp, so the same tree always
/// produces the same bytes.
fn write_archive(directory: &Path, archive: &Path) -> Result<()> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);
    let dir_options = options.unix_permissions(0o755);

    let mut zip = ZipWriter::new(BufWriter::new(File::create(archive)?));

    for entry in WalkDir::new(directory).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(directory)
            .map_err(io::Error::other)?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(name, dir_options)?;
        } else {
            zip.start_file(name, options)?;
            io::copy(&mut File::open(entry.path())?, &mut zip)?;
        }
    }

    zip.finish()?;
    Ok(())
}
