use crate::domain::model::{Group, Package, Test};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ConvertError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

// Only the parts of problem.xml the conversion needs; everything else is skipped.

#[derive(Debug, Deserialize)]
struct ProblemXml {
    #[serde(default)]
    judging: Option<JudgingXml>,
}

#[derive(Debug, Deserialize)]
struct JudgingXml {
    #[serde(rename = "testset", default)]
    testsets: Vec<TestsetXml>,
}

#[derive(Debug, Deserialize)]
struct TestsetXml {
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(default)]
    tests: Option<TestsXml>,
    #[serde(default)]
    groups: Option<GroupsXml>,
}

#[derive(Debug, Deserialize)]
struct TestsXml {
    #[serde(rename = "test", default)]
    tests: Vec<TestXml>,
}

#[derive(Debug, Deserialize)]
struct TestXml {
    #[serde(rename = "@group", default)]
    group: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroupsXml {
    #[serde(rename = "group", default)]
    groups: Vec<GroupXml>,
}

#[derive(Debug, Deserialize)]
struct GroupXml {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@points", default)]
    points: Option<String>,
    #[serde(default)]
    dependencies: Option<DependenciesXml>,
}

#[derive(Debug, Deserialize)]
struct DependenciesXml {
    #[serde(rename = "dependency", default)]
    dependencies: Vec<DependencyXml>,
}

#[derive(Debug, Deserialize)]
struct DependencyXml {
    #[serde(rename = "@group")]
    group: String,
}

/// Reads the groups and tests of one testset out of a Polygon `problem.xml`.
pub struct DescriptorReader<'a, C: ConfigProvider> {
    config: &'a C,
}

impl<'a, C: ConfigProvider> DescriptorReader<'a, C> {
    pub fn new(config: &'a C) -> Self {
        Self { config }
    }

    pub fn read(&self, package_root: &Path) -> Result<Package> {
        let path = package_root.join(self.config.descriptor_file());
        if !path.is_file() {
            return Err(ConvertError::MissingDescriptorError { path });
        }

        tracing::debug!("Reading descriptor {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        self.parse(&content)
    }

    pub fn parse(&self, xml: &str) -> Result<Package> {
        let problem: ProblemXml = quick_xml::de::from_str(xml)?;
        let testsets = problem.judging.map(|j| j.testsets).unwrap_or_default();
        let testset = self.select_testset(testsets)?;

        let groups = testset
            .groups
            .map(|g| g.groups)
            .unwrap_or_default()
            .into_iter()
            .map(|group| self.convert_group(group))
            .collect::<Result<Vec<_>>>()?;

        if groups.is_empty() {
            return Err(ConvertError::DescriptorError {
                message: "testset declares no groups".to_string(),
            });
        }

        let mut declared = HashSet::new();
        for group in &groups {
            validate_group_name(&group.name)?;
            if !declared.insert(group.name.as_str()) {
                return Err(ConvertError::DuplicateGroupError {
                    group: group.name.clone(),
                });
            }
        }

        let tests = testset
            .tests
            .map(|t| t.tests)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, test)| {
                let position = index + 1;
                let group = test
                    .group
                    .ok_or(ConvertError::UngroupedTestError { position })?;
                if !declared.contains(group.as_str()) {
                    return Err(ConvertError::UnknownTestGroupError { position, group });
                }
                Ok(Test { position, group })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "Descriptor declares {} groups and {} tests",
            groups.len(),
            tests.len()
        );

        Ok(Package { groups, tests })
    }

    fn select_testset(&self, testsets: Vec<TestsetXml>) -> Result<TestsetXml> {
        match self.config.testset() {
            Some(name) => testsets
                .into_iter()
                .find(|t| t.name.as_deref() == Some(name))
                .ok_or_else(|| ConvertError::DescriptorError {
                    message: format!("testset '{}' not found", name),
                }),
            None => testsets
                .into_iter()
                .find(|t| t.groups.is_some())
                .ok_or_else(|| ConvertError::DescriptorError {
                    message: "no testset declares groups".to_string(),
                }),
        }
    }

    fn convert_group(&self, group: GroupXml) -> Result<Group> {
        let points = match group.points {
            Some(raw) => parse_points(&group.name, &raw)?,
            None => self.config.default_points(),
        };

        let dependencies = group
            .dependencies
            .map(|d| d.dependencies)
            .unwrap_or_default()
            .into_iter()
            .map(|d| d.group)
            .collect();

        Ok(Group {
            name: group.name,
            points,
            dependencies,
        })
    }
}

/// Polygon stores points as decimals ("100.0"); CMS wants whole points.
fn parse_points(group: &str, raw: &str) -> Result<u64> {
    let invalid = || ConvertError::InvalidPointsError {
        group: group.to_string(),
        value: raw.to_string(),
    };

    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    // u64::MAX as f64 rounds up to 2^64, itself out of range.
    if !value.is_finite() || value < 0.0 || value >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(value.trunc() as u64)
}

/// Group names end up inside CMS file names, so they must stay a single path component.
fn validate_group_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| ConvertError::InvalidGroupNameError {
        group: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(invalid("name contains a path separator"));
    }
    if name == "." || name == ".." {
        return Err(invalid("name is a relative directory reference"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertConfig;

    const PROBLEM_XML: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>
<problem revision="12" short-name="sum">
    <names>
        <name language="english" value="Sum"/>
    </names>
    <judging cpu-name="Intel(R) Core(TM) i3-8100 CPU @ 3.60GHz" input-file="" output-file="">
        <testset name="tests">
            <time-limit>1000</time-limit>
            <memory-limit>268435456</memory-limit>
            <test-count>3</test-count>
            <input-path-pattern>tests/%d</input-path-pattern>
            <answer-path-pattern>tests/%d.a</answer-path-pattern>
            <tests>
                <test method="manual" sample="true" group="sample"/>
                <test cmd="gen 1" method="generated" group="easy"/>
                <test cmd="gen 2" method="generated" group="easy"/>
            </tests>
            <groups>
                <group feedback-policy="complete" name="sample" points-policy="each-test"/>
                <group feedback-policy="icpc" name="easy" points="100.0" points-policy="complete-group">
                    <dependencies>
                        <dependency group="sample"/>
                    </dependencies>
                </group>
            </groups>
        </testset>
    </judging>
</problem>
"#;

    fn parse(xml: &str) -> Result<Package> {
        let config = ConvertConfig::default();
        DescriptorReader::new(&config).parse(xml)
    }

    #[test]
    fn test_parse_groups_and_tests() {
        let package = parse(PROBLEM_XML).unwrap();

        assert_eq!(
            package.groups,
            vec![
                Group::new("sample", 0),
                Group::new("easy", 100).depends_on(["sample"]),
            ]
        );
        let assigned: Vec<(usize, &str)> = package
            .tests
            .iter()
            .map(|t| (t.position, t.group.as_str()))
            .collect();
        assert_eq!(assigned, vec![(1, "sample"), (2, "easy"), (3, "easy")]);
    }

    #[test]
    fn test_missing_points_use_configured_default() {
        let config = ConvertConfig {
            default_points: 7,
            ..ConvertConfig::default()
        };
        let package = DescriptorReader::new(&config).parse(PROBLEM_XML).unwrap();
        assert_eq!(package.groups[0].points, 7);
        assert_eq!(package.groups[1].points, 100);
    }

    #[test]
    fn test_fractional_points_truncated() {
        assert_eq!(parse_points("g", "12.9").unwrap(), 12);
        assert_eq!(parse_points("g", " 40 ").unwrap(), 40);
        assert!(parse_points("g", "-1").is_err());
        assert!(parse_points("g", "lots").is_err());
        assert!(parse_points("g", "inf").is_err());
        assert!(parse_points("g", "1e30").is_err());
        assert!(parse_points("g", "18446744073709551616").is_err());
        assert_eq!(parse_points("g", "1e15").unwrap(), 1_000_000_000_000_000);
    }

    #[test]
    fn test_testset_selection() {
        let xml = r#"<problem><judging>
            <testset name="pretests">
                <tests><test group="a"/></tests>
            </testset>
            <testset name="tests">
                <tests><test group="b"/><test group="b"/></tests>
                <groups><group name="b" points="10"/></groups>
            </testset>
        </judging></problem>"#;

        let package = parse(xml).unwrap();
        assert_eq!(package.groups, vec![Group::new("b", 10)]);
        assert_eq!(package.tests.len(), 2);

        let config = ConvertConfig {
            testset: Some("pretests".to_string()),
            ..ConvertConfig::default()
        };
        let err = DescriptorReader::new(&config).parse(xml).unwrap_err();
        assert!(matches!(err, ConvertError::DescriptorError { .. }));

        let config = ConvertConfig {
            testset: Some("missing".to_string()),
            ..ConvertConfig::default()
        };
        assert!(DescriptorReader::new(&config).parse(xml).is_err());
    }

    #[test]
    fn test_test_with_undeclared_group() {
        let xml = r#"<problem><judging><testset name="tests">
            <tests><test group="a"/><test group="ghost"/></tests>
            <groups><group name="a"/></groups>
        </testset></judging></problem>"#;

        match parse(xml).unwrap_err() {
            ConvertError::UnknownTestGroupError { position, group } => {
                assert_eq!(position, 2);
                assert_eq!(group, "ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_test_without_group() {
        let xml = r#"<problem><judging><testset name="tests">
            <tests><test/></tests>
            <groups><group name="a"/></groups>
        </testset></judging></problem>"#;

        assert!(matches!(
            parse(xml).unwrap_err(),
            ConvertError::UngroupedTestError { position: 1 }
        ));
    }

    #[test]
    fn test_duplicate_group() {
        let xml = r#"<problem><judging><testset name="tests">
            <tests/>
            <groups><group name="a"/><group name="a"/></groups>
        </testset></judging></problem>"#;

        assert!(matches!(
            parse(xml).unwrap_err(),
            ConvertError::DuplicateGroupError { .. }
        ));
    }

    #[test]
    fn test_malformed_descriptor() {
        assert!(parse("<problem><judging>").is_err());
        assert!(matches!(
            parse("<problem/>").unwrap_err(),
            ConvertError::DescriptorError { .. }
        ));
    }

    #[test]
    fn test_read_missing_descriptor() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ConvertConfig::default();
        let err = DescriptorReader::new(&config).read(dir.path()).unwrap_err();
        assert!(matches!(err, ConvertError::MissingDescriptorError { .. }));
    }

    #[test]
    fn test_group_name_with_path_components_rejected() {
        for name in ["../../../x", "a/b", "a\\b", ".."] {
            let xml = format!(
                r#"<problem><judging><testset name="tests">
                <tests><test group="{name}"/></tests>
                <groups><group name="{name}" points="5"/></groups>
            </testset></judging></problem>"#
            );

            match parse(&xml).unwrap_err() {
                ConvertError::InvalidGroupNameError { group, .. } => assert_eq!(group, name),
                other => panic!("unexpected error for {name:?}: {other}"),
            }
        }
    }

    #[test]
    fn test_group_name_with_dots_accepted() {
        assert!(validate_group_name("subtask.1").is_ok());
        assert!(validate_group_name("...").is_ok());
    }
}
