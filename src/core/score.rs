use crate::core::resolver::Closures;
use crate::domain::model::{Group, ScoreParameter};
use crate::utils::error::{ConvertError, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

/// Pattern matching every testcase whose name ends in `_<member>`.
pub fn group_pattern<S: AsRef<str>>(members: &[S]) -> String {
    let alternatives = members
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("|");
    format!(".*_(?:{})", alternatives)
}

/// One `[points, pattern]` entry per group, in declaration order.
pub fn score_parameters(groups: &[Group], closures: &Closures) -> Result<Vec<ScoreParameter>> {
    groups
        .iter()
        .map(|group| {
            let members = closures.members(&group.name).ok_or_else(|| {
                ConvertError::DescriptorError {
                    message: format!("group '{}' has no resolved dependencies", group.name),
                }
            })?;
            let pattern = group_pattern(members.as_slice());

            Regex::new(&pattern).map_err(|source| ConvertError::InvalidPatternError {
                group: group.name.clone(),
                source,
            })?;

            tracing::debug!("Group '{}': {} points, {}", group.name, group.points, pattern);
            Ok(ScoreParameter(group.points, pattern))
        })
        .collect()
}

/// Renders the score parameters the way CMS's admin form expects to receive them.
pub fn serialize_score_params(params: &[ScoreParameter]) -> Result<String> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
    params.serialize(&mut serializer)?;
    String::from_utf8(out)
        .map_err(|e| ConvertError::IoError(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Single-line JSON with `", "` and `": "` separators and ASCII-only output.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}
