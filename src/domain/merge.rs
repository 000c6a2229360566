//! Single-header merge
//!
//! Assembles resolved headers into one [`MergedDocument`]:
//!
//! 1. license and signature banners, then the regenerated include guard
//! 2. every system include, deduplicated and sorted, minus the umbrella
//!    include of the wrapped library, which follows on its own line
//! 3. the version header's body, ahead of anything that may test its macros
//! 4. conditional include groups, deduplicated against step 2, dead groups
//!    dropped
//! 5. every other header's body in dependency order
//!
//! Merging is a pure function of its inputs; writing the text is up to the
//! caller.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use super::id::HeaderId;
use super::parser::system_include_path;
use super::resolver::OrderedHeaders;

/// Default signature banner placed after the license
pub const DEFAULT_SIGNATURE: &str = "\
/**
 * Created by Levalup.
 * L.eval: Let programmer get rid of only work jobs.
 * See https://github.com/levalup/libuvcxx for `libuvcxx` documentation.
 * See https://github.com/libuv/libuv#documentation for `libuv` documentation.
 */";

const RULE_WIDTH: usize = 77;

const VERSION_BANNER: &str = "Header files used for version compatibility.";

#[derive(Debug, Error, PartialEq)]
pub enum MergeError {
    #[error("Version compatibility header {0} is not among the merged headers")]
    MissingVersionHeader(HeaderId),
}

/// Settings for one merge
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Guard macro of the merged header
    pub guard_macro: String,

    /// Path of the wrapped library's umbrella include, e.g. `uv.h`
    pub umbrella_include: Option<String>,

    /// Header placed ahead of the conditional includes
    pub version_header: Option<HeaderId>,

    /// License text, commented into the banner
    pub license: String,

    /// Signature banner, emitted verbatim
    pub signature: String,
}

impl MergeOptions {
    pub fn new(guard_macro: impl Into<String>) -> Self {
        Self {
            guard_macro: guard_macro.into(),
            umbrella_include: None,
            version_header: None,
            license: String::new(),
            signature: DEFAULT_SIGNATURE.to_string(),
        }
    }
}

/// One header's body as placed in the merged output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyBlock {
    pub header: HeaderId,
    pub lines: Vec<String>,
}

/// The assembled single header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    pub license: String,
    pub signature: String,
    pub guard_macro: String,
    pub system_includes: Vec<String>,
    pub umbrella_include: Option<String>,
    pub version_block: Option<BodyBlock>,
    pub conditional_includes: Vec<String>,
    pub bodies: Vec<BodyBlock>,
}

impl MergedDocument {
    /// Returns the document text
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn write_rule(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "// {}", "-".repeat(RULE_WIDTH))
}

fn write_block(f: &mut fmt::Formatter<'_>, block: &BodyBlock) -> fmt::Result {
    write_rule(f)?;
    writeln!(f, "// #include \"{}\"", block.header)?;
    write_rule(f)?;
    writeln!(f)?;
    for line in &block.lines {
        writeln!(f, "{}", line)?;
    }
    writeln!(f)
}

impl fmt::Display for MergedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let license = self.license.trim_end();
        if !license.is_empty() {
            writeln!(f, "/**")?;
            for line in license.lines() {
                writeln!(f, "{}", format!(" * {}", line).trim_end())?;
            }
            writeln!(f, " */")?;
        }

        let signature = self.signature.trim();
        if !signature.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", signature)?;
        }
        writeln!(f)?;

        writeln!(f, "#ifndef {}", self.guard_macro)?;
        writeln!(f, "#define {}", self.guard_macro)?;
        writeln!(f)?;

        for line in &self.system_includes {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)?;

        if let Some(umbrella) = &self.umbrella_include {
            writeln!(f, "#include <{}>", umbrella)?;
            writeln!(f)?;
        }

        if let Some(block) = &self.version_block {
            write_block(f, block)?;
        }

        write_rule(f)?;
        writeln!(f, "// {}", VERSION_BANNER)?;
        write_rule(f)?;
        writeln!(f)?;

        for line in &self.conditional_includes {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)?;

        for block in &self.bodies {
            write_block(f, block)?;
        }

        writeln!(f, "#endif // {}", self.guard_macro)
    }
}

/// Collapses runs of blank lines to one and drops blank edges
fn collapse_blank_runs(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let blank = line.trim().is_empty();
        if blank && out.last().map_or(true, |prev| prev.trim().is_empty()) {
            continue;
        }
        out.push(if blank { String::new() } else { line });
    }
    if out.last().is_some_and(|line| line.is_empty()) {
        out.pop();
    }
    out
}

/// Builds the merged document from resolved headers
pub struct Merger {
    options: MergeOptions,
}

impl Merger {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    pub fn merge(&self, headers: &OrderedHeaders) -> Result<MergedDocument, MergeError> {
        let system = self.system_includes(headers);
        let conditional_includes = self.conditional_includes(headers, &system);

        let version_block = match &self.options.version_header {
            Some(id) => {
                let record = headers
                    .get(id)
                    .ok_or_else(|| MergeError::MissingVersionHeader(id.clone()))?;
                Some(BodyBlock {
                    header: id.clone(),
                    lines: record.body.clone(),
                })
            }
            None => None,
        };

        let bodies = headers
            .iter()
            .filter(|record| Some(&record.id) != self.options.version_header.as_ref())
            .map(|record| BodyBlock {
                header: record.id.clone(),
                lines: record.body.clone(),
            })
            .collect();

        Ok(MergedDocument {
            license: self.options.license.clone(),
            signature: self.options.signature.clone(),
            guard_macro: self.options.guard_macro.clone(),
            system_includes: system.into_iter().collect(),
            umbrella_include: self.options.umbrella_include.clone(),
            version_block,
            conditional_includes,
            bodies,
        })
    }

    /// Zone 1 of every header, sorted and deduplicated, umbrella excluded
    fn system_includes(&self, headers: &OrderedHeaders) -> BTreeSet<String> {
        let umbrella = self.options.umbrella_include.as_deref();
        headers
            .iter()
            .flat_map(|record| record.system_includes.iter())
            .filter(|line| umbrella.is_none() || system_include_path(line) != umbrella)
            .cloned()
            .collect()
    }

    /// Zone 3 of every header, deduplicated against `system`
    fn conditional_includes(&self, headers: &OrderedHeaders, system: &BTreeSet<String>) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();

        for record in headers.iter() {
            if record.conditional_groups.is_empty() {
                continue;
            }
            if !lines.is_empty() {
                lines.push(String::new());
            }

            for group in &record.conditional_groups {
                let mut group = group.clone();
                group.lines.retain(|line| !system.contains(line.trim()));
                if group.is_dead() {
                    continue;
                }
                lines.extend(std::iter::repeat(String::new()).take(group.leading_blanks));
                lines.extend(group.to_lines());
            }
        }

        collapse_blank_runs(lines)
    }
}
