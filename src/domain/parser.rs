//! Header parser
//!
//! Splits a header into guard and zones with a forward-only scanner. Each
//! line is looked at once; the scanner moves through four states and never
//! goes back:
//!
//! ```text
//! SystemIncludes -> LocalIncludes -> Conditional -> Body
//! ```
//!
//! Inside `Conditional` a group is only committed once its `#endif` is
//! seen. Lines of a group that never closes are the first lines of the body.

use thiserror::Error;

use super::header::{
    ConditionalGroup, HeaderRecord, HeaderSource, IncludeGuard, LocalInclude,
};
use super::id::HeaderId;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Can not resolve include \"{include}\" in {header}")]
    UnresolvableInclude { header: HeaderId, include: String },

    #[error("Malformed include guard in {header}: {reason}")]
    MalformedGuard { header: HeaderId, reason: String },
}

/// A preprocessor directive split into name and argument text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Directive<'a> {
    name: &'a str,
    rest: &'a str,
}

/// Recognizes `#name rest`, allowing whitespace around `#`
fn directive(line: &str) -> Option<Directive<'_>> {
    let after_hash = line.trim().strip_prefix('#')?.trim_start();
    let end = after_hash
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(after_hash.len());
    if end == 0 {
        return None;
    }
    Some(Directive {
        name: &after_hash[..end],
        rest: after_hash[end..].trim(),
    })
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Returns the path of an include whose argument is `open path close`
fn include_path(line: &str, open: char, close: char) -> Option<&str> {
    let d = directive(line)?;
    if d.name != "include" {
        return None;
    }
    let path = d.rest.strip_prefix(open)?.strip_suffix(close)?;
    if path.is_empty() || path.contains(char::is_whitespace) {
        return None;
    }
    Some(path)
}

/// Returns the path of a `#include <path>` line
pub(crate) fn system_include_path(line: &str) -> Option<&str> {
    include_path(line, '<', '>')
}

fn is_system_include(line: &str) -> bool {
    system_include_path(line).is_some()
}

fn is_any_include(line: &str) -> bool {
    matches!(directive(line), Some(d) if d.name == "include" && !d.rest.is_empty())
}

fn is_condition_open(line: &str) -> bool {
    matches!(directive(line), Some(d) if matches!(d.name, "if" | "ifdef" | "ifndef"))
}

fn is_condition_close(line: &str) -> bool {
    matches!(directive(line), Some(d) if d.name == "endif")
}

/// Progress through one conditional group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupState {
    /// Between groups, only blanks seen
    Seeking,
    /// Saw the opening condition
    Opened,
    /// Saw at least one include after the condition
    Included,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    SystemIncludes,
    LocalIncludes,
    Conditional(GroupState),
    Body,
}

/// Strips the include guard, returning it and the lines between
fn split_guard<'a>(id: &HeaderId, lines: &[&'a str]) -> Result<(IncludeGuard, Vec<&'a str>), ParseError> {
    let malformed = |reason: &str| ParseError::MalformedGuard {
        header: id.clone(),
        reason: reason.to_string(),
    };

    let define_idx = lines
        .iter()
        .position(|line| matches!(directive(line), Some(d) if d.name == "define"))
        .ok_or_else(|| malformed("no guard #define found"))?;

    let opener = lines[..define_idx]
        .iter()
        .rev()
        .find(|line| !is_blank(line))
        .and_then(|line| directive(line));
    if !matches!(opener, Some(d) if matches!(d.name, "ifndef" | "if")) {
        return Err(malformed("guard #define is not preceded by #ifndef"));
    }

    let macro_name = directive(lines[define_idx])
        .and_then(|d| d.rest.split_whitespace().next())
        .ok_or_else(|| malformed("guard #define has no macro name"))?
        .to_string();

    let close_idx = lines
        .iter()
        .rposition(|line| !is_blank(line))
        .filter(|&idx| idx > define_idx && is_condition_close(lines[idx]))
        .ok_or_else(|| malformed("missing closing #endif"))?;

    let guard = IncludeGuard {
        prelude: lines[..=define_idx].iter().map(|s| s.to_string()).collect(),
        macro_name,
        trailer: lines[close_idx..].iter().map(|s| s.to_string()).collect(),
    };

    Ok((guard, lines[define_idx + 1..close_idx].to_vec()))
}

/// Resolves a quoted include against the header's directory, then the root
fn resolve_local(
    id: &HeaderId,
    reference: &str,
    headers: &impl HeaderSource,
) -> Result<HeaderId, ParseError> {
    [id.sibling(reference), HeaderId::new(reference)]
        .into_iter()
        .flatten()
        .find(|candidate| headers.contains(candidate))
        .ok_or_else(|| ParseError::UnresolvableInclude {
            header: id.clone(),
            include: reference.to_string(),
        })
}

/// Builds a group from the buffered lines of a closed group
fn commit_group(pending: &[&str]) -> ConditionalGroup {
    let leading_blanks = pending.iter().take_while(|line| is_blank(line)).count();
    let group = &pending[leading_blanks..];
    ConditionalGroup {
        leading_blanks,
        open: group[0].to_string(),
        lines: group[1..group.len() - 1].iter().map(|s| s.to_string()).collect(),
        close: group[group.len() - 1].to_string(),
    }
}

fn trim_blank_edges(lines: &mut Vec<String>) {
    let end = lines.iter().rposition(|l| !is_blank(l)).map_or(0, |i| i + 1);
    lines.truncate(end);
    let start = lines.iter().position(|l| !is_blank(l)).unwrap_or(lines.len());
    lines.drain(..start);
}

/// Parses one header into a [`HeaderRecord`]
///
/// `headers` is consulted to resolve quoted includes; nothing is read.
pub fn parse_header(
    id: &HeaderId,
    text: &str,
    headers: &impl HeaderSource,
) -> Result<HeaderRecord, ParseError> {
    let all_lines: Vec<&str> = text.lines().collect();
    let (guard, content) = split_guard(id, &all_lines)?;

    let mut system_includes = Vec::new();
    let mut local_includes = Vec::new();
    let mut conditional_groups = Vec::new();
    let mut body: Vec<String> = Vec::new();

    // Lines since the last committed group
    let mut pending: Vec<&str> = Vec::new();
    let mut zone = Zone::SystemIncludes;

    for line in content {
        // Each pass either consumes the line or moves to the next zone
        loop {
            match zone {
                Zone::SystemIncludes => {
                    if is_system_include(line) {
                        system_includes.push(line.trim().to_string());
                    } else if !is_blank(line) {
                        zone = Zone::LocalIncludes;
                        continue;
                    }
                }
                Zone::LocalIncludes => {
                    if let Some(reference) = include_path(line, '"', '"') {
                        local_includes.push(LocalInclude {
                            line: line.to_string(),
                            target: resolve_local(id, reference, headers)?,
                        });
                    } else if !is_blank(line) {
                        zone = Zone::Conditional(GroupState::Seeking);
                        continue;
                    }
                }
                Zone::Conditional(state) => {
                    let next = if is_blank(line) {
                        Some(state)
                    } else {
                        match state {
                            GroupState::Seeking if is_condition_open(line) => Some(GroupState::Opened),
                            GroupState::Opened | GroupState::Included if is_any_include(line) => {
                                Some(GroupState::Included)
                            }
                            GroupState::Included if is_condition_close(line) => {
                                pending.push(line);
                                conditional_groups.push(commit_group(&pending));
                                pending.clear();
                                zone = Zone::Conditional(GroupState::Seeking);
                                break;
                            }
                            _ => None,
                        }
                    };

                    match next {
                        Some(state) => {
                            pending.push(line);
                            zone = Zone::Conditional(state);
                        }
                        None => {
                            body.extend(pending.drain(..).map(str::to_string));
                            zone = Zone::Body;
                            continue;
                        }
                    }
                }
                Zone::Body => body.push(line.to_string()),
            }
            break;
        }
    }

    // An unfinished group belongs to the body
    if !pending.is_empty() {
        let mut tail: Vec<String> = pending.drain(..).map(str::to_string).collect();
        tail.append(&mut body);
        body = tail;
    }
    trim_blank_edges(&mut body);

    Ok(HeaderRecord {
        id: id.clone(),
        guard,
        system_includes,
        local_includes,
        conditional_groups,
        body,
    })
}
