//! Parser for the `.patch` text format.
//!
//! ```text
//! <number of patches>
//! <16 comma-separated control point indices>   (one line per patch)
//! <number of control points>
//! <x>, <y>, <z>                                 (one line per point)
//! ```

use crate::PatchSet;

/// Indices listed for every patch
pub const INDICES_PER_PATCH: usize = 16;

/// Errors produced while reading a patch file
#[derive(Debug, Clone, PartialEq)]
pub enum PatchParseError {
    /// The input ended before the declared content was read
    UnexpectedEof { expected: String },
    /// A count, index or coordinate could not be parsed
    InvalidNumber { line: usize, token: String },
    /// A patch line did not list exactly 16 indices
    WrongIndexCount { line: usize, found: usize },
    /// A point line did not have exactly 3 coordinates
    WrongCoordinateCount { line: usize, found: usize },
}

impl std::fmt::Display for PatchParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatchParseError::UnexpectedEof { expected } => {
                write!(f, "Unexpected end of patch data, expected {}", expected)
            }
            PatchParseError::InvalidNumber { line, token } => {
                write!(f, "Line {}: invalid number '{}'", line, token)
            }
            PatchParseError::WrongIndexCount { line, found } => write!(
                f,
                "Line {}: expected {} indices, found {}",
                line, INDICES_PER_PATCH, found
            ),
            PatchParseError::WrongCoordinateCount { line, found } => {
                write!(f, "Line {}: expected 3 coordinates, found {}", line, found)
            }
        }
    }
}

impl std::error::Error for PatchParseError {}

/// Line reader skipping blank lines, keeping 1-based line numbers
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.lines().enumerate(),
        }
    }

    fn next_line(&mut self, expected: &str) -> Result<(usize, &'a str), PatchParseError> {
        for (idx, line) in self.inner.by_ref() {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok((idx + 1, trimmed));
            }
        }
        Err(PatchParseError::UnexpectedEof {
            expected: expected.to_string(),
        })
    }
}

fn parse_token<T: std::str::FromStr>(line: usize, token: &str) -> Result<T, PatchParseError> {
    token
        .trim()
        .parse()
        .map_err(|_| PatchParseError::InvalidNumber {
            line,
            token: token.trim().to_string(),
        })
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Parse the contents of a `.patch` file
pub fn parse_patch_set(text: &str) -> Result<PatchSet, PatchParseError> {
    let mut lines = Lines::new(text);
    // Header counts are untrusted; no record can take less than a line
    let line_bound = text.lines().count();

    let (line, header) = lines.next_line("patch count")?;
    let patch_count: usize = parse_token(line, header)?;

    let mut patches = Vec::with_capacity(patch_count.min(line_bound));
    for i in 0..patch_count {
        let (line, text) = lines.next_line(&format!("indices of patch {}", i))?;
        let indices = split_fields(text)
            .map(|t| parse_token::<usize>(line, t))
            .collect::<Result<Vec<_>, _>>()?;
        if indices.len() != INDICES_PER_PATCH {
            return Err(PatchParseError::WrongIndexCount {
                line,
                found: indices.len(),
            });
        }
        patches.push(indices);
    }

    let (line, header) = lines.next_line("control point count")?;
    let point_count: usize = parse_token(line, header)?;

    let mut control_points = Vec::with_capacity(point_count.min(line_bound));
    for i in 0..point_count {
        let (line, text) = lines.next_line(&format!("control point {}", i))?;
        let coords = split_fields(text)
            .map(|t| parse_token::<f32>(line, t))
            .collect::<Result<Vec<_>, _>>()?;
        match coords.as_slice() {
            [x, y, z] => control_points.push([*x, *y, *z]),
            _ => {
                return Err(PatchParseError::WrongCoordinateCount {
                    line,
                    found: coords.len(),
                })
            }
        }
    }

    Ok(PatchSet {
        patches,
        control_points,
    })
}

/// Render a patch set back into the `.patch` text format
pub fn write_patch_set(set: &PatchSet) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", set.patches.len()));
    for patch in &set.patches {
        let line: Vec<String> = patch.iter().map(|i| i.to_string()).collect();
        out.push_str(&line.join(", "));
        out.push('\n');
    }
    out.push_str(&format!("{}\n", set.control_points.len()));
    for [x, y, z] in &set.control_points {
        out.push_str(&format!("{}, {}, {}\n", x, y, z));
    }
    out
}
