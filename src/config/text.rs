/*!
 * Textual Configuration Format
 *
 * ```text
 * 5            # P, number of processes
 * 3            # R, number of resource types
 * 3 3 2        # available
 * 0 1 0        # allocation, one row per process
 * ...
 * 7 5 3        # max claim, one row per process
 * ...
 * ```
 *
 * `#` starts a comment, and lines holding only a comment are skipped.
 * Trailing blank lines are ignored; rows of width zero may be blank or absent.
 */

use crate::core::errors::ConfigError;
use crate::core::limits::{MAX_PROCESSES, MAX_RESOURCE_TYPES};
use crate::core::types::Quantity;
use crate::state::{MatrixState, ResourceVector};

/// Positional view over the meaningful lines of the input
///
/// Lines holding only a comment are skipped; every kept line remembers its
/// one-based number in the input for error reporting.
struct Lines<'a> {
    lines: Vec<(usize, &'a str)>,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        let mut lines: Vec<(usize, &str)> = input
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim_start().starts_with('#'))
            .map(|(index, line)| (index + 1, line.split('#').next().unwrap_or("").trim()))
            .collect();
        while lines.last().is_some_and(|(_, line)| line.is_empty()) {
            lines.pop();
        }
        Self { lines }
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    /// Line at zero-based `index`, `None` past the end
    fn get(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).map(|&(_, line)| line)
    }

    /// Input line number of `index`; past the end, counts on from the last kept line
    fn number(&self, index: usize) -> usize {
        match self.lines.get(index) {
            Some(&(number, _)) => number,
            None => {
                let last = self.lines.last().map_or(0, |&(number, _)| number);
                last + 1 + (index - self.lines.len())
            }
        }
    }
}

/// Parse the textual format into a validated state
pub fn parse_text(input: &str) -> Result<MatrixState, ConfigError> {
    let lines = Lines::new(input);
    if lines.is_empty() {
        return Err(ConfigError::Empty);
    }

    let processes = parse_count(&lines, 0, "process count")?;
    let resources = parse_count(&lines, 1, "resource type count")?;

    if processes > MAX_PROCESSES {
        return Err(ConfigError::LimitExceeded {
            what: "process count".to_string(),
            limit: MAX_PROCESSES,
            found: processes,
        });
    }
    if resources > MAX_RESOURCE_TYPES {
        return Err(ConfigError::LimitExceeded {
            what: "resource type count".to_string(),
            limit: MAX_RESOURCE_TYPES,
            found: resources,
        });
    }

    let available = parse_row(&lines, 2, "available vector", resources)?;

    let allocation = (0..processes)
        .map(|pid| parse_row(&lines, 3 + pid, &format!("allocation row {}", pid), resources))
        .collect::<Result<Vec<_>, _>>()?;

    let max_claim = (0..processes)
        .map(|pid| {
            parse_row(
                &lines,
                3 + processes + pid,
                &format!("max row {}", pid),
                resources,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let consumed = 3 + 2 * processes;
    let trailing = (consumed..lines.len()).find(|&i| lines.get(i).is_some_and(|l| !l.is_empty()));
    if let Some(extra) = trailing {
        return Err(ConfigError::TrailingData {
            line: lines.number(extra),
        });
    }

    MatrixState::new(available, allocation, max_claim)
}

/// Render a state in the textual format
///
/// `parse_text(&to_text(s))` yields a state equal to `s`.
pub fn to_text(state: &MatrixState) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n{}\n", state.process_count(), state.resource_count()));
    push_row(&mut out, state.available());
    for row in state.allocation_rows() {
        push_row(&mut out, row);
    }
    for row in state.max_claim_rows() {
        push_row(&mut out, row);
    }
    out
}

fn push_row(out: &mut String, row: &ResourceVector) {
    let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
    out.push_str(&values.join(" "));
    out.push('\n');
}

fn parse_count(lines: &Lines<'_>, index: usize, what: &str) -> Result<usize, ConfigError> {
    let line = lines.number(index);
    let content = lines.get(index).ok_or_else(|| ConfigError::MissingLine {
        line,
        what: what.to_string(),
    })?;

    let tokens: Vec<&str> = content.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Err(ConfigError::MissingLine {
            line,
            what: what.to_string(),
        }),
        [token] => {
            let value = parse_quantity(token, line, what)?;
            usize::try_from(value).map_err(|_| ConfigError::InvalidToken {
                line,
                token: token.to_string(),
            })
        }
        _ => Err(ConfigError::MalformedCount {
            line,
            what: what.to_string(),
        }),
    }
}

fn parse_row(
    lines: &Lines<'_>,
    index: usize,
    what: &str,
    width: usize,
) -> Result<ResourceVector, ConfigError> {
    let line = lines.number(index);
    let content = match lines.get(index) {
        Some(content) => content,
        None if width == 0 => "",
        None => {
            return Err(ConfigError::MissingLine {
                line,
                what: what.to_string(),
            })
        }
    };

    let tokens: Vec<&str> = content.split_whitespace().collect();
    if tokens.len() != width {
        return Err(ConfigError::RowWidth {
            what: format!("{} (line {})", what, line),
            expected: width,
            found: tokens.len(),
        });
    }

    tokens
        .iter()
        .map(|token| parse_quantity(token, line, what))
        .collect::<Result<Vec<_>, _>>()
        .map(ResourceVector::new)
}

/// Parse one whole, non-negative quantity
fn parse_quantity(token: &str, line: usize, what: &str) -> Result<Quantity, ConfigError> {
    if let Ok(value) = token.parse::<Quantity>() {
        return Ok(value);
    }
    match token.parse::<i64>() {
        Ok(value) if value < 0 => Err(ConfigError::NegativeQuantity {
            what: format!("{} (line {})", what, line),
            value,
        }),
        _ => Err(ConfigError::InvalidToken {
            line,
            token: token.to_string(),
        }),
    }
}
