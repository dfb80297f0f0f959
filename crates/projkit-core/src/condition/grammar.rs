//! Condition text grammar
//!
//! Parses and writes the equality conditions attached to property and item
//! groups:
//!
//! ```text
//! '$(Configuration)|$(Platform)' == 'Debug|AnyCPU'
//! ```
//!
//! The left side is a pipe-separated list of `$(Name)` references, the right
//! side the matching pipe-separated list of raw values.

use std::sync::LazyLock;

use regex::Regex;

use super::error::ConditionError;
use super::set::Condition;

static CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^'([^']*)'\s*==\s*'([^']*)'$").expect("condition pattern is valid")
});

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$\(([A-Za-z_][A-Za-z0-9_\-]*)\)$").expect("name pattern is valid")
});

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").expect("identifier pattern is valid")
});

/// Check that a condition can be written as condition text and read back:
/// the name is a plain identifier and the value holds no `'` or `|`.
pub(crate) fn check_condition(condition: &Condition) -> Result<(), ConditionError> {
    if !IDENTIFIER_RE.is_match(condition.name()) {
        return Err(ConditionError::InvalidConfigurationName(
            condition.name().to_string(),
        ));
    }
    if condition.value().contains(['\'', '|']) {
        return Err(ConditionError::InvalidConditionValue(
            condition.value().to_string(),
        ));
    }
    Ok(())
}

/// Parse condition text into its ordered `(name, value)` pairs.
///
/// Surrounding whitespace is ignored, so the output of
/// [`serialize_conditions`] parses back unchanged.
pub fn parse_conditions(text: &str) -> Result<Vec<Condition>, ConditionError> {
    let captures = CONDITION_RE
        .captures(text.trim())
        .ok_or_else(|| ConditionError::InvalidConditionText(text.to_string()))?;

    let names = captures[1]
        .split('|')
        .map(parse_name)
        .collect::<Result<Vec<_>, _>>()?;

    // An empty right side still yields one (empty) value
    let values: Vec<&str> = captures[2].split('|').collect();

    if names.len() != values.len() {
        return Err(ConditionError::CountMismatch {
            names: names.len(),
            values: values.len(),
        });
    }

    Ok(names
        .into_iter()
        .zip(values)
        .map(|(name, value)| Condition::new(name, value))
        .collect())
}

fn parse_name(segment: &str) -> Result<&str, ConditionError> {
    NAME_RE
        .captures(segment)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ConditionError::InvalidConfigurationName(segment.to_string()))
}

/// Write conditions back to condition text.
///
/// The result always carries exactly one leading and one trailing space:
/// `" '$(A)|$(B)' == 'x|y' "`.
pub fn serialize_conditions(conditions: &[Condition]) -> String {
    format!(
        " {} == {} ",
        join_names(conditions, true),
        join_values(conditions, true)
    )
}

/// Join condition names as `$(A)|$(B)`, optionally wrapped in single quotes.
pub(crate) fn join_names(conditions: &[Condition], quoted: bool) -> String {
    let joined = conditions
        .iter()
        .map(|c| format!("$({})", c.name()))
        .collect::<Vec<_>>()
        .join("|");
    quote_if(joined, quoted)
}

/// Join condition values as `x|y`, optionally wrapped in single quotes.
pub(crate) fn join_values(conditions: &[Condition], quoted: bool) -> String {
    let joined = conditions
        .iter()
        .map(Condition::value)
        .collect::<Vec<_>>()
        .join("|");
    quote_if(joined, quoted)
}

fn quote_if(text: String, quoted: bool) -> String {
    if quoted {
        format!("'{}'", text)
    } else {
        text
    }
}
