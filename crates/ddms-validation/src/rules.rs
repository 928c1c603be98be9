//! Validation rules shared by attribute groups and components

use crate::{Error, Result};
use chrono::NaiveDate;
use ddms_ir::QName;
use ddms_schema::Version;
use regex::Regex;
use std::sync::LazyLock;

static NCNAME: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$"));

/// Message for something introduced in a later version
#[must_use]
pub fn since_message(subject: &str, since: Version) -> String {
    format!("The {subject} cannot be used until DDMS {since} or later.")
}

/// Message for something limited to an explicit list of versions
#[must_use]
pub fn only_message(subject: &str, versions: &[Version]) -> String {
    let names: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
    let list = match names.as_slice() {
        [] => String::new(),
        [one] => (*one).to_string(),
        [first, second] => format!("{first} or {second}"),
        [rest @ .., last] => format!("{}, or {last}", rest.join(", ")),
    };
    format!("The {subject} can only be used in DDMS {list}.")
}

/// Check that `version` is in `[since, until)`.
///
/// # Errors
///
/// Returns [`Error::InvalidStructure`] naming the subject and its legal range.
pub fn require_in_range(
    subject: &str,
    version: Version,
    since: Version,
    until: Option<Version>,
) -> Result<()> {
    let legal = version.is_at_least(since) && until.is_none_or(|until| version < until);
    if legal {
        return Ok(());
    }
    let message = match until {
        None => since_message(subject, since),
        Some(until) => {
            let versions: Vec<Version> = Version::ALL
                .into_iter()
                .filter(|v| v.is_at_least(since) && *v < until)
                .collect();
            only_message(subject, &versions)
        }
    };
    Err(Error::invalid(message))
}

/// Check an element name against the expected qualified name
///
/// # Errors
///
/// Returns [`Error::InvalidStructure`] when namespace or local name differ.
pub fn require_qualified_name(actual: &QName, expected: &QName) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "Unexpected namespace URI and local name encountered: {actual}"
        )))
    }
}

/// Check that a value is not blank
///
/// # Errors
///
/// Returns [`Error::InvalidStructure`] with `"{name} is required."`.
pub fn require_value(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::invalid(format!("{name} is required.")))
    } else {
        Ok(())
    }
}

/// Check a child count against its cardinality
///
/// # Errors
///
/// Returns [`Error::InvalidStructure`] when the count is out of bounds.
pub fn require_bounded(count: usize, min: usize, max: Option<usize>, name: &str) -> Result<()> {
    if max == Some(min) && count != min {
        return Err(Error::invalid(format!("Exactly {min} {name} element must exist.")));
    }
    if count < min {
        return Err(Error::invalid(format!("At least {min} {name} element must exist.")));
    }
    match max {
        Some(max) if count > max => Err(Error::invalid(format!(
            "No more than {max} {name} element can exist."
        ))),
        _ => Ok(()),
    }
}

/// Check that a child was built under the same version as its parent
///
/// # Errors
///
/// Returns [`Error::InvalidStructure`] naming the child.
pub fn require_compatible_version(parent: Version, child: Version, child_name: &str) -> Result<()> {
    if parent == child {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "A child component, {child_name}, is using a different version of DDMS from its parent."
        )))
    }
}

/// Check the `xs:date` form `YYYY-MM-DD`
///
/// # Errors
///
/// Returns [`Error::InvalidStructure`] when the value is not a calendar date.
pub fn require_date(value: &str, name: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        Error::invalid(format!(
            "The {name} attribute must be in the xs:date format (YYYY-MM-DD)."
        ))
    })
}

/// Check for an integer greater than zero
///
/// # Errors
///
/// Returns [`Error::InvalidStructure`] when the value is not a positive integer.
pub fn require_positive_integer(value: &str, name: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::invalid(format!(
            "The {name} attribute must be a positive integer."
        ))),
    }
}

/// Parse an `xs:boolean` lexical value
#[must_use]
pub fn parse_boolean(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Check an `xs:boolean` lexical value
///
/// # Errors
///
/// Returns [`Error::InvalidStructure`] when the value is not a boolean.
pub fn require_boolean(value: &str, name: &str) -> Result<bool> {
    parse_boolean(value)
        .ok_or_else(|| Error::invalid(format!("The {name} attribute must be a boolean.")))
}

/// Check a length limit, counted in characters
///
/// # Errors
///
/// Returns [`Error::InvalidStructure`] when the value is too long.
pub fn require_max_length(value: &str, max: usize, name: &str) -> Result<()> {
    if value.chars().count() > max {
        Err(Error::invalid(format!(
            "The {name} attribute must be shorter than {max} characters."
        )))
    } else {
        Ok(())
    }
}

/// Check for an `xs:NCName`
///
/// # Errors
///
/// Returns [`Error::InvalidStructure`] when the value is not an NCName.
pub fn require_ncname(value: &str, name: &str) -> Result<()> {
    let pattern = NCNAME
        .as_ref()
        .map_err(|e| Error::argument(format!("NCName pattern failed to compile: {e}")))?;
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(Error::invalid(format!("\"{value}\" is not a valid NCName for {name}.")))
    }
}

/// Check a space-delimited list of NCNames
///
/// # Errors
///
/// See [`require_ncname`].
pub fn require_ncname_list(value: &str, name: &str) -> Result<()> {
    value
        .split_whitespace()
        .try_for_each(|token| require_ncname(token, name))
}

/// Check for an `xs:double`
///
/// # Errors
///
/// Returns [`Error::InvalidStructure`] when the value is not numeric.
pub fn require_number(value: &str, name: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| Error::invalid(format!("The {name} value must be a number: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_since_message() {
        let err = require_in_range(
            "ISM:atomicEnergyMarkings attribute",
            Version::V3_0,
            Version::V3_1,
            None,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The ISM:atomicEnergyMarkings attribute cannot be used until DDMS 3.1 or later."
        );
        assert!(
            require_in_range("x", Version::V5_0, Version::V3_1, None).is_ok()
        );
    }

    #[test]
    fn test_only_message() {
        let err = require_in_range(
            "ISM:typeOfExemptedSource attribute",
            Version::V3_1,
            Version::V2_0,
            Some(Version::V3_1),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The ISM:typeOfExemptedSource attribute can only be used in DDMS 2.0 or 3.0."
        );
        assert_eq!(
            only_message("x", &[Version::V2_0]),
            "The x can only be used in DDMS 2.0."
        );
        assert_eq!(
            only_message("x", &[Version::V2_0, Version::V3_0, Version::V3_1]),
            "The x can only be used in DDMS 2.0, 3.0, or 3.1."
        );
    }

    #[test]
    fn test_bounded() {
        assert!(require_bounded(1, 1, None, "ddms:title").is_ok());
        assert_eq!(
            require_bounded(0, 1, None, "ddms:title").unwrap_err().to_string(),
            "At least 1 ddms:title element must exist."
        );
        assert_eq!(
            require_bounded(2, 1, Some(1), "ddms:security").unwrap_err().to_string(),
            "Exactly 1 ddms:security element must exist."
        );
        assert_eq!(
            require_bounded(2, 0, Some(1), "ntk:Access").unwrap_err().to_string(),
            "No more than 1 ntk:Access element can exist."
        );
    }

    #[test]
    fn test_date() {
        assert!(require_date("2010-01-31", "ISM:createDate").is_ok());
        assert!(require_date("2010-02-30", "ISM:createDate").is_err());
        let err = require_date("31/01/2010", "ISM:createDate").unwrap_err();
        assert_eq!(
            err.to_string(),
            "The ISM:createDate attribute must be in the xs:date format (YYYY-MM-DD)."
        );
    }

    #[test]
    fn test_scalars() {
        assert_eq!(require_positive_integer("3", "srsDimension").unwrap(), 3);
        assert!(require_positive_integer("0", "srsDimension").is_err());
        assert!(require_positive_integer("-1", "srsDimension").is_err());
        assert!(require_boolean("true", "ISM:externalNotice").unwrap());
        assert!(!require_boolean("0", "ISM:externalNotice").unwrap());
        assert!(require_boolean("yes", "ISM:externalNotice").is_err());
        assert!(require_number("32.1", "gml:pos").is_ok());
        assert!(require_number("NaN", "gml:pos").is_err());
    }

    #[test]
    fn test_ncname() {
        assert!(require_ncname("IDValue", "gml:id").is_ok());
        assert!(require_ncname("_a.b-c", "gml:id").is_ok());
        assert!(require_ncname("1abc", "gml:id").is_err());
        assert!(require_ncname("a:b", "gml:id").is_err());
        assert!(require_ncname_list("X Y Z", "axisLabels").is_ok());
        assert!(require_ncname_list("X 1Y", "axisLabels").is_err());
    }

    #[test]
    fn test_max_length() {
        assert!(require_max_length("abc", 3, "ISM:noticeReason").is_ok());
        assert!(require_max_length("abcd", 3, "ISM:noticeReason").is_err());
    }

    #[test]
    fn test_qualified_name() {
        let expected = QName::new("urn:us:mil:ces:metadata:ddms:5", "ddms", "title");
        let actual = QName::new("urn:us:mil:ces:metadata:ddms:5", "ddms", "subtitle");
        let err = require_qualified_name(&actual, &expected).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected namespace URI and local name encountered: ddms:subtitle"
        );
    }
}
