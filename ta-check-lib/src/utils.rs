//! Utility functions for identifier prefixes.
//!
//! An identifier is `<department><cohort><sequence>`, e.g. `135` + `22` +
//! `001`. Only the department and cohort parts are ever built here.

use crate::error::TaCheckError;
use regex::Regex;

lazy_static::lazy_static! {
    static ref DEPARTMENT_RE: Regex = Regex::new(r"^\d{1,5}$").expect("valid department regex");
    static ref COHORT_RE: Regex = Regex::new(r"^\d{1,2}$").expect("valid cohort regex");
}

/// Validate a department code: 1 to 5 digits.
pub fn validate_department(department: &str) -> Result<(), TaCheckError> {
    if DEPARTMENT_RE.is_match(department) {
        Ok(())
    } else {
        Err(TaCheckError::invalid_input(
            "department code",
            department,
            "must be 1-5 digits, longer codes leave no room for the cohort",
        ))
    }
}

/// Normalize a cohort code to two digits, e.g. `"7"` -> `"07"`.
pub fn normalize_cohort(cohort: &str) -> Result<String, TaCheckError> {
    let cohort = cohort.trim();
    if !COHORT_RE.is_match(cohort) {
        return Err(TaCheckError::invalid_input(
            "cohort code",
            cohort,
            "must be 1-2 digits, identifiers carry a two-digit cohort",
        ));
    }
    Ok(format!("{:0>2}", cohort))
}

/// Build the identifier prefix shared by a department's cohort.
///
/// # Examples
///
/// ```rust
/// use ta_check_lib::cohort_prefix;
///
/// assert_eq!(cohort_prefix("135", "20").unwrap(), "13520");
/// assert_eq!(cohort_prefix("135", "7").unwrap(), "13507");
/// ```
pub fn cohort_prefix(department: &str, cohort: &str) -> Result<String, TaCheckError> {
    let department = department.trim();
    validate_department(department)?;
    let cohort = normalize_cohort(cohort)?;
    Ok(format!("{}{}", department, cohort))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_cohort_pads() {
        assert_eq!(normalize_cohort("7").unwrap(), "07");
        assert_eq!(normalize_cohort("22").unwrap(), "22");
        assert_eq!(normalize_cohort(" 5 ").unwrap(), "05");
    }

    #[test]
    fn test_normalize_cohort_rejects_bad_input() {
        assert!(normalize_cohort("").is_err());
        assert!(normalize_cohort("123").is_err());
        assert!(normalize_cohort("2a").is_err());

        let err = normalize_cohort("123").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid cohort code '123': must be 1-2 digits, identifiers carry a two-digit cohort"
        );
    }

    #[test]
    fn test_validate_department() {
        assert!(validate_department("135").is_ok());
        assert!(validate_department("182").is_ok());
        assert!(validate_department("").is_err());
        assert!(validate_department("IF").is_err());
        assert!(validate_department("135;").is_err());
    }

    #[test]
    fn test_cohort_prefix() {
        assert_eq!(cohort_prefix("135", "22").unwrap(), "13522");
        assert_eq!(cohort_prefix("182", "9").unwrap(), "18209");
        assert!(matches!(
            cohort_prefix("135", "xx"),
            Err(TaCheckError::InvalidInput { .. })
        ));
    }
}
