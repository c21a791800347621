use crate::errors::{Result, TracerError};
use crate::model::{DataRequest, NewDataRequest};

/// Earliest and latest graduation years a request may name
pub const YEAR_WINDOW: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Validate a creation draft
///
/// Checks, in order:
/// 1. name, nim, email, phone_number and purpose are non-blank
/// 2. email is well formed
/// 3. years fall inside [`YEAR_WINDOW`] and `year_from <= year_to`
///
/// # Errors
/// Returns the first violation found: `MissingField`, `InvalidEmail` or
/// `InvalidYearRange`.
pub fn validate_new_request(draft: &NewDataRequest) -> Result<()> {
    validate_fields(
        &[
            ("name", &draft.name),
            ("nim", &draft.nim),
            ("email", &draft.email),
            ("phone_number", &draft.phone_number),
            ("purpose", &draft.purpose),
        ],
        &draft.email,
        draft.year_from,
        draft.year_to,
    )
}

/// Validate a full request snapshot
///
/// Same rules as [`validate_new_request`], plus `updated_at >= created_at`.
///
/// # Errors
/// `MissingField`, `InvalidEmail`, `InvalidYearRange`, or `Internal` when the
/// timestamps are out of order.
pub fn validate_request(request: &DataRequest) -> Result<()> {
    validate_fields(
        &[
            ("id", &request.id),
            ("name", &request.name),
            ("nim", &request.nim),
            ("email", &request.email),
            ("phone_number", &request.phone_number),
            ("purpose", &request.purpose),
        ],
        &request.email,
        request.year_from,
        request.year_to,
    )?;

    if request.updated_at < request.created_at {
        return Err(TracerError::Internal {
            message: format!(
                "data request {} was updated before it was created",
                request.id
            ),
        });
    }

    Ok(())
}

fn validate_fields(
    required: &[(&str, &String)],
    email: &str,
    year_from: Option<i32>,
    year_to: Option<i32>,
) -> Result<()> {
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(TracerError::MissingField {
                field: (*field).to_string(),
            });
        }
    }

    if !is_valid_email(email) {
        return Err(TracerError::InvalidEmail {
            email: email.to_string(),
        });
    }

    validate_year_range(year_from, year_to)
}

/// Check the optional year range
///
/// # Errors
/// `InvalidYearRange` when a year is outside [`YEAR_WINDOW`] or the range is
/// inverted.
pub fn validate_year_range(year_from: Option<i32>, year_to: Option<i32>) -> Result<()> {
    let out_of_window = [year_from, year_to]
        .into_iter()
        .flatten()
        .any(|y| !YEAR_WINDOW.contains(&y));
    let inverted = matches!((year_from, year_to), (Some(from), Some(to)) if from > to);

    if out_of_window || inverted {
        return Err(TracerError::InvalidYearRange { year_from, year_to });
    }
    Ok(())
}

/// Minimal address shape check: `local@domain.tld`, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}
