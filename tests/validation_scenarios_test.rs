use chrono::NaiveDate;
use csv_gate::pipeline::validation::{FailureKind, FileValidator, RowViolation, ValidationOutcome};

const HEADER: &str = "identifier,contact_address,enrollment_date";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn validate(content: &str) -> ValidationOutcome {
    FileValidator::default().validate_content_on(content.as_bytes(), today())
}

fn with_rows(rows: &[&str]) -> String {
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    content
}

#[test]
fn scenario_valid_row() {
    assert_eq!(validate(&with_rows(&["ab12,a@b.co,2024-01-01"])), ValidationOutcome::Valid);
}

#[test]
fn scenario_hyphenated_identifier() {
    let outcome = validate(&with_rows(&["ab-12,a@b.co,2024-01-01"]));
    assert_eq!(outcome.error().as_deref(), Some("identifier must be alphanumeric"));
    assert_eq!(outcome.line_number(), Some(2));
}

#[test]
fn scenario_bad_contact_address() {
    let outcome = validate(&with_rows(&["ab12,bad-email,2024-01-01"]));
    assert_eq!(outcome.error().as_deref(), Some("email format is invalid"));
    assert_eq!(outcome.line_number(), Some(2));
}

#[test]
fn scenario_future_date() {
    // Checked against the real clock as well as the pinned date
    let outcome = FileValidator::default().validate_content(with_rows(&["ab12,a@b.co,2999-01-01"]).as_bytes());
    assert_eq!(outcome.error().as_deref(), Some("signup_date cannot be in the future"));
    assert_eq!(outcome.line_number(), Some(2));
}

#[test]
fn scenario_missing_contact_header() {
    let outcome = validate("identifier,enrollment_date\nab12,2024-01-01\n");
    assert_eq!(outcome.error().as_deref(), Some("Missing required headers: contact_address"));
    assert_eq!(outcome.line_number(), Some(1));
}

#[test]
fn first_invalid_data_row_k_reports_line_k_plus_one() {
    let good = "ab12,a@b.co,2024-01-01";
    for k in 1..=6 {
        let mut rows = vec![good; 6];
        rows[k - 1] = "ab12,a@b.co,20240101";
        // Later rows are broken too; only the first one may be reported
        for row in rows.iter_mut().skip(k) {
            *row = "!!,,";
        }
        let outcome = validate(&with_rows(&rows));
        assert_eq!(
            outcome,
            ValidationOutcome::invalid(k + 1, FailureKind::Row(RowViolation::DateMalformed)),
            "first invalid row {k}"
        );
    }
}

#[test]
fn every_missing_header_is_named_exactly() {
    let cases = [
        ("contact_address,enrollment_date", "identifier"),
        ("identifier,contact_address", "enrollment_date"),
        ("other", "contact_address, enrollment_date, identifier"),
    ];
    for (header, missing) in cases {
        let outcome = validate(&format!("{header}\nx\n"));
        assert_eq!(outcome.line_number(), Some(1), "{header}");
        assert_eq!(outcome.error(), Some(format!("Missing required headers: {missing}")));
    }
}

#[test]
fn superset_header_with_valid_rows_passes() {
    let content = "signup_channel,identifier,contact_address,enrollment_date,notes\n\
                   web,ab12,a@b.co,2024-01-01,first\n\
                   store,CD34,c.d@e-f.org,2025-06-15,\n";
    assert_eq!(validate(content), ValidationOutcome::Valid);
}

#[test]
fn identifier_failure_precedes_address_and_date() {
    let outcome = validate(&with_rows(&["ab 12,bad-email,someday"]));
    assert_eq!(outcome.error().as_deref(), Some("identifier must be alphanumeric"));
}

#[test]
fn validation_is_idempotent() {
    let content = with_rows(&["ab12,a@b.co,2024-01-01", "cd34,,2024-01-01"]);
    let validator = FileValidator::default();
    let first = validator.validate_content_on(content.as_bytes(), today());
    let second = validator.validate_content_on(content.as_bytes(), today());
    assert_eq!(first, second);
    assert_eq!(first.error().as_deref(), Some("email is empty"));
    assert_eq!(first.line_number(), Some(3));
}

#[test]
fn fixture_files_validate_as_expected() {
    let valid = include_bytes!("resources/valid_users.csv");
    assert!(FileValidator::default().validate_content_on(valid, today()).is_valid());

    let bad = include_bytes!("resources/bad_address_row4.csv");
    let outcome = FileValidator::default().validate_content_on(bad, today());
    assert_eq!(outcome.error().as_deref(), Some("email format is invalid"));
    assert_eq!(outcome.line_number(), Some(4));
}
