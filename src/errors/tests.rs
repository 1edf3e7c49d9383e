//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip, Warning, WarningImpl};

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        10,
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_line(), 10);
}

#[test]
fn test_redeclaration_message() {
    let error = Error::new(
        ErrorImpl::SymbolAlreadyDeclared {
            name: "b".to_string(),
            previous_line: 4,
        },
        5,
    );

    assert_eq!(error.get_error_name(), "SymbolAlreadyDeclared");
    assert_eq!(error.to_string(), "5: Symbol 'b' previously declared (on line 4)");
}

#[test]
fn test_undeclared_message() {
    let error = Error::new(
        ErrorImpl::SymbolNotDeclared {
            name: "foo".to_string(),
        },
        3,
    );

    assert_eq!(error.to_string(), "3: Use of 'foo' before declaration");
}

#[test]
fn test_argument_count_tip() {
    let error = Error::new(
        ErrorImpl::ArgumentCountMismatch {
            function: "f".to_string(),
            expected: 1,
            received: 2,
            variadic: false,
        },
        0,
    );

    assert_eq!(error.get_error_name(), "ArgumentCountMismatch");
    assert_eq!(error.get_tip().to_string(), "Expected 1 arguments, received 2");

    let error = Error::new(
        ErrorImpl::ArgumentCountMismatch {
            function: "printf".to_string(),
            expected: 1,
            received: 0,
            variadic: true,
        },
        0,
    );
    assert_eq!(error.get_tip().to_string(), "Expected at least 1 arguments, received 0");
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        0,
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
        },
        0,
    );

    match error.get_tip() {
        ErrorTip::Suggestion(_) => (),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_index_out_of_range_tip() {
    let error = Error::new(ErrorImpl::IndexOutOfRange { index: 4, size: 4 }, 7);

    assert_eq!(error.get_error_name(), "IndexOutOfRange");
    assert_eq!(error.get_tip().to_string(), "Valid indices are 0 to 3");
}

#[test]
fn test_missing_return_warning() {
    let warning = Warning::new(
        WarningImpl::MissingReturn {
            function: "a".to_string(),
        },
        12,
    );

    assert_eq!(
        warning.to_string(),
        "12: Control may reach end of non-void function 'a' without return"
    );
}
