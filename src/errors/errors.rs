use std::fmt::Display;

use thiserror::Error;

/// A fatal diagnostic. Compilation stops at the first one.
#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    line: u32,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, line: u32) -> Self {
        Error {
            internal_error: error_impl,
            line,
        }
    }

    pub fn get_line(&self) -> u32 {
        self.line
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::MalformedTree { .. } => "MalformedTree",
            ErrorImpl::SymbolAlreadyDeclared { .. } => "SymbolAlreadyDeclared",
            ErrorImpl::SymbolNotDeclared { .. } => "SymbolNotDeclared",
            ErrorImpl::NotAFunction { .. } => "NotAFunction",
            ErrorImpl::NotAVariable { .. } => "NotAVariable",
            ErrorImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            ErrorImpl::SignatureMismatch { .. } => "SignatureMismatch",
            ErrorImpl::FunctionNotDefined { .. } => "FunctionNotDefined",
            ErrorImpl::NoConversion { .. } => "NoConversion",
            ErrorImpl::NoCommonType { .. } => "NoCommonType",
            ErrorImpl::InvalidOperand { .. } => "InvalidOperand",
            ErrorImpl::AssignToConstant { .. } => "AssignToConstant",
            ErrorImpl::AssignToArray => "AssignToArray",
            ErrorImpl::NotAssignable => "NotAssignable",
            ErrorImpl::DereferenceNonPointer { .. } => "DereferenceNonPointer",
            ErrorImpl::NotAnArray { .. } => "NotAnArray",
            ErrorImpl::IndexNotInteger { .. } => "IndexNotInteger",
            ErrorImpl::IndexOutOfRange { .. } => "IndexOutOfRange",
            ErrorImpl::ScalarArrayInitializer { .. } => "ScalarArrayInitializer",
            ErrorImpl::ListInitializerForScalar { .. } => "ListInitializerForScalar",
            ErrorImpl::InvalidArraySize { .. } => "InvalidArraySize",
            ErrorImpl::InitializerTooLong { .. } => "InitializerTooLong",
            ErrorImpl::VoidVariable { .. } => "VoidVariable",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::ReturnValueInVoidFunction { .. } => "ReturnValueInVoidFunction",
            ErrorImpl::MissingReturnValue { .. } => "MissingReturnValue",
            ErrorImpl::JumpOutsideLoop { .. } => "JumpOutsideLoop",
            ErrorImpl::MissingMain => "MissingMain",
            ErrorImpl::InvalidMain { .. } => "InvalidMain",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } | ErrorImpl::MalformedTree { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::SymbolAlreadyDeclared { name, .. } => {
                ErrorTip::Suggestion(format!("Rename one of the declarations of `{}`", name))
            }
            ErrorImpl::SymbolNotDeclared { name } => {
                ErrorTip::Suggestion(format!("Declare `{}` before using it", name))
            }
            ErrorImpl::NotAFunction { name } => {
                ErrorTip::Suggestion(format!("`{}` is a variable and cannot be called", name))
            }
            ErrorImpl::NotAVariable { name } => ErrorTip::Suggestion(format!(
                "`{}` is a function, call it with `{}(...)`",
                name, name
            )),
            ErrorImpl::ArgumentCountMismatch {
                expected,
                received,
                variadic,
                ..
            } => ErrorTip::Suggestion(format!(
                "Expected {}{} arguments, received {}",
                if *variadic { "at least " } else { "" },
                expected,
                received
            )),
            ErrorImpl::SignatureMismatch { name } => ErrorTip::Suggestion(format!(
                "Make the declaration and the definition of `{}` agree",
                name
            )),
            ErrorImpl::FunctionNotDefined { name } => {
                ErrorTip::Suggestion(format!("Provide a body for `{}`", name))
            }
            ErrorImpl::NoConversion { from, to } => {
                ErrorTip::Suggestion(format!("Values of type `{}` cannot become `{}`", from, to))
            }
            ErrorImpl::NoCommonType { left, right, .. } => ErrorTip::Suggestion(format!(
                "Cast `{}` or `{}` explicitly",
                left, right
            )),
            ErrorImpl::AssignToConstant { name } => {
                ErrorTip::Suggestion(format!("`{}` is declared const", name))
            }
            ErrorImpl::IndexOutOfRange { size, .. } => {
                ErrorTip::Suggestion(format!("Valid indices are 0 to {}", size.saturating_sub(1)))
            }
            ErrorImpl::MissingMain | ErrorImpl::InvalidMain { .. } => {
                ErrorTip::Suggestion(String::from("Declare the entry point as `void main()`"))
            }
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.line, self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("malformed tree: {message}")]
    MalformedTree { message: String },
    #[error("Symbol '{name}' previously declared (on line {previous_line})")]
    SymbolAlreadyDeclared { name: String, previous_line: u32 },
    #[error("Use of '{name}' before declaration")]
    SymbolNotDeclared { name: String },
    #[error("'{name}' is not a function")]
    NotAFunction { name: String },
    #[error("Function '{name}' used as a value")]
    NotAVariable { name: String },
    #[error("Wrong number of arguments for '{function}': expected {expected}, received {received}")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        received: usize,
        variadic: bool,
    },
    #[error("Conflicting signatures for function '{name}'")]
    SignatureMismatch { name: String },
    #[error("Function '{name}' is declared but never defined")]
    FunctionNotDefined { name: String },
    #[error("No conversion from '{from}' to '{to}'")]
    NoConversion { from: String, to: String },
    #[error("Operator '{operator}' has no common type for '{left}' and '{right}'")]
    NoCommonType {
        operator: String,
        left: String,
        right: String,
    },
    #[error("Invalid operand of type '{operand}' for operator '{operator}'")]
    InvalidOperand { operator: String, operand: String },
    #[error("Assignment to const-qualified '{name}'")]
    AssignToConstant { name: String },
    #[error("Assignment to an array")]
    AssignToArray,
    #[error("Left side of the assignment is not assignable")]
    NotAssignable,
    #[error("Dereferencing non-pointer type '{ty}'")]
    DereferenceNonPointer { ty: String },
    #[error("Subscripted value '{name}' is not an array")]
    NotAnArray { name: String },
    #[error("Array index has non-integer type '{ty}'")]
    IndexNotInteger { ty: String },
    #[error("Array index {index} out of range for array of size {size}")]
    IndexOutOfRange { index: i64, size: usize },
    #[error("Array '{name}' needs an initializer list")]
    ScalarArrayInitializer { name: String },
    #[error("Scalar '{name}' cannot take an initializer list")]
    ListInitializerForScalar { name: String },
    #[error("Array '{name}' needs a positive size")]
    InvalidArraySize { name: String },
    #[error("Too many initializers for array '{name}' of size {size}")]
    InitializerTooLong { name: String, size: usize },
    #[error("Variable '{name}' declared void")]
    VoidVariable { name: String },
    #[error("Return statement outside of a function")]
    ReturnOutsideFunction,
    #[error("Returning a value from void function '{function}'")]
    ReturnValueInVoidFunction { function: String },
    #[error("Non-void function '{function}' should return a value")]
    MissingReturnValue { function: String },
    #[error("'{statement}' statement not within a loop")]
    JumpOutsideLoop { statement: String },
    #[error("No 'main' function found")]
    MissingMain,
    #[error("Invalid 'main' function: {reason}")]
    InvalidMain { reason: String },
}

/// A non-fatal diagnostic, collected by the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    internal_warning: WarningImpl,
    line: u32,
}

impl Warning {
    pub fn new(warning_impl: WarningImpl, line: u32) -> Self {
        Warning {
            internal_warning: warning_impl,
            line,
        }
    }

    pub fn get_line(&self) -> u32 {
        self.line
    }

    pub fn get_impl(&self) -> &WarningImpl {
        &self.internal_warning
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.line, self.internal_warning)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WarningImpl {
    #[error("Control may reach end of non-void function '{function}' without return")]
    MissingReturn { function: String },
    #[error("Type '{ty}' has no instruction operand tag")]
    UnmappedType { ty: String },
}
