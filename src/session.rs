//! Per-compilation state shared by every pass.
//!
//! A `Session` owns the label counter and the warnings collected so far.
//! It is passed by mutable reference from pass to pass, so two compilations
//! never observe each other's labels.

use log::warn;

use crate::errors::errors::{Warning, WarningImpl};

#[derive(Debug, Default)]
pub struct Session {
    label_counter: usize,
    warnings: Vec<Warning>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Returns a fresh jump label. Never reused within the session.
    pub fn next_label(&mut self) -> String {
        let label = format!("l{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    /// Returns the code label of a user function: its name plus the counter.
    pub fn function_label(&mut self, name: &str) -> String {
        let label = format!("{}_{}", name, self.label_counter);
        self.label_counter += 1;
        label
    }

    pub fn warn(&mut self, warning_impl: WarningImpl, line: u32) {
        let warning = Warning::new(warning_impl, line);
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::errors::errors::WarningImpl;

    #[test]
    fn test_labels_are_unique() {
        let mut session = Session::new();
        let first = session.next_label();
        let second = session.function_label("main");
        let third = session.next_label();

        assert_eq!(first, "l0");
        assert_eq!(second, "main_1");
        assert_eq!(third, "l2");
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = Session::new();
        let mut b = Session::new();
        a.next_label();
        a.next_label();

        assert_eq!(b.next_label(), "l0");
    }

    #[test]
    fn test_warnings_are_collected() {
        let mut session = Session::new();
        session.warn(
            WarningImpl::UnmappedType {
                ty: "void".to_string(),
            },
            3,
        );

        assert_eq!(session.warnings().len(), 1);
        assert_eq!(session.take_warnings()[0].get_line(), 3);
        assert!(session.warnings().is_empty());
    }
}
