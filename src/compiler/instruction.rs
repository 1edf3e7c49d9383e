//! P-machine instructions as emitted by the code generator.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// A jump target, printed as `name:`.
    Label(String),
    Op {
        mnemonic: String,
        operands: Vec<String>,
    },
}

impl Instruction {
    pub fn label(name: &str) -> Self {
        Instruction::Label(name.to_string())
    }

    /// Parses one line of instruction text such as `lod i 0 5` or `l3:`.
    ///
    /// Operands are split on whitespace, so quoted character operands must
    /// not contain spaces.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Some(name) = line.strip_suffix(':') {
            return Some(Instruction::label(name));
        }

        let mut parts = line.split_whitespace();
        let mnemonic = parts.next()?.to_string();
        Some(Instruction::Op {
            mnemonic,
            operands: parts.map(String::from).collect(),
        })
    }

    pub fn mnemonic(&self) -> Option<&str> {
        match self {
            Instruction::Label(_) => None,
            Instruction::Op { mnemonic, .. } => Some(mnemonic),
        }
    }

    pub fn operands(&self) -> &[String] {
        match self {
            Instruction::Label(_) => &[],
            Instruction::Op { operands, .. } => operands,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Instruction::Label(_))
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Label(name) => write!(f, "{}:", name),
            Instruction::Op { mnemonic, operands } if operands.is_empty() => write!(f, "{}", mnemonic),
            Instruction::Op { mnemonic, operands } => write!(f, "{} {}", mnemonic, operands.join(" ")),
        }
    }
}

/// Renders a program one instruction per line.
pub fn render(instructions: &[Instruction]) -> String {
    let mut text = String::new();
    for instruction in instructions.iter() {
        text.push_str(&instruction.to_string());
        text.push('\n');
    }
    text
}
