//! Builtin runtime library.
//!
//! Every builtin is a hand-written P-machine routine that is declared in the
//! file scope of each program and spliced into the output only when used.
//! Routines refer to their internal jump targets through `@n` placeholders,
//! which are replaced by fresh session labels when the routine is spliced.
//!
//! `printf` and `scanf` are variadic. Their callers push the argument count
//! into slot 5 ahead of the format string; the routines then reuse slot 5 as
//! a cursor over the variadic arguments and slot 0 as the "after `%`" flag.

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;
use regex::{Captures, Regex};

use crate::{ast::types::Type, session::Session};

use super::instruction::Instruction;

pub struct Builtin {
    pub name: &'static str,
    pub return_type: Type,
    pub params: Vec<Type>,
    pub variadic: bool,
    /// Builtins this routine calls.
    pub dependencies: &'static [&'static str],
    pub code: &'static str,
}

fn char_pointer() -> Type {
    Type::pointer_to(Type::char())
}

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"@(\d+)").unwrap();

    pub static ref BUILTINS: Vec<Builtin> = vec![
        Builtin {
            name: "print",
            return_type: Type::void(),
            params: vec![char_pointer()],
            variadic: false,
            dependencies: &[],
            code: PRINT,
        },
        Builtin {
            name: "printf",
            return_type: Type::void(),
            params: vec![char_pointer()],
            variadic: true,
            dependencies: &["print"],
            code: PRINTF,
        },
        Builtin {
            name: "readstr",
            return_type: Type::void(),
            params: vec![char_pointer(), Type::int()],
            variadic: false,
            dependencies: &[],
            code: READSTR,
        },
        Builtin {
            name: "scanf",
            return_type: Type::void(),
            params: vec![char_pointer()],
            variadic: true,
            dependencies: &["isdigit", "parseint", "readstr"],
            code: SCANF,
        },
        Builtin {
            name: "isdigit",
            return_type: Type::int(),
            params: vec![Type::char()],
            variadic: false,
            dependencies: &[],
            code: ISDIGIT,
        },
        Builtin {
            name: "chartoint",
            return_type: Type::int(),
            params: vec![Type::char()],
            variadic: false,
            dependencies: &[],
            code: CHARTOINT,
        },
        Builtin {
            name: "pow",
            return_type: Type::int(),
            params: vec![Type::int(), Type::int()],
            variadic: false,
            dependencies: &[],
            code: POW,
        },
        Builtin {
            name: "parseint",
            return_type: Type::int(),
            params: vec![Type::pointer_to(char_pointer())],
            variadic: false,
            dependencies: &["isdigit", "chartoint", "pow"],
            code: PARSEINT,
        },
        Builtin {
            name: "mod",
            return_type: Type::int(),
            params: vec![Type::int(), Type::int()],
            variadic: false,
            dependencies: &[],
            code: MOD,
        },
        Builtin {
            name: "strlen",
            return_type: Type::int(),
            params: vec![char_pointer()],
            variadic: false,
            dependencies: &[],
            code: STRLEN,
        },
        Builtin {
            name: "strcmp",
            return_type: Type::int(),
            params: vec![char_pointer(), char_pointer()],
            variadic: false,
            dependencies: &[],
            code: STRCMP,
        },
        Builtin {
            name: "strrev",
            return_type: Type::void(),
            params: vec![char_pointer()],
            variadic: false,
            dependencies: &[],
            code: STRREV,
        },
        Builtin {
            name: "itoa",
            return_type: Type::void(),
            params: vec![Type::int(), char_pointer()],
            variadic: false,
            dependencies: &["strrev"],
            code: ITOA,
        },
        Builtin {
            name: "atoi",
            return_type: Type::int(),
            params: vec![char_pointer()],
            variadic: false,
            dependencies: &["isdigit"],
            code: ATOI,
        },
    ];
}

pub fn find_builtin(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

/// Expands `used` with the builtins it depends on, transitively.
///
/// Each dependency directly follows the first builtin needing it, and every
/// builtin appears once.
pub fn with_dependencies(used: &[String]) -> Vec<&'static Builtin> {
    let mut result: Vec<&'static Builtin> = vec![];
    let mut pending: Vec<&str> = used.iter().map(String::as_str).collect();
    pending.reverse();

    while let Some(name) = pending.pop() {
        if result.iter().any(|builtin| builtin.name == name) {
            continue;
        }
        let Some(builtin) = find_builtin(name) else {
            continue;
        };
        result.push(builtin);
        pending.extend(builtin.dependencies.iter().rev().copied());
    }

    result
}

/// Instantiates the routine of `builtin` with fresh labels from `session`.
pub fn instantiate(builtin: &Builtin, session: &mut Session) -> Vec<Instruction> {
    let mut labels: HashMap<String, String> = HashMap::new();
    let mut instructions = vec![Instruction::label(builtin.name)];

    for line in builtin.code.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let line = PLACEHOLDER.replace_all(line, |captures: &Captures| {
            labels
                .entry(captures[1].to_string())
                .or_insert_with(|| session.next_label())
                .clone()
        });

        if let Some(instruction) = Instruction::parse(&line) {
            instructions.push(instruction);
        }
    }

    debug!(
        "spliced builtin '{}' ({} instructions)",
        builtin.name,
        instructions.len()
    );
    instructions
}

// print(char* s)
const PRINT: &str = "
    ssp 6
    @0:
    lod a 0 5
    ind c
    ldc c 0
    neq c
    fjp @1
    lod a 0 5
    ind c
    out c
    lod a 0 5
    inc a 1
    str a 0 5
    ujp @0
    @1:
    retp
";

// printf(char* format, ...): %d, %c, %s. Any other character after `%` is
// printed as is, so `%%` prints `%`.
const PRINTF: &str = "
    lda 0 7
    str a 0 5
    ldc b f
    str b 0 0
    @0:
    lod a 0 6
    ind c
    ldc c 0
    neq c
    fjp @1
    lod b 0 0
    fjp @2
    ldc b f
    str b 0 0
    lod a 0 6
    ind c
    ldc c 'd'
    equ c
    fjp @3
    lod a 0 5
    ind i
    out i
    ujp @6
    @3:
    lod a 0 6
    ind c
    ldc c 'c'
    equ c
    fjp @4
    lod a 0 5
    ind c
    out c
    ujp @6
    @4:
    lod a 0 6
    ind c
    ldc c 's'
    equ c
    fjp @5
    mst 1
    lod a 0 5
    ind a
    cup 1 print
    ujp @6
    @5:
    lod a 0 6
    ind c
    out c
    ujp @7
    @6:
    lod a 0 5
    inc a 1
    str a 0 5
    ujp @7
    @2:
    lod a 0 6
    ind c
    ldc c '%'
    equ c
    fjp @8
    ldc b t
    str b 0 0
    ujp @7
    @8:
    lod a 0 6
    ind c
    out c
    @7:
    lod a 0 6
    inc a 1
    str a 0 6
    ujp @0
    @1:
    retp
";

// readstr(char* buffer, int n): reads n characters and terminates them.
const READSTR: &str = "
    ssp 7
    @0:
    lod i 0 6
    conv i b
    fjp @1
    lod a 0 5
    in c
    sto c
    lod a 0 5
    inc a 1
    str a 0 5
    lod i 0 6
    dec i 1
    str i 0 6
    ujp @0
    @1:
    lod a 0 5
    ldc c 0
    sto c
    retp
";

// scanf(char* format, ...): %d, %c and %Ns for a string of N characters.
const SCANF: &str = "
    lda 0 7
    str a 0 5
    ldc b f
    str b 0 0
    @0:
    lod a 0 6
    ind c
    ldc c 0
    neq c
    fjp @1
    lod b 0 0
    fjp @2
    ldc b f
    str b 0 0
    lod a 0 6
    ind c
    ldc c 'd'
    equ c
    fjp @3
    lod a 0 5
    ind a
    in i
    sto i
    ujp @6
    @3:
    lod a 0 6
    ind c
    ldc c 'c'
    equ c
    fjp @4
    lod a 0 5
    ind a
    in c
    sto c
    ujp @6
    @4:
    mst 1
    lod a 0 6
    ind c
    cup 1 isdigit
    conv i b
    fjp @7
    mst 1
    lod a 0 5
    ind a
    mst 1
    lda 0 6
    cup 1 parseint
    cup 2 readstr
    @6:
    lod a 0 5
    inc a 1
    str a 0 5
    ujp @7
    @2:
    lod a 0 6
    ind c
    ldc c '%'
    equ c
    fjp @7
    ldc b t
    str b 0 0
    @7:
    lod a 0 6
    inc a 1
    str a 0 6
    ujp @0
    @1:
    retp
";

// isdigit(char c)
const ISDIGIT: &str = "
    ssp 6
    lod c 0 5
    ldc c '0'
    geq c
    lod c 0 5
    ldc c '9'
    leq c
    and
    fjp @0
    ldc i 1
    str i 0 0
    retf
    @0:
    ldc i 0
    str i 0 0
    retf
";

// chartoint(char c): value of a decimal digit.
const CHARTOINT: &str = "
    ssp 6
    lod c 0 5
    conv c i
    ldc i 48
    sub i
    str i 0 0
    retf
";

// pow(int base, int exponent) for exponent >= 0.
const POW: &str = "
    ssp 9
    ldc i 1
    str i 0 7
    ldc i 0
    str i 0 8
    @0:
    lod i 0 8
    lod i 0 6
    les i
    fjp @1
    lod i 0 7
    lod i 0 5
    mul i
    str i 0 7
    lod i 0 8
    inc i 1
    str i 0 8
    ujp @0
    @1:
    lod i 0 7
    str i 0 0
    retf
";

// parseint(char** s): reads the digits at *s and leaves *s after them.
const PARSEINT: &str = "
    ssp 10
    ldc i 0
    str i 0 6
    ldc i 0
    str i 0 7
    lod a 0 5
    ind a
    str a 0 8
    @0:
    mst 1
    lod a 0 5
    ind a
    ind c
    cup 1 isdigit
    conv i b
    fjp @1
    lod i 0 7
    inc i 1
    str i 0 7
    lod a 0 5
    lod a 0 5
    ind a
    inc a 1
    sto a
    ujp @0
    @1:
    lod a 0 5
    lod a 0 8
    sto a
    lod i 0 7
    str i 0 9
    @2:
    lod i 0 9
    ldc i 0
    grt i
    fjp @3
    lod i 0 6
    mst 1
    lod a 0 5
    ind a
    ind c
    cup 1 chartoint
    mst 1
    ldc i 10
    lod i 0 9
    dec i 1
    cup 2 pow
    mul i
    add i
    str i 0 6
    lod a 0 5
    lod a 0 5
    ind a
    inc a 1
    sto a
    lod i 0 9
    dec i 1
    str i 0 9
    ujp @2
    @3:
    lod i 0 6
    str i 0 0
    retf
";

// mod(int a, int b) = a - (a / b) * b
const MOD: &str = "
    ssp 7
    lod i 0 5
    lod i 0 5
    lod i 0 6
    div i
    lod i 0 6
    mul i
    sub i
    str i 0 0
    retf
";

// strlen(char* s)
const STRLEN: &str = "
    ssp 7
    ldc i 0
    str i 0 6
    @0:
    lod a 0 5
    ind c
    ldc c 0
    neq c
    fjp @1
    lod a 0 5
    inc a 1
    str a 0 5
    lod i 0 6
    inc i 1
    str i 0 6
    ujp @0
    @1:
    lod i 0 6
    str i 0 0
    retf
";

// strcmp(char* a, char* b): 1 when equal, 0 otherwise.
const STRCMP: &str = "
    ssp 7
    @0:
    lod a 0 5
    ind c
    lod a 0 6
    ind c
    equ c
    fjp @1
    lod a 0 5
    ind c
    ldc c 0
    equ c
    fjp @2
    ldc i 1
    str i 0 0
    retf
    @2:
    lod a 0 5
    inc a 1
    str a 0 5
    lod a 0 6
    inc a 1
    str a 0 6
    ujp @0
    @1:
    ldc i 0
    str i 0 0
    retf
";

// strrev(char* s): reverses in place.
const STRREV: &str = "
    ssp 8
    lod a 0 5
    str a 0 6
    @0:
    lod a 0 6
    ind c
    ldc c 0
    neq c
    fjp @1
    lod a 0 6
    inc a 1
    str a 0 6
    ujp @0
    @1:
    lod a 0 6
    dec a 1
    str a 0 6
    @2:
    lod a 0 5
    lod a 0 6
    les a
    fjp @3
    lod a 0 5
    ind c
    str c 0 7
    lod a 0 5
    lod a 0 6
    ind c
    sto c
    lod a 0 6
    lod c 0 7
    sto c
    lod a 0 5
    inc a 1
    str a 0 5
    lod a 0 6
    dec a 1
    str a 0 6
    ujp @2
    @3:
    retp
";

// itoa(int n, char* buffer): decimal digits, least significant first, then
// reversed in place.
const ITOA: &str = "
    ssp 9
    lod a 0 6
    str a 0 7
    ldc i 0
    str i 0 8
    lod i 0 5
    ldc i 0
    les i
    fjp @0
    ldc i 1
    str i 0 8
    lod i 0 5
    neg i
    str i 0 5
    @0:
    lod a 0 7
    lod i 0 5
    lod i 0 5
    ldc i 10
    div i
    ldc i 10
    mul i
    sub i
    ldc i 48
    add i
    conv i c
    sto c
    lod a 0 7
    inc a 1
    str a 0 7
    lod i 0 5
    ldc i 10
    div i
    str i 0 5
    lod i 0 5
    ldc i 0
    grt i
    fjp @1
    ujp @0
    @1:
    lod i 0 8
    conv i b
    fjp @2
    lod a 0 7
    ldc c '-'
    sto c
    lod a 0 7
    inc a 1
    str a 0 7
    @2:
    lod a 0 7
    ldc c 0
    sto c
    mst 1
    lod a 0 6
    cup 1 strrev
    retp
";

// atoi(char* s): optional '-' followed by decimal digits.
const ATOI: &str = "
    ssp 8
    ldc i 0
    str i 0 6
    ldc i 1
    str i 0 7
    lod a 0 5
    ind c
    ldc c '-'
    equ c
    fjp @0
    ldc i -1
    str i 0 7
    lod a 0 5
    inc a 1
    str a 0 5
    @0:
    mst 1
    lod a 0 5
    ind c
    cup 1 isdigit
    conv i b
    fjp @1
    lod i 0 6
    ldc i 10
    mul i
    lod a 0 5
    ind c
    conv c i
    ldc i 48
    sub i
    add i
    str i 0 6
    lod a 0 5
    inc a 1
    str a 0 5
    ujp @0
    @1:
    lod i 0 6
    lod i 0 7
    mul i
    str i 0 0
    retf
";
