//! Type specifier parsing.
//!
//! - Base types: `int`, `char`, `void`
//! - `const` before or after a base type, and after each `*`
//! - Pointer chains
//!
//! Array suffixes belong to declarators and are parsed with them. Like
//! expressions, type specifiers use NUD/LED handlers with binding powers.

use std::collections::HashMap;

use crate::{ast::ast::TypeNodeKind, errors::errors::Error, lexer::tokens::TokenKind};

use super::{lookups::BindingPower, parser::Parser};

pub type TypeNUDHandler = fn(&mut Parser) -> Result<(), Error>;
pub type TypeLEDHandler = fn(&mut Parser, BindingPower) -> Result<(), Error>;

pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;

pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Int, parse_base_type);
    parser.type_nud(TokenKind::Char, parse_base_type);
    parser.type_nud(TokenKind::Void, parse_base_type);
    parser.type_nud(TokenKind::Const, parse_const_base_type);
    parser.type_led(TokenKind::Star, BindingPower::Postfix, parse_pointer_type);
    parser.type_led(TokenKind::Const, BindingPower::Postfix, parse_const_qualifier);
}

fn base_kind(parser: &Parser) -> Result<TypeNodeKind, Error> {
    match parser.current_token_kind() {
        TokenKind::Int => Ok(TypeNodeKind::Int),
        TokenKind::Char => Ok(TypeNodeKind::Char),
        TokenKind::Void => Ok(TypeNodeKind::Void),
        _ => Err(parser.unexpected("expected a type")),
    }
}

pub fn parse_base_type(parser: &mut Parser) -> Result<(), Error> {
    let kind = base_kind(parser)?;
    let line = parser.advance().line();
    parser.builder.handle_type(kind, line);
    Ok(())
}

/// `const int`
pub fn parse_const_base_type(parser: &mut Parser) -> Result<(), Error> {
    let line = parser.expect(TokenKind::Const)?.line();
    parse_base_type(parser)?;
    parser.builder.handle_const(line)
}

pub fn parse_pointer_type(parser: &mut Parser, _bp: BindingPower) -> Result<(), Error> {
    let line = parser.expect(TokenKind::Star)?.line();
    parser.builder.handle_pointer_type(line)
}

/// `int const`, `int * const`
pub fn parse_const_qualifier(parser: &mut Parser, _bp: BindingPower) -> Result<(), Error> {
    let line = parser.expect(TokenKind::Const)?.line();
    parser.builder.handle_const(line)
}

/// Parses a full type specifier, leaving one type node on the stack.
pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<(), Error> {
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_type_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected("expected a type"));
    };
    nud(parser)?;

    parse_type_suffix(parser, bp)
}

/// Applies `*` and `const` suffixes to the type on top of the stack.
pub fn parse_type_suffix(parser: &mut Parser, bp: BindingPower) -> Result<(), Error> {
    while *parser
        .get_type_bp_lookup()
        .get(&parser.current_token_kind())
        .unwrap_or(&BindingPower::Default)
        > bp
    {
        let token_kind = parser.current_token_kind();
        let Some(led) = parser.get_type_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected("expected a type"));
        };
        led(parser, bp)?;
    }

    Ok(())
}
