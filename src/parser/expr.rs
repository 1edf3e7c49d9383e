use crate::{
    ast::operators::{BinaryOp, UnaryOp},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser, types::parse_type};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<(), Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.line(),
        ));
    };
    nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected("expected an operator"));
        };
        led(parser, next_bp)?;
    }

    Ok(())
}

fn parse_int(parser: &Parser, value: &str) -> Result<i64, Error> {
    value.parse().map_err(|_| {
        Error::new(
            ErrorImpl::NumberParseError {
                token: value.to_string(),
            },
            parser.line(),
        )
    })
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<(), Error> {
    let token = parser.advance();
    let line = token.line();

    match token.kind {
        TokenKind::Number => {
            let value = parse_int(parser, &token.value)?;
            parser.builder.handle_int(value, line);
        }
        TokenKind::CharLiteral => {
            let value = token.value.chars().next().unwrap_or('\0');
            parser.builder.handle_char(value, line);
        }
        TokenKind::String => parser.builder.handle_string(token.value, line),
        TokenKind::Identifier if parser.current_token_kind() == TokenKind::OpenParen => {
            let argc = parse_arguments(parser)?;
            parser.builder.handle_call(token.value, argc, line)?;
        }
        TokenKind::Identifier => parser.builder.handle_identifier(token.value, line),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                line,
            ))
        }
    }

    Ok(())
}

/// Parses `( a, b, ... )` and returns the argument count.
fn parse_arguments(parser: &mut Parser) -> Result<usize, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut argc = 0;
    while parser.current_token_kind() != TokenKind::CloseParen {
        if argc > 0 {
            parser.expect(TokenKind::Comma)?;
        }
        parse_expr(parser, BindingPower::Comma)?;
        argc += 1;
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(argc)
}

pub fn parse_binary_expr(parser: &mut Parser, bp: BindingPower) -> Result<(), Error> {
    let operator_token = parser.advance();
    let op = BinaryOp::from_symbol(&operator_token.value)
        .ok_or_else(|| Error::new(ErrorImpl::UnexpectedToken { token: operator_token.value.clone() }, operator_token.line()))?;

    parse_expr(parser, bp)?;

    parser.builder.handle_binary_operator(op, operator_token.line())
}

/// Right associative: `a = b = c` assigns `c` to both.
pub fn parse_assignment_expr(parser: &mut Parser, _bp: BindingPower) -> Result<(), Error> {
    let operator_token = parser.advance();
    parse_expr(parser, BindingPower::Comma)?;

    parser
        .builder
        .handle_binary_operator(BinaryOp::Assign, operator_token.line())
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<(), Error> {
    let operator_token = parser.advance();
    let line = operator_token.line();

    // Fold negative literals so constant indices stay visible to the resolver.
    if operator_token.kind == TokenKind::Dash && parser.current_token_kind() == TokenKind::Number {
        let token = parser.advance();
        let value = parse_int(parser, &format!("-{}", token.value))?;
        parser.builder.handle_int(value, line);
        return Ok(());
    }

    let op = match operator_token.kind {
        TokenKind::Dash => UnaryOp::Negate,
        TokenKind::Not => UnaryOp::Not,
        TokenKind::Star => UnaryOp::Deref,
        TokenKind::Ampersand => UnaryOp::AddressOf,
        TokenKind::PlusPlus => UnaryOp::PreIncrement,
        TokenKind::MinusMinus => UnaryOp::PreDecrement,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                line,
            ))
        }
    };

    parse_expr(parser, BindingPower::Unary)?;
    parser.builder.handle_unary_operator(op, line)
}

pub fn parse_postfix_expr(parser: &mut Parser, _bp: BindingPower) -> Result<(), Error> {
    let operator_token = parser.advance();
    let op = if operator_token.kind == TokenKind::PlusPlus {
        UnaryOp::PostIncrement
    } else {
        UnaryOp::PostDecrement
    };

    parser.builder.handle_unary_operator(op, operator_token.line())
}

pub fn parse_subscript_expr(parser: &mut Parser, _bp: BindingPower) -> Result<(), Error> {
    let line = parser.expect(TokenKind::OpenBracket)?.line();
    parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    parser.builder.handle_subscript(line)
}

/// Either a parenthesised expression or a cast `(T) e`.
pub fn parse_grouping_expr(parser: &mut Parser) -> Result<(), Error> {
    let line = parser.expect(TokenKind::OpenParen)?.line();

    if parser.current_token_kind().starts_type() {
        parse_type(parser, BindingPower::Default)?;
        parser.expect(TokenKind::CloseParen)?;
        parse_expr(parser, BindingPower::Unary)?;
        return parser.builder.handle_cast(line);
    }

    parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;
    Ok(())
}
