use crate::{
    ast::ast::TypeNodeKind,
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{
    parser::Parser,
    types::{parse_type, parse_type_suffix},
};

/// Parses one statement and returns the number of nodes it produced.
///
/// Only declarations with several declarators produce more than one.
pub fn parse_stmt(parser: &mut Parser) -> Result<usize, Error> {
    if let Some(handler) = parser.get_stmt_lookup().get(&parser.current_token_kind()).copied() {
        return handler(parser);
    }

    let line = parser.line();
    parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;
    parser.builder.handle_expr_statement(line)?;

    Ok(1)
}

/// Parses a statement that must occupy exactly one child slot.
fn parse_single_stmt(parser: &mut Parser) -> Result<(), Error> {
    let line = parser.line();
    let count = parse_stmt(parser)?;
    if count != 1 {
        parser.builder.handle_block(count, line)?;
    }
    Ok(())
}

pub fn parse_empty_stmt(parser: &mut Parser) -> Result<usize, Error> {
    let line = parser.expect(TokenKind::Semicolon)?.line();
    parser.builder.handle_nothing(line);
    Ok(1)
}

/// `const`? base `const`?
fn parse_specifier(parser: &mut Parser) -> Result<(TypeNodeKind, bool), Error> {
    let mut constant = false;
    if parser.current_token_kind() == TokenKind::Const {
        parser.advance();
        constant = true;
    }

    let kind = match parser.current_token_kind() {
        TokenKind::Int => TypeNodeKind::Int,
        TokenKind::Char => TypeNodeKind::Char,
        TokenKind::Void => TypeNodeKind::Void,
        _ => return Err(parser.unexpected("expected a type")),
    };
    parser.advance();

    if parser.current_token_kind() == TokenKind::Const {
        parser.advance();
        constant = true;
    }

    Ok((kind, constant))
}

/// Variable declarations (possibly several declarators), prototypes and
/// function definitions.
pub fn parse_declaration_stmt(parser: &mut Parser) -> Result<usize, Error> {
    let line = parser.line();
    let (kind, constant) = parse_specifier(parser)?;

    let mut count = 0;
    loop {
        parser.builder.handle_type(kind, line);
        if constant {
            parser.builder.handle_const(line)?;
        }
        parse_type_suffix(parser, BindingPower::Default)?;

        let name_token = parser.expect_error(
            TokenKind::Identifier,
            Some(parser.unexpected("expected identifier in declaration")),
        )?;
        let line = name_token.line();
        let name = name_token.value;

        if count == 0 && parser.current_token_kind() == TokenKind::OpenParen {
            parse_function_rest(parser, name, line)?;
            return Ok(1);
        }

        parse_declarator_rest(parser, name, line)?;
        count += 1;

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parser.expect(TokenKind::Semicolon)?;
    Ok(count)
}

/// Array suffix and initializer of a variable declarator.
fn parse_declarator_rest(parser: &mut Parser, name: String, line: u32) -> Result<(), Error> {
    if parser.current_token_kind() == TokenKind::OpenBracket {
        parser.advance();
        let size = if parser.current_token_kind() == TokenKind::Number {
            let token = parser.advance();
            let size = token
                .value
                .parse::<usize>()
                .map_err(|_| parser.unexpected("array size out of range"))?;
            Some(size)
        } else {
            None
        };
        parser.expect(TokenKind::CloseBracket)?;
        parser.builder.handle_array_type(size, line)?;
    }

    let has_init = parser.current_token_kind() == TokenKind::Assignment;
    if has_init {
        parser.advance();
        if parser.current_token_kind() == TokenKind::OpenCurly {
            parse_initializer_list(parser)?;
        } else {
            parse_expr(parser, BindingPower::Comma)?;
        }
    }

    parser.builder.handle_var_decl(name, has_init, line)
}

fn parse_initializer_list(parser: &mut Parser) -> Result<(), Error> {
    let line = parser.expect(TokenKind::OpenCurly)?.line();

    let mut count = 0;
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if count > 0 {
            parser.expect(TokenKind::Comma)?;
            // Trailing comma
            if parser.current_token_kind() == TokenKind::CloseCurly {
                break;
            }
        }
        parse_expr(parser, BindingPower::Comma)?;
        count += 1;
    }

    parser.expect(TokenKind::CloseCurly)?;
    parser.builder.handle_initializer_list(count, line)
}

/// Parameters and optional body after `type name`.
fn parse_function_rest(parser: &mut Parser, name: String, line: u32) -> Result<(), Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut params = 0;
    if parser.current_token_kind() == TokenKind::Void && parser.peek_kind(1) == TokenKind::CloseParen {
        parser.advance();
    }

    while parser.current_token_kind() != TokenKind::CloseParen {
        if params > 0 {
            parser.expect(TokenKind::Comma)?;
        }

        parse_type(parser, BindingPower::Default)?;
        let param_token = parser.expect_error(
            TokenKind::Identifier,
            Some(parser.unexpected("expected parameter name")),
        )?;
        let param_line = param_token.line();

        // `int a[]` as a parameter is a pointer.
        if parser.current_token_kind() == TokenKind::OpenBracket {
            parser.advance();
            if parser.current_token_kind() == TokenKind::Number {
                parser.advance();
            }
            parser.expect(TokenKind::CloseBracket)?;
            parser.builder.handle_pointer_type(param_line)?;
        }

        parser.builder.handle_formal_parameter(param_token.value, param_line)?;
        params += 1;
    }

    parser.expect(TokenKind::CloseParen)?;
    parser.builder.handle_formal_parameters(params, line)?;

    let has_body = parser.current_token_kind() == TokenKind::OpenCurly;
    if has_body {
        parse_block_stmt(parser)?;
    } else {
        parser.expect(TokenKind::Semicolon)?;
    }

    parser.builder.handle_func_decl(name, has_body, line)
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<usize, Error> {
    let line = parser.expect(TokenKind::OpenCurly)?.line();

    let mut count = 0;
    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseCurly {
        count += parse_stmt(parser)?;
    }

    parser.expect(TokenKind::CloseCurly)?;
    parser.builder.handle_block(count, line)?;

    Ok(1)
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<usize, Error> {
    let line = parser.expect(TokenKind::If)?.line();

    parser.expect(TokenKind::OpenParen)?;
    parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    parse_single_stmt(parser)?;

    let has_else = parser.current_token_kind() == TokenKind::Else;
    if has_else {
        parser.advance();
        parse_single_stmt(parser)?;
    }

    parser.builder.handle_if(has_else, line)?;
    Ok(1)
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<usize, Error> {
    let line = parser.expect(TokenKind::While)?.line();

    parser.expect(TokenKind::OpenParen)?;
    parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    parse_single_stmt(parser)?;

    parser.builder.handle_while(line)?;
    Ok(1)
}

/// `for (init; condition; step) body`, every clause optional.
pub fn parse_for_stmt(parser: &mut Parser) -> Result<usize, Error> {
    let line = parser.expect(TokenKind::For)?.line();
    parser.expect(TokenKind::OpenParen)?;

    // Init
    if parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance();
        parser.builder.handle_nothing(line);
    } else if parser.current_token_kind().starts_type() {
        if parse_declaration_stmt(parser)? != 1 {
            return Err(parser.unexpected("expected a single declaration in for initializer"));
        }
    } else {
        parse_expr(parser, BindingPower::Default)?;
        parser.expect(TokenKind::Semicolon)?;
        parser.builder.handle_expr_statement(line)?;
    }

    // Condition
    if parser.current_token_kind() == TokenKind::Semicolon {
        parser.builder.handle_nothing(line);
    } else {
        parse_expr(parser, BindingPower::Default)?;
    }
    parser.expect(TokenKind::Semicolon)?;

    // Step
    if parser.current_token_kind() == TokenKind::CloseParen {
        parser.builder.handle_nothing(line);
    } else {
        parse_expr(parser, BindingPower::Default)?;
        parser.builder.handle_expr_statement(line)?;
    }
    parser.expect(TokenKind::CloseParen)?;

    parse_single_stmt(parser)?;

    parser.builder.handle_for(line)?;
    Ok(1)
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<usize, Error> {
    let line = parser.expect(TokenKind::Return)?.line();

    let has_value = parser.current_token_kind() != TokenKind::Semicolon;
    if has_value {
        parse_expr(parser, BindingPower::Default)?;
    }
    parser.expect(TokenKind::Semicolon)?;

    parser.builder.handle_return(has_value, line)?;
    Ok(1)
}

/// `break;` and `continue;`
pub fn parse_jump_stmt(parser: &mut Parser) -> Result<usize, Error> {
    let token = parser.advance();
    parser.expect(TokenKind::Semicolon)?;

    if token.kind == TokenKind::Break {
        parser.builder.handle_break(token.line());
    } else {
        parser.builder.handle_continue(token.line());
    }
    Ok(1)
}
