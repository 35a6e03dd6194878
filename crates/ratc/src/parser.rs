use std::io::{Read, Write};

use crate::config::ParseOptions;
use crate::error::{Error, Expected, RatResult};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind, SECTION_DELIMITER};

const STATEMENT_KEYWORDS: [&str; 5] = ["if", "return", "print", "scan", "while"];

const RELOPS: [&str; 6] = ["==", "!=", ">", "<", "<=", "=>"];

/// Recognizes one Rat25S program read from `reader`, writing the token echo and
/// derivation trace selected by `options` to `out`.
pub fn parse<R: Read>(reader: R, options: ParseOptions, out: &mut dyn Write) -> RatResult<()> {
    Parser::new(reader, options, out).parse_program()
}

/// Predictive LL(1) recognizer. Holds exactly one lookahead token and stops at
/// the first token that does not fit the active production.
pub struct Parser<'out, R> {
    lexer: Lexer<R>,
    current: Token,
    options: ParseOptions,
    out: &'out mut dyn Write,
}

impl<'out, R: Read> Parser<'out, R> {
    pub fn new(reader: R, options: ParseOptions, out: &'out mut dyn Write) -> Self {
        Self {
            lexer: Lexer::new(reader),
            current: Token::end_of_input(),
            options,
            out,
        }
    }

    // R1. <Rat25S> ::= $$ <Opt Function Definitions> $$ <Opt Declaration List> $$ <Statement List> $$
    pub fn parse_program(mut self) -> RatResult<()> {
        tracing::debug!(options = ?self.options, "parsing program");
        self.current = self.lexer.next_token()?;

        self.expect_separator(SECTION_DELIMITER)?;
        self.opt_function_definitions()?;
        self.expect_separator(SECTION_DELIMITER)?;
        self.opt_declaration_list()?;
        self.expect_separator(SECTION_DELIMITER)?;
        self.statement_list()?;
        self.expect_separator(SECTION_DELIMITER)?;

        if self.current.kind != TokenKind::EndOfInput {
            return Err(self.error(Expected::kind(TokenKind::EndOfInput)));
        }
        self.reduce(
            "<Rat25S> ::= $$ <Opt Function Definitions> $$ <Opt Declaration List> $$ <Statement List> $$",
        )?;

        self.out.flush()?;
        tracing::debug!(lines = self.lexer.line(), "program accepted");
        Ok(())
    }

    // R2. <Opt Function Definitions> ::= <Function Definitions> | <Empty>
    fn opt_function_definitions(&mut self) -> RatResult<()> {
        if self.current.is_keyword("function") {
            self.function_definitions()?;
            self.reduce("<Opt Function Definitions> ::= <Function Definitions>")
        } else {
            self.empty()?;
            self.reduce("<Opt Function Definitions> ::= <Empty>")
        }
    }

    // R3. <Function Definitions> ::= <Function> | <Function> <Function Definitions>
    fn function_definitions(&mut self) -> RatResult<()> {
        self.function()?;
        if self.current.is_keyword("function") {
            self.function_definitions()?;
            self.reduce("<Function Definitions> ::= <Function> <Function Definitions>")
        } else {
            self.reduce("<Function Definitions> ::= <Function>")
        }
    }

    // R4. <Function> ::= function <Identifier> ( <Opt Parameter List> ) <Opt Declaration List> <Body>
    fn function(&mut self) -> RatResult<()> {
        self.expect_keyword("function")?;
        self.expect(TokenKind::Identifier)?;
        self.expect_separator("(")?;
        self.opt_parameter_list()?;
        self.expect_separator(")")?;
        self.opt_declaration_list()?;
        self.body()?;
        self.reduce(
            "<Function> ::= function <Identifier> ( <Opt Parameter List> ) <Opt Declaration List> <Body>",
        )
    }

    // R5. <Opt Parameter List> ::= <Parameter List> | <Empty>
    fn opt_parameter_list(&mut self) -> RatResult<()> {
        if self.current.kind == TokenKind::Identifier {
            self.parameter_list()?;
            self.reduce("<Opt Parameter List> ::= <Parameter List>")
        } else {
            self.empty()?;
            self.reduce("<Opt Parameter List> ::= <Empty>")
        }
    }

    // R6. <Parameter List> ::= <Parameter> | <Parameter> , <Parameter List>
    fn parameter_list(&mut self) -> RatResult<()> {
        self.parameter()?;
        if self.current.is_separator(",") {
            self.advance()?;
            self.parameter_list()?;
            self.reduce("<Parameter List> ::= <Parameter> , <Parameter List>")
        } else {
            self.reduce("<Parameter List> ::= <Parameter>")
        }
    }

    // R7. <Parameter> ::= <IDs> <Qualifier>
    fn parameter(&mut self) -> RatResult<()> {
        self.ids()?;
        self.qualifier()?;
        self.reduce("<Parameter> ::= <IDs> <Qualifier>")
    }

    // R8. <Qualifier> ::= integer | boolean | real
    fn qualifier(&mut self) -> RatResult<()> {
        if !self.current.is_qualifier() {
            return Err(self.error(Expected::Category("qualifier (integer, boolean, or real)")));
        }
        let qualifier = self.advance()?;
        self.reduce(&format!("<Qualifier> ::= {}", qualifier.lexeme))
    }

    // R9. <Body> ::= { <Statement List> }
    fn body(&mut self) -> RatResult<()> {
        self.expect_separator("{")?;
        self.statement_list()?;
        self.expect_separator("}")?;
        self.reduce("<Body> ::= { <Statement List> }")
    }

    // R10. <Opt Declaration List> ::= <Declaration List> | <Empty>
    fn opt_declaration_list(&mut self) -> RatResult<()> {
        if self.current.is_qualifier() {
            self.declaration_list()?;
            self.reduce("<Opt Declaration List> ::= <Declaration List>")
        } else {
            self.empty()?;
            self.reduce("<Opt Declaration List> ::= <Empty>")
        }
    }

    // R11. <Declaration List> ::= <Declaration> ; | <Declaration> ; <Declaration List>
    fn declaration_list(&mut self) -> RatResult<()> {
        self.declaration()?;
        self.expect_separator(";")?;
        if self.current.is_qualifier() {
            self.declaration_list()?;
            self.reduce("<Declaration List> ::= <Declaration> ; <Declaration List>")
        } else {
            self.reduce("<Declaration List> ::= <Declaration> ;")
        }
    }

    // R12. <Declaration> ::= <Qualifier> <IDs>
    fn declaration(&mut self) -> RatResult<()> {
        self.qualifier()?;
        self.ids()?;
        self.reduce("<Declaration> ::= <Qualifier> <IDs>")
    }

    // R13. <IDs> ::= <Identifier> | <Identifier> , <IDs>
    fn ids(&mut self) -> RatResult<()> {
        self.expect(TokenKind::Identifier)?;
        if self.current.is_separator(",") {
            self.advance()?;
            self.ids()?;
            self.reduce("<IDs> ::= <Identifier> , <IDs>")
        } else {
            self.reduce("<IDs> ::= <Identifier>")
        }
    }

    // R14. <Statement List> ::= <Statement> | <Statement> <Statement List>
    //
    // The list continues only while the lookahead can start a statement; any
    // other token is left for the enclosing `}` or `$$`.
    fn statement_list(&mut self) -> RatResult<()> {
        self.statement()?;
        if self.at_statement_start() {
            self.statement_list()?;
            self.reduce("<Statement List> ::= <Statement> <Statement List>")
        } else {
            self.reduce("<Statement List> ::= <Statement>")
        }
    }

    // R15. <Statement> ::= <Compound> | <Assign> | <If> | <Return> | <Print> | <Scan> | <While>
    fn statement(&mut self) -> RatResult<()> {
        match self.current.kind {
            TokenKind::Separator if self.current.lexeme == "{" => {
                self.compound()?;
                self.reduce("<Statement> ::= <Compound>")
            }
            TokenKind::Identifier => {
                self.assign()?;
                self.reduce("<Statement> ::= <Assign>")
            }
            TokenKind::Keyword => match self.current.lexeme.as_str() {
                "if" => {
                    self.if_statement()?;
                    self.reduce("<Statement> ::= <If>")
                }
                "return" => {
                    self.return_statement()?;
                    self.reduce("<Statement> ::= <Return>")
                }
                "print" => {
                    self.print()?;
                    self.reduce("<Statement> ::= <Print>")
                }
                "scan" => {
                    self.scan()?;
                    self.reduce("<Statement> ::= <Scan>")
                }
                "while" => {
                    self.while_statement()?;
                    self.reduce("<Statement> ::= <While>")
                }
                _ => Err(self.error(Expected::Category(
                    "statement keyword (if, return, print, scan, while)",
                ))),
            },
            TokenKind::Separator
            | TokenKind::Integer
            | TokenKind::Real
            | TokenKind::Operator
            | TokenKind::Invalid
            | TokenKind::EndOfInput => Err(self.error(Expected::Category("statement"))),
        }
    }

    // R16. <Compound> ::= { <Statement List> }
    fn compound(&mut self) -> RatResult<()> {
        self.expect_separator("{")?;
        self.statement_list()?;
        self.expect_separator("}")?;
        self.reduce("<Compound> ::= { <Statement List> }")
    }

    // R17. <Assign> ::= <Identifier> = <Expression> ;
    fn assign(&mut self) -> RatResult<()> {
        self.expect(TokenKind::Identifier)?;
        self.expect_operator("=")?;
        self.expression()?;
        self.expect_separator(";")?;
        self.reduce("<Assign> ::= <Identifier> = <Expression> ;")
    }

    // R18. <If> ::= if ( <Condition> ) <Statement> endif
    //            | if ( <Condition> ) <Statement> else <Statement> endif
    fn if_statement(&mut self) -> RatResult<()> {
        self.expect_keyword("if")?;
        self.expect_separator("(")?;
        self.condition()?;
        self.expect_separator(")")?;
        self.statement()?;

        if self.current.is_keyword("else") {
            self.advance()?;
            self.statement()?;
            self.expect_keyword("endif")?;
            self.reduce("<If> ::= if ( <Condition> ) <Statement> else <Statement> endif")
        } else {
            self.expect_keyword("endif")?;
            self.reduce("<If> ::= if ( <Condition> ) <Statement> endif")
        }
    }

    // R19. <Return> ::= return ; | return <Expression> ;
    fn return_statement(&mut self) -> RatResult<()> {
        self.expect_keyword("return")?;
        if self.current.is_separator(";") {
            self.advance()?;
            self.reduce("<Return> ::= return ;")
        } else {
            self.expression()?;
            self.expect_separator(";")?;
            self.reduce("<Return> ::= return <Expression> ;")
        }
    }

    // R20. <Print> ::= print ( <Expression> ) ;
    fn print(&mut self) -> RatResult<()> {
        self.expect_keyword("print")?;
        self.expect_separator("(")?;
        self.expression()?;
        self.expect_separator(")")?;
        self.expect_separator(";")?;
        self.reduce("<Print> ::= print ( <Expression> ) ;")
    }

    // R21. <Scan> ::= scan ( <IDs> ) ;
    fn scan(&mut self) -> RatResult<()> {
        self.expect_keyword("scan")?;
        self.expect_separator("(")?;
        self.ids()?;
        self.expect_separator(")")?;
        self.expect_separator(";")?;
        self.reduce("<Scan> ::= scan ( <IDs> ) ;")
    }

    // R22. <While> ::= while ( <Condition> ) <Statement> endwhile
    fn while_statement(&mut self) -> RatResult<()> {
        self.expect_keyword("while")?;
        self.expect_separator("(")?;
        self.condition()?;
        self.expect_separator(")")?;
        self.statement()?;
        self.expect_keyword("endwhile")?;
        self.reduce("<While> ::= while ( <Condition> ) <Statement> endwhile")
    }

    // R23. <Condition> ::= <Expression> <Relop> <Expression>
    fn condition(&mut self) -> RatResult<()> {
        self.expression()?;
        self.relop()?;
        self.expression()?;
        self.reduce("<Condition> ::= <Expression> <Relop> <Expression>")
    }

    // R24. <Relop> ::= == | != | > | < | <= | =>
    fn relop(&mut self) -> RatResult<()> {
        let is_relop = self.current.kind == TokenKind::Operator
            && RELOPS.contains(&self.current.lexeme.as_str());
        if !is_relop {
            return Err(self.error(Expected::Category(
                "relational operator (==, !=, >, <, <=, =>)",
            )));
        }
        let relop = self.advance()?;
        self.reduce(&format!("<Relop> ::= {}", relop.lexeme))
    }

    // R25. <Expression> ::= <Term> <Expression'>
    fn expression(&mut self) -> RatResult<()> {
        self.term()?;
        self.expression_prime()?;
        self.reduce("<Expression> ::= <Term> <Expression'>")
    }

    // <Expression'> ::= + <Term> <Expression'> | - <Term> <Expression'> | ε
    fn expression_prime(&mut self) -> RatResult<()> {
        if self.current.is_operator("+") || self.current.is_operator("-") {
            let operator = self.advance()?;
            self.term()?;
            self.expression_prime()?;
            self.reduce(&format!(
                "<Expression'> ::= {} <Term> <Expression'>",
                operator.lexeme
            ))
        } else {
            self.reduce("<Expression'> ::= ε")
        }
    }

    // R26. <Term> ::= <Factor> <Term'>
    fn term(&mut self) -> RatResult<()> {
        self.factor()?;
        self.term_prime()?;
        self.reduce("<Term> ::= <Factor> <Term'>")
    }

    // <Term'> ::= * <Factor> <Term'> | / <Factor> <Term'> | ε
    fn term_prime(&mut self) -> RatResult<()> {
        if self.current.is_operator("*") || self.current.is_operator("/") {
            let operator = self.advance()?;
            self.factor()?;
            self.term_prime()?;
            self.reduce(&format!("<Term'> ::= {} <Factor> <Term'>", operator.lexeme))
        } else {
            self.reduce("<Term'> ::= ε")
        }
    }

    // R27. <Factor> ::= - <Primary> | <Primary>
    fn factor(&mut self) -> RatResult<()> {
        if self.current.is_operator("-") {
            self.advance()?;
            self.primary()?;
            self.reduce("<Factor> ::= - <Primary>")
        } else {
            self.primary()?;
            self.reduce("<Factor> ::= <Primary>")
        }
    }

    // R28. <Primary> ::= <Identifier> | <Integer> | <Identifier> ( <IDs> )
    //                  | ( <Expression> ) | <Real> | true | false
    fn primary(&mut self) -> RatResult<()> {
        match self.current.kind {
            TokenKind::Identifier if is_boolean_literal(&self.current.lexeme) => {
                let literal = self.advance()?;
                self.reduce(&format!("<Primary> ::= {}", literal.lexeme))
            }
            TokenKind::Identifier => {
                self.advance()?;
                if self.current.is_separator("(") {
                    self.advance()?;
                    self.ids()?;
                    self.expect_separator(")")?;
                    self.reduce("<Primary> ::= <Identifier> ( <IDs> )")
                } else {
                    self.reduce("<Primary> ::= <Identifier>")
                }
            }
            TokenKind::Integer => {
                self.advance()?;
                self.reduce("<Primary> ::= <Integer>")
            }
            TokenKind::Real => {
                self.advance()?;
                self.reduce("<Primary> ::= <Real>")
            }
            TokenKind::Separator if self.current.lexeme == "(" => {
                self.advance()?;
                self.expression()?;
                self.expect_separator(")")?;
                self.reduce("<Primary> ::= ( <Expression> )")
            }
            TokenKind::Separator
            | TokenKind::Keyword
            | TokenKind::Operator
            | TokenKind::Invalid
            | TokenKind::EndOfInput => Err(self.error(Expected::Category("primary expression"))),
        }
    }

    // R29. <Empty> ::= ε
    fn empty(&mut self) -> RatResult<()> {
        self.reduce("<Empty> ::= ε")
    }

    fn at_statement_start(&self) -> bool {
        match self.current.kind {
            TokenKind::Identifier => true,
            TokenKind::Separator => self.current.lexeme == "{",
            TokenKind::Keyword => STATEMENT_KEYWORDS.contains(&self.current.lexeme.as_str()),
            TokenKind::Integer
            | TokenKind::Real
            | TokenKind::Operator
            | TokenKind::Invalid
            | TokenKind::EndOfInput => false,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> RatResult<()> {
        if self.current.kind != kind {
            return Err(self.error(Expected::kind(kind)));
        }
        self.advance()?;
        Ok(())
    }

    fn expect_exact(&mut self, kind: TokenKind, lexeme: &str) -> RatResult<()> {
        if !self.current.is(kind, lexeme) {
            return Err(self.error(Expected::exact(kind, lexeme)));
        }
        self.advance()?;
        Ok(())
    }

    fn expect_separator(&mut self, separator: &str) -> RatResult<()> {
        self.expect_exact(TokenKind::Separator, separator)
    }

    fn expect_keyword(&mut self, keyword: &str) -> RatResult<()> {
        self.expect_exact(TokenKind::Keyword, keyword)
    }

    fn expect_operator(&mut self, operator: &str) -> RatResult<()> {
        self.expect_exact(TokenKind::Operator, operator)
    }

    /// Consumes the current token, echoing it when enabled, and pulls the next one.
    fn advance(&mut self) -> RatResult<Token> {
        if self.options.echo_tokens {
            writeln!(self.out, "{}", self.current.table_row())?;
        }
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn reduce(&mut self, rule: &str) -> RatResult<()> {
        tracing::debug!(line = self.lexer.line(), rule, "reduced");
        if self.options.trace_rules {
            writeln!(self.out, "{rule}")?;
        }
        Ok(())
    }

    fn error(&self, expected: Expected) -> Error {
        let error = Error::unexpected(self.lexer.line(), expected, self.current.clone());
        tracing::debug!(%error, "parse failed");
        error
    }
}

fn is_boolean_literal(lexeme: &str) -> bool {
    matches!(lexeme, "true" | "false")
}
