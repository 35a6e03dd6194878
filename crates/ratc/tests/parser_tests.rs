use ratc::{
    check_source, check_source_with_output, parse, Error, Expected, ParseOptions, Token,
    TokenKind,
};

const SAMPLE_PROGRAM: &str = r#"
[* Rat25S sample: temperature table *]
$$
function convert (fahr integer)
{
    return 5 * (fahr - 32) / 9;
}
function flag (a, b boolean, c real)
    integer tmp;
{
    if (a == b) tmp = 1; else { tmp = 0; } endif
    return;
}
$$
    integer low, high, step;
    boolean done;
    real ratio;
$$
    scan (low, high, step);
    done = false;
    ratio = 0.5;
    while (low <= high)
    {
        print (convert(low));
        low = low + step;
        if (low => high) done = true; endif
    }
    endwhile
    if (step != 0) ratio = -ratio * 2.0; endif
$$
"#;

fn expect_syntax_error(source: &str) -> (usize, Expected, Token) {
    match check_source(source) {
        Err(Error::Syntax {
            line,
            expected,
            found,
        }) => (line, expected, found),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

fn traced(source: &str) -> Vec<String> {
    let output = check_source_with_output(source, ParseOptions::default().with_rule_trace(true))
        .expect("program should parse");
    output.lines().map(str::to_string).collect()
}

#[test]
fn accepts_sample_program() {
    check_source(SAMPLE_PROGRAM).expect("sample program should parse");
}

#[test]
fn accepts_declaration_and_assignment() {
    let source = "$$ $$ integer x; $$ x = 5; $$";
    let output = check_source_with_output(source, ParseOptions::default().with_token_echo(true))
        .expect("program should parse");

    let expected: Vec<String> = [
        (TokenKind::Separator, "$$"),
        (TokenKind::Separator, "$$"),
        (TokenKind::Keyword, "integer"),
        (TokenKind::Identifier, "x"),
        (TokenKind::Separator, ";"),
        (TokenKind::Separator, "$$"),
        (TokenKind::Identifier, "x"),
        (TokenKind::Operator, "="),
        (TokenKind::Integer, "5"),
        (TokenKind::Separator, ";"),
        (TokenKind::Separator, "$$"),
    ]
    .into_iter()
    .map(|(kind, lexeme)| Token::new(kind, lexeme).table_row())
    .collect();

    assert_eq!(output.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn default_options_produce_no_output() {
    let output = check_source_with_output("$$ $$ $$ x = 1; $$", ParseOptions::default())
        .expect("program should parse");
    assert!(output.is_empty());
}

#[test]
fn rejects_empty_compound_statement() {
    let (line, expected, found) = expect_syntax_error("$$ $$ $$ { } $$");
    assert_eq!(line, 1);
    assert_eq!(expected, Expected::Category("statement"));
    assert_eq!(found, Token::new(TokenKind::Separator, "}"));
}

#[test]
fn rejects_empty_main_section() {
    let (_, expected, found) = expect_syntax_error("$$ $$ $$ $$");
    assert_eq!(expected, Expected::Category("statement"));
    assert_eq!(found, Token::new(TokenKind::Separator, "$$"));
}

#[test]
fn rejects_empty_function_body() {
    let (_, _, found) = expect_syntax_error("$$ function f () { } $$ $$ x = 1; $$");
    assert_eq!(found, Token::new(TokenKind::Separator, "}"));
}

#[test]
fn accepts_compound_with_one_statement() {
    check_source("$$ $$ $$ { x = 1; } $$").expect("compound should parse");
}

#[test]
fn reports_end_of_input_when_closing_delimiter_is_missing() {
    let (_, expected, found) = expect_syntax_error("$$ $$ $$ x = 1;");
    assert_eq!(expected, Expected::exact(TokenKind::Separator, "$$"));
    assert_eq!(found.kind, TokenKind::EndOfInput);
}

#[test]
fn rejects_tokens_after_final_delimiter() {
    let (_, expected, found) = expect_syntax_error("$$ $$ $$ x = 1; $$ y");
    assert_eq!(expected, Expected::kind(TokenKind::EndOfInput));
    assert_eq!(found, Token::new(TokenKind::Identifier, "y"));
}

#[test]
fn rejects_program_without_opening_delimiter() {
    let (_, expected, found) = expect_syntax_error("x = 1; $$");
    assert_eq!(expected, Expected::exact(TokenKind::Separator, "$$"));
    assert_eq!(found, Token::new(TokenKind::Identifier, "x"));
}

#[test]
fn statement_list_stops_at_non_statement_token() {
    let (_, expected, found) = expect_syntax_error("$$ $$ $$ x = 1; 5 $$");
    assert_eq!(expected, Expected::exact(TokenKind::Separator, "$$"));
    assert_eq!(found, Token::new(TokenKind::Integer, "5"));
}

#[test]
fn rejects_keyword_that_cannot_start_statement() {
    let (_, expected, found) = expect_syntax_error("$$ $$ $$ endif $$");
    assert_eq!(
        expected,
        Expected::Category("statement keyword (if, return, print, scan, while)")
    );
    assert_eq!(found, Token::new(TokenKind::Keyword, "endif"));
}

#[test]
fn reports_invalid_token_as_lexical_error() {
    match check_source("$$ $$ $$ x = @; $$") {
        Err(Error::Lexical {
            line,
            lexeme,
            expected,
        }) => {
            assert_eq!(line, 1);
            assert_eq!(lexeme, "@");
            assert_eq!(expected, Expected::Category("primary expression"));
        }
        other => panic!("expected lexical error, got {other:?}"),
    }
}

#[test]
fn reports_unterminated_real_as_lexical_error() {
    match check_source("$$ $$ $$ x = 12.; $$") {
        Err(Error::Lexical { lexeme, .. }) => assert_eq!(lexeme, "12."),
        other => panic!("expected lexical error, got {other:?}"),
    }
}

#[test]
fn rejects_unknown_qualifier() {
    let (_, expected, found) =
        expect_syntax_error("$$ function f (a string) { return; } $$ $$ x = 1; $$");
    assert_eq!(
        expected,
        Expected::Category("qualifier (integer, boolean, or real)")
    );
    assert_eq!(found, Token::new(TokenKind::Identifier, "string"));
}

#[test]
fn rejects_assignment_operator_as_relop() {
    let (_, expected, found) = expect_syntax_error("$$ $$ $$ while (a = b) x = 1; endwhile $$");
    assert_eq!(
        expected,
        Expected::Category("relational operator (==, !=, >, <, <=, =>)")
    );
    assert_eq!(found, Token::new(TokenKind::Operator, "="));
}

#[test]
fn rejects_if_without_endif() {
    let (_, expected, found) = expect_syntax_error("$$ $$ $$ if (a < b) x = 1; $$");
    assert_eq!(expected, Expected::exact(TokenKind::Keyword, "endif"));
    assert_eq!(found, Token::new(TokenKind::Separator, "$$"));
}

#[test]
fn rejects_call_with_non_identifier_argument() {
    let (_, expected, found) = expect_syntax_error("$$ $$ $$ x = f(1); $$");
    assert_eq!(expected, Expected::kind(TokenKind::Identifier));
    assert_eq!(found, Token::new(TokenKind::Integer, "1"));
}

#[test]
fn rejects_dangling_binary_operator() {
    let (_, expected, found) = expect_syntax_error("$$ $$ $$ x = a + ; $$");
    assert_eq!(expected, Expected::Category("primary expression"));
    assert_eq!(found, Token::new(TokenKind::Separator, ";"));
}

#[test]
fn accepts_nested_expressions_and_unary_minus() {
    check_source("$$ $$ $$ x = -a + b * (c - 2) / 4.5 - (-(d)); $$")
        .expect("expression should parse");
}

#[test]
fn accepts_every_relational_operator() {
    for relop in ["==", "!=", ">", "<", "<=", "=>"] {
        let source = format!("$$ $$ $$ if (a {relop} b) x = 1; endif $$");
        check_source(&source).unwrap_or_else(|error| panic!("{relop} rejected: {error}"));
    }
}

#[test]
fn accepts_return_with_and_without_expression() {
    check_source("$$ function f () { return; return f(x) + 1; } $$ $$ x = 1; $$")
        .expect("returns should parse");
}

#[test]
fn error_line_counts_preceding_newlines() {
    let (line, _, found) = expect_syntax_error("$$\n$$\n$$\nx = 1 +;\n$$");
    assert_eq!(line, 4);
    assert_eq!(found, Token::new(TokenKind::Separator, ";"));
}

#[test]
fn formats_syntax_error_diagnostic() {
    let error = check_source("$$ $$ $$ x = 1;").expect_err("missing delimiter");
    assert_eq!(
        error.to_string(),
        "syntax error @ line 1: expected Separator '$$' but found EndOfInput"
    );
    assert_eq!(error.line(), Some(1));
}

#[test]
fn traces_reductions_in_completion_order() {
    assert_eq!(
        traced("$$ $$ $$ x = 1; $$"),
        vec![
            "<Empty> ::= ε",
            "<Opt Function Definitions> ::= <Empty>",
            "<Empty> ::= ε",
            "<Opt Declaration List> ::= <Empty>",
            "<Primary> ::= <Integer>",
            "<Factor> ::= <Primary>",
            "<Term'> ::= ε",
            "<Term> ::= <Factor> <Term'>",
            "<Expression'> ::= ε",
            "<Expression> ::= <Term> <Expression'>",
            "<Assign> ::= <Identifier> = <Expression> ;",
            "<Statement> ::= <Assign>",
            "<Statement List> ::= <Statement>",
            "<Rat25S> ::= $$ <Opt Function Definitions> $$ <Opt Declaration List> $$ <Statement List> $$",
        ]
    );
}

#[test]
fn traces_boolean_literal_and_qualifier() {
    let lines = traced("$$ $$ boolean done; $$ done = true; $$");
    assert!(lines.contains(&"<Qualifier> ::= boolean".to_string()));
    assert!(lines.contains(&"<Primary> ::= true".to_string()));
    assert!(lines.contains(&"<Declaration List> ::= <Declaration> ;".to_string()));
}

#[test]
fn traces_if_else_and_recursive_lists() {
    let lines = traced("$$ $$ $$ scan (a, b); if (a > b) print (a); else print (b); endif $$");
    assert!(lines.contains(&"<IDs> ::= <Identifier> , <IDs>".to_string()));
    assert!(lines.contains(&"<Relop> ::= >".to_string()));
    assert!(lines.contains(
        &"<If> ::= if ( <Condition> ) <Statement> else <Statement> endif".to_string()
    ));
    assert!(lines.contains(&"<Statement List> ::= <Statement> <Statement List>".to_string()));
}

#[test]
fn trace_does_not_change_outcome() {
    let bad = "$$ $$ $$ while (x < 1) x = x + 1; $$";
    let quiet = check_source(bad).expect_err("missing endwhile");
    let verbose = check_source_with_output(
        bad,
        ParseOptions::default()
            .with_token_echo(true)
            .with_rule_trace(true),
    )
    .expect_err("missing endwhile");
    assert_eq!(quiet.to_string(), verbose.to_string());

    let quiet = check_source(SAMPLE_PROGRAM);
    let verbose = check_source_with_output(
        SAMPLE_PROGRAM,
        ParseOptions::default().with_rule_trace(true),
    );
    assert!(quiet.is_ok());
    assert!(verbose.is_ok());
}

#[test]
fn keeps_output_written_before_failure() {
    let mut out = Vec::new();
    let result = parse(
        "$$ $$ $$ x = ; $$".as_bytes(),
        ParseOptions::default().with_token_echo(true),
        &mut out,
    );
    assert!(matches!(result, Err(Error::Syntax { .. })));

    let output = String::from_utf8(out).expect("utf-8 output");
    let rows: Vec<&str> = output.lines().collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[3], Token::new(TokenKind::Identifier, "x").table_row());
    assert_eq!(rows[4], Token::new(TokenKind::Operator, "=").table_row());
}
