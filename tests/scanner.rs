#[cfg(test)]
mod scanner_tests {
    use lumen::scanner::*;
    use lumen::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({[*.,%]})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::LEFT_SQUARE, "["),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::MODULO, "%"),
                (TokenType::RIGHT_SQUARE, "]"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_operators() {
        assert_token_sequence(
            "! != = == < <= > >=",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords() {
        assert_token_sequence(
            "break elif while and or class super this",
            &[
                (TokenType::BREAK, "break"),
                (TokenType::ELIF, "elif"),
                (TokenType::WHILE, "while"),
                (TokenType::AND, "and"),
                (TokenType::OR, "or"),
                (TokenType::CLASS, "class"),
                (TokenType::SUPER, "super"),
                (TokenType::THIS, "this"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_identifiers_and_numbers() {
        assert_token_sequence(
            "var foo_1 = 42.5;",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "foo_1"),
                (TokenType::EQUAL, "="),
                (TokenType::NUMBER(42.5), "42.5"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_05_number_payload() {
        let tokens = scan_all(b"3.14 7").unwrap();

        match tokens[0].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 3.14),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }
        match tokens[1].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 7.0),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }
    }

    #[test]
    fn test_scanner_06_plain_string() {
        let tokens = scan_all(br#""abc""#).unwrap();

        assert_eq!(tokens[0].token_type, TokenType::STRING_START);
        match &tokens[1].token_type {
            TokenType::STRING_LIT(s) => assert_eq!(s, "abc"),
            other => panic!("expected STRING_LIT, got {:?}", other),
        }
        assert_eq!(tokens[2].token_type, TokenType::STRING_END);
        assert_eq!(tokens[3].token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_07_interpolation_sequence() {
        assert_token_sequence(
            r#""hi %{name}!""#,
            &[
                (TokenType::STRING_START, "\""),
                (TokenType::STRING_LIT(String::new()), "hi "),
                (TokenType::STRING_INT_START, "%{"),
                (TokenType::IDENTIFIER, "name"),
                (TokenType::STRING_INT_END, "}"),
                (TokenType::STRING_LIT(String::new()), "!"),
                (TokenType::STRING_END, "\""),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_08_interpolated_expression_tokens() {
        assert_token_sequence(
            r#""n=%{1 + 2}""#,
            &[
                (TokenType::STRING_START, "\""),
                (TokenType::STRING_LIT(String::new()), "n="),
                (TokenType::STRING_INT_START, "%{"),
                (TokenType::NUMBER(1.0), "1"),
                (TokenType::PLUS, "+"),
                (TokenType::NUMBER(2.0), "2"),
                (TokenType::STRING_INT_END, "}"),
                (TokenType::STRING_END, "\""),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_09_lone_percent_is_literal() {
        // '%' not followed by '{' stays ordinary string content
        let tokens = scan_all(br#""50% off""#).unwrap();

        let fragments: Vec<String> = tokens
            .iter()
            .filter_map(|t| match &t.token_type {
                TokenType::STRING_LIT(s) => Some(s.clone()),
                _ => None,
            })
            .collect();

        assert_eq!(fragments.concat(), "50% off");
    }

    #[test]
    fn test_scanner_10_line_comment_skipped() {
        let tokens = scan_all(b"1 // ignored\n2").unwrap();

        assert_eq!(tokens[0].token_type, TokenType::NUMBER(0.0));
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].token_type, TokenType::NUMBER(0.0));
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_11_block_comment_tracks_lines() {
        let tokens = scan_all(b"/* a\nb */ 3").unwrap();

        assert_eq!(tokens[0].token_type, TokenType::NUMBER(0.0));
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn test_scanner_12_unterminated_block_comment() {
        let err = scan_all(b"/* never closed").unwrap_err();

        assert!(err.to_string().contains("Unterminated block comment"));
    }

    #[test]
    fn test_scanner_13_unterminated_string() {
        let err = scan_all(br#""abc"#).unwrap_err();

        assert!(err.to_string().contains("Unterminated string"));
    }

    #[test]
    fn test_scanner_14_unexpected_character() {
        let err = scan_all(b"var $x;").unwrap_err();

        assert!(err.to_string().contains("Unexpected character"));
    }

    #[test]
    fn test_scanner_15_token_display() {
        let token = Token::new(TokenType::NUMBER(3.0), "3", 1);
        assert_eq!(token.to_string(), "NUMBER 3 3.0");

        let token = Token::new(TokenType::NUMBER(3.14), "3.14", 1);
        assert_eq!(token.to_string(), "NUMBER 3.14 3.14");

        let token = Token::new(TokenType::SEMICOLON, ";", 1);
        assert_eq!(token.to_string(), "SEMICOLON ; null");
    }
}
