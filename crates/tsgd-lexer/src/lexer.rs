use tsgd_ast::Span;
use crate::token::{Token, TokenKind};

/// The lexer/tokenizer for the TypeScript subset.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current_pos: usize,
    current_char: Option<char>,
    file_id: usize,
    /// Added to every span; non-zero when lexing a slice of a larger file.
    base_offset: usize,
    prev_kind: TokenKind,
    newline_before: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer from source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_file_id(source, 0)
    }

    /// Creates a new lexer with a specific file ID.
    pub fn with_file_id(source: &'a str, file_id: usize) -> Self {
        Self::with_offset(source, file_id, 0)
    }

    /// Creates a lexer for a slice that starts at `base_offset` in its file.
    /// Used for the `${...}` holes of template literals.
    pub fn with_offset(source: &'a str, file_id: usize, base_offset: usize) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        Self {
            source,
            chars,
            current_pos: 0,
            current_char,
            file_id,
            base_offset,
            prev_kind: TokenKind::Semicolon,
            newline_before: false,
        }
    }

    /// Tokenizes the entire source code and returns all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Gets the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.newline_before = false;
        let mut token = match self.skip_whitespace_and_comments() {
            Some(error_token) => error_token,
            None => self.read_token(),
        };
        token.newline_before = self.newline_before;
        self.prev_kind = token.kind.clone();
        token
    }

    fn read_token(&mut self) -> Token {
        let start = self.current_pos;

        let ch = match self.current_char {
            None => return self.make(TokenKind::Eof, start, String::new()),
            Some(ch) => ch,
        };

        match ch {
            // String literals
            '"' | '\'' => self.read_string_literal(ch),
            '`' => self.read_template_literal(),

            // Numbers
            '0'..='9' => self.read_number(),

            // Identifiers and keywords
            'a'..='z' | 'A'..='Z' | '_' | '$' => self.read_identifier_or_keyword(),

            // Operators
            '+' => self.read_compound(&[("++", TokenKind::PlusPlus), ("+=", TokenKind::PlusEq)], TokenKind::Plus),
            '-' => self.read_compound(&[("--", TokenKind::MinusMinus), ("-=", TokenKind::MinusEq)], TokenKind::Minus),
            '*' => self.read_compound(
                &[("**=", TokenKind::StarStarEq), ("**", TokenKind::StarStar), ("*=", TokenKind::StarEq)],
                TokenKind::Star,
            ),
            '/' => self.read_slash_or_regex(),
            '%' => self.read_compound(&[("%=", TokenKind::PercentEq)], TokenKind::Percent),
            '=' => self.read_compound(
                &[("===", TokenKind::EqEqEq), ("==", TokenKind::EqEq), ("=>", TokenKind::FatArrow)],
                TokenKind::Eq,
            ),
            '!' => self.read_compound(&[("!==", TokenKind::BangEqEq), ("!=", TokenKind::BangEq)], TokenKind::Bang),
            '<' => self.read_compound(
                &[("<<=", TokenKind::LtLtEq), ("<<", TokenKind::LtLt), ("<=", TokenKind::LtEq)],
                TokenKind::Lt,
            ),
            '>' => self.read_compound(
                &[
                    (">>>=", TokenKind::GtGtGtEq),
                    (">>>", TokenKind::GtGtGt),
                    (">>=", TokenKind::GtGtEq),
                    (">>", TokenKind::GtGt),
                    (">=", TokenKind::GtEq),
                ],
                TokenKind::Gt,
            ),
            '&' => self.read_compound(
                &[("&&=", TokenKind::AmpAmpEq), ("&&", TokenKind::AmpAmp), ("&=", TokenKind::AmpEq)],
                TokenKind::Amp,
            ),
            '|' => self.read_compound(
                &[("||=", TokenKind::PipePipeEq), ("||", TokenKind::PipePipe), ("|=", TokenKind::PipeEq)],
                TokenKind::Pipe,
            ),
            '^' => self.read_compound(&[("^=", TokenKind::CaretEq)], TokenKind::Caret),
            '~' => self.read_compound(&[], TokenKind::Tilde),
            '?' => self.read_question(),
            '.' => self.read_dot(),

            // Delimiters
            '(' => self.read_compound(&[], TokenKind::LParen),
            ')' => self.read_compound(&[], TokenKind::RParen),
            '{' => self.read_compound(&[], TokenKind::LBrace),
            '}' => self.read_compound(&[], TokenKind::RBrace),
            '[' => self.read_compound(&[], TokenKind::LBracket),
            ']' => self.read_compound(&[], TokenKind::RBracket),
            ';' => self.read_compound(&[], TokenKind::Semicolon),
            ',' => self.read_compound(&[], TokenKind::Comma),
            ':' => self.read_compound(&[], TokenKind::Colon),
            '@' => self.read_compound(&[], TokenKind::At),

            // Unicode identifiers
            _ if ch.is_alphabetic() => self.read_identifier_or_keyword(),

            // Error
            _ => {
                self.advance();
                self.make(TokenKind::Error, start, format!("Unexpected character: {}", ch))
            }
        }
    }

    // Helper methods

    fn make(&self, kind: TokenKind, start: usize, value: String) -> Token {
        Token::new(
            kind,
            Span::new(self.base_offset + start, self.base_offset + self.current_pos, self.file_id),
            value,
        )
    }

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    /// Matches the longest of `candidates` at the cursor, falling back to the
    /// single-character `fallback` token.
    fn read_compound(&mut self, candidates: &[(&str, TokenKind)], fallback: TokenKind) -> Token {
        let start = self.current_pos;
        let rest = &self.source[start..];

        for (text, kind) in candidates {
            if rest.starts_with(text) {
                for _ in 0..text.chars().count() {
                    self.advance();
                }
                return self.make(kind.clone(), start, text.to_string());
            }
        }

        let text = rest.chars().next().map(String::from).unwrap_or_default();
        self.advance();
        self.make(fallback, start, text)
    }

    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            match self.current_char {
                Some(ch) if ch.is_whitespace() => {
                    if ch == '\n' {
                        self.newline_before = true;
                    }
                    self.advance();
                }
                Some('/') => {
                    if self.peek() == Some('/') {
                        self.skip_single_line_comment();
                    } else if self.peek() == Some('*') {
                        let start = self.current_pos;
                        if !self.skip_multi_line_comment() {
                            return Some(self.make(
                                TokenKind::Error,
                                start,
                                "Unterminated multi-line comment".to_string(),
                            ));
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        None
    }

    fn skip_single_line_comment(&mut self) {
        // Skip //
        self.advance();
        self.advance();

        while let Some(ch) = self.current_char {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_multi_line_comment(&mut self) -> bool {
        // Skip /*
        self.advance();
        self.advance();

        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance(); // *
                self.advance(); // /
                return true;
            }
            if ch == '\n' {
                self.newline_before = true;
            }
            self.advance();
        }
        false
    }

    fn read_string_literal(&mut self, quote: char) -> Token {
        let start = self.current_pos;
        self.advance(); // Skip opening quote

        let mut value = String::new();
        // The first malformed escape; the literal is still read to its end
        let mut malformed: Option<String> = None;

        while let Some(ch) = self.current_char {
            if ch == quote {
                self.advance(); // Skip closing quote
                if let Some(message) = malformed {
                    return self.make(TokenKind::Error, start, message);
                }
                return self.make(TokenKind::StringLiteral, start, value);
            } else if ch == '\\' {
                match self.read_escape() {
                    Ok(Some(decoded)) => value.push(decoded),
                    Ok(None) => {}
                    Err(message) => {
                        malformed.get_or_insert(message);
                    }
                }
            } else if ch == '\n' {
                return self.make(TokenKind::Error, start, "Unterminated string literal".to_string());
            } else {
                value.push(ch);
                self.advance();
            }
        }

        self.make(TokenKind::Error, start, "Unterminated string literal".to_string())
    }

    /// Decodes the escape sequence at the cursor, which sits on the
    /// backslash. A line continuation decodes to nothing.
    fn read_escape(&mut self) -> Result<Option<char>, String> {
        self.advance();
        let Some(escaped) = self.current_char else {
            return Ok(None);
        };
        self.advance();
        match escaped {
            'u' => self.read_unicode_escape().map(Some),
            'x' => self
                .read_hex_code(2)
                .and_then(char::from_u32)
                .map(Some)
                .ok_or_else(|| "Invalid hexadecimal escape sequence".to_string()),
            '\n' => Ok(None),
            _ => Ok(Some(unescape(escaped))),
        }
    }

    /// Reads exactly `count` hex digits.
    fn read_hex_code(&mut self, count: usize) -> Option<u32> {
        let mut code = 0u32;
        for _ in 0..count {
            let digit = self.current_char.and_then(|ch| ch.to_digit(16))?;
            code = code * 16 + digit;
            self.advance();
        }
        Some(code)
    }

    /// Reads the rest of a `\u` escape: `XXXX`, a `\uXXXX\uXXXX` surrogate
    /// pair, or the braced `{X...}` code point form.
    fn read_unicode_escape(&mut self) -> Result<char, String> {
        let invalid = || "Invalid Unicode escape sequence".to_string();

        if self.current_char == Some('{') {
            self.advance();
            let mut code = 0u32;
            let mut digits = 0;
            while let Some(digit) = self.current_char.and_then(|ch| ch.to_digit(16)) {
                code = code.saturating_mul(16).saturating_add(digit);
                digits += 1;
                self.advance();
            }
            if digits == 0 || self.current_char != Some('}') {
                return Err(invalid());
            }
            self.advance();
            if code > 0x10FFFF {
                return Err("Unicode escape is out of range".to_string());
            }
            return char::from_u32(code).ok_or_else(|| "Unpaired surrogate in Unicode escape".to_string());
        }

        let high = self.read_hex_code(4).ok_or_else(invalid)?;
        if !(0xD800..=0xDBFF).contains(&high) {
            return char::from_u32(high).ok_or_else(|| "Unpaired surrogate in Unicode escape".to_string());
        }
        if self.current_char != Some('\\') || self.peek() != Some('u') {
            return Err("Unpaired surrogate in Unicode escape".to_string());
        }
        self.advance();
        self.advance();
        let low = self.read_hex_code(4).ok_or_else(invalid)?;
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err("Unpaired surrogate in Unicode escape".to_string());
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or_else(invalid)
    }

    /// Reads a template literal verbatim. Escapes stay escaped and `${...}`
    /// holes stay in place; the parser splits them.
    fn read_template_literal(&mut self) -> Token {
        let start = self.current_pos;
        self.advance(); // Skip opening backtick

        let mut value = String::new();
        let mut depth = 0usize;

        while let Some(ch) = self.current_char {
            match ch {
                '`' if depth == 0 => {
                    self.advance();
                    return self.make(TokenKind::TemplateLiteral, start, value);
                }
                '\\' => {
                    value.push(ch);
                    self.advance();
                    if let Some(escaped) = self.current_char {
                        value.push(escaped);
                        self.advance();
                    }
                }
                '$' if depth == 0 && self.peek() == Some('{') => {
                    value.push_str("${");
                    self.advance();
                    self.advance();
                    depth = 1;
                }
                '{' if depth > 0 => {
                    depth += 1;
                    value.push(ch);
                    self.advance();
                }
                '}' if depth > 0 => {
                    depth -= 1;
                    value.push(ch);
                    self.advance();
                }
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        self.make(TokenKind::Error, start, "Unterminated template literal".to_string())
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_pos;

        if self.current_char == Some('0') {
            if let Some(prefix @ ('x' | 'X' | 'o' | 'O' | 'b' | 'B')) = self.peek() {
                let radix = match prefix.to_ascii_lowercase() {
                    'x' => 16,
                    'o' => 8,
                    _ => 2,
                };
                let mut value = format!("0{}", prefix.to_ascii_lowercase());
                self.advance();
                self.advance();
                self.read_digits(&mut value, |c| c.is_digit(radix));
                if value.len() == 2 {
                    return self.invalid_number(start, "Digits expected after the radix prefix");
                }
                if i64::from_str_radix(&value[2..], radix).is_err() {
                    return self.invalid_number(start, "Integer literal does not fit in 64 bits");
                }
                return self.finish_number(start, value);
            }
        }

        let mut value = String::new();
        self.read_digits(&mut value, |c| c.is_ascii_digit());

        // Check for decimal point
        if self.current_char == Some('.') && self.peek().map_or(false, |c| c.is_ascii_digit()) {
            value.push('.');
            self.advance();
            self.read_digits(&mut value, |c| c.is_ascii_digit());
        }

        if !self.read_exponent(&mut value) {
            return self.invalid_number(start, "Digits expected in the exponent");
        }
        if !value.contains(|c| c == '.' || c == 'e') && value.parse::<i64>().is_err() {
            return self.invalid_number(start, "Integer literal does not fit in 64 bits");
        }

        self.finish_number(start, value)
    }

    fn read_digits(&mut self, value: &mut String, accept: impl Fn(char) -> bool) {
        while let Some(ch) = self.current_char {
            if accept(ch) {
                value.push(ch);
                self.advance();
            } else if ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Reads an optional exponent. False when it has no digits.
    fn read_exponent(&mut self, value: &mut String) -> bool {
        if !matches!(self.current_char, Some('e') | Some('E')) {
            return true;
        }
        value.push('e');
        self.advance();

        if let Some(sign @ ('+' | '-')) = self.current_char {
            value.push(sign);
            self.advance();
        }

        let before = value.len();
        self.read_digits(value, |c| c.is_ascii_digit());
        value.len() > before
    }

    fn finish_number(&mut self, start: usize, value: String) -> Token {
        if self.current_char.is_some_and(is_word_char) {
            return self.invalid_number(start, "An identifier cannot immediately follow a numeric literal");
        }
        self.make(TokenKind::NumberLiteral, start, value)
    }

    /// Error token covering the literal and whatever word is glued to it.
    fn invalid_number(&mut self, start: usize, message: &str) -> Token {
        while self.current_char.is_some_and(is_word_char) {
            self.advance();
        }
        self.make(TokenKind::Error, start, message.to_string())
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.current_pos;
        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match value.as_str() {
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "var" => TokenKind::Var,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "class" => TokenKind::Class,
            "extends" => TokenKind::Extends,
            "enum" => TokenKind::Enum,
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "new" => TokenKind::New,
            "this" => TokenKind::This,
            "super" => TokenKind::Super,
            "typeof" => TokenKind::Typeof,
            "instanceof" => TokenKind::Instanceof,
            "in" => TokenKind::In,
            "void" => TokenKind::Void,
            "delete" => TokenKind::Delete,
            "null" => TokenKind::Null,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "throw" => TokenKind::Throw,
            "debugger" => TokenKind::Debugger,
            "implements" => TokenKind::Implements,
            "interface" => TokenKind::Interface,
            "type" => TokenKind::Type,
            "from" => TokenKind::From,
            "as" => TokenKind::As,
            "of" => TokenKind::Of,
            "undefined" => TokenKind::Undefined,
            "async" => TokenKind::Async,
            "await" => TokenKind::Await,
            "yield" => TokenKind::Yield,
            "static" => TokenKind::Static,
            "public" => TokenKind::Public,
            "private" => TokenKind::Private,
            "protected" => TokenKind::Protected,
            "readonly" => TokenKind::Readonly,
            "abstract" => TokenKind::Abstract,
            "declare" => TokenKind::Declare,
            "module" => TokenKind::Module,
            "namespace" => TokenKind::Namespace,
            "keyof" => TokenKind::Keyof,
            "never" => TokenKind::Never,
            "unknown" => TokenKind::Unknown,
            "any" => TokenKind::Any,
            "satisfies" => TokenKind::Satisfies,
            "override" => TokenKind::Override,
            "get" => TokenKind::Get,
            "set" => TokenKind::Set,
            "is" => TokenKind::Is,
            _ => TokenKind::Identifier,
        };

        self.make(kind, start, value)
    }

    fn read_slash_or_regex(&mut self) -> Token {
        if !self.prev_kind.allows_regex_after() {
            return self.read_compound(&[("/=", TokenKind::SlashEq)], TokenKind::Slash);
        }

        let start = self.current_pos;
        self.advance(); // Skip opening slash

        let mut pattern = String::new();
        let mut in_class = false;

        while let Some(ch) = self.current_char {
            match ch {
                '\n' => break,
                '\\' => {
                    pattern.push(ch);
                    self.advance();
                    if let Some(escaped) = self.current_char {
                        pattern.push(escaped);
                        self.advance();
                    }
                    continue;
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    self.advance();
                    let mut flags = String::new();
                    while let Some(flag) = self.current_char.filter(|c| c.is_ascii_alphabetic()) {
                        flags.push(flag);
                        self.advance();
                    }
                    return self.make(TokenKind::RegexLiteral, start, format!("{}/{}", pattern, flags));
                }
                _ => {}
            }
            pattern.push(ch);
            self.advance();
        }

        self.make(TokenKind::Error, start, "Unterminated regular expression".to_string())
    }

    fn read_question(&mut self) -> Token {
        // `a?.5 : b` is a conditional, not optional chaining
        let rest = &self.source[self.current_pos..];
        let optional_chain = rest.starts_with("?.")
            && !rest[2..].chars().next().map_or(false, |c| c.is_ascii_digit());

        if optional_chain {
            self.read_compound(&[("?.", TokenKind::QuestionDot)], TokenKind::Question)
        } else {
            self.read_compound(
                &[("??=", TokenKind::QuestionQuestionEq), ("??", TokenKind::QuestionQuestion)],
                TokenKind::Question,
            )
        }
    }

    fn read_dot(&mut self) -> Token {
        let start = self.current_pos;

        if self.peek().map_or(false, |c| c.is_ascii_digit()) {
            // Number starting with dot (e.g., .5)
            self.advance();
            let mut value = String::from("0.");
            self.read_digits(&mut value, |c| c.is_ascii_digit());
            if !self.read_exponent(&mut value) {
                return self.invalid_number(start, "Digits expected in the exponent");
            }
            return self.finish_number(start, value);
        }

        self.read_compound(&[("...", TokenKind::DotDotDot)], TokenKind::Dot)
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Decodes the escapes of a raw string body, such as a template literal
/// part.
pub fn cook(raw: &str) -> Result<String, String> {
    let mut lexer = Lexer::new(raw);
    let mut value = String::new();
    while let Some(ch) = lexer.current_char {
        if ch == '\\' {
            if let Some(decoded) = lexer.read_escape()? {
                value.push(decoded);
            }
        } else {
            value.push(ch);
            lexer.advance();
        }
    }
    Ok(value)
}

/// Decodes a single-character escape (`\n`, `\t`, ...).
fn unescape(escaped: char) -> char {
    match escaped {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'v' => '\u{b}',
        '0' => '\0',
        _ => escaped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords() {
        let tokens = kinds("let const var function return if else");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Let,
                TokenKind::Const,
                TokenKind::Var,
                TokenKind::Function,
                TokenKind::Return,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::new("42 3.14 1e10 0xFF 1_000 .5").tokenize();
        let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["42", "3.14", "1e10", "0xFF", "1000", "0.5", ""]);
        assert!(tokens[..6].iter().all(|t| t.kind == TokenKind::NumberLiteral));
    }

    #[test]
    fn test_malformed_numbers_are_errors() {
        for source in ["0x", "0b2", "1e", "1e+", ".5e", "3px", "99999999999999999999", "0x1_0000_0000_0000_0000"] {
            let tokens = Lexer::new(source).tokenize();
            assert_eq!(tokens[0].kind, TokenKind::Error, "{}", source);
            assert_eq!(tokens[1].kind, TokenKind::Eof, "{}", source);
        }
        // Largest int and a float past it
        let tokens = Lexer::new("9223372036854775807 99999999999999999999.0 1e400").tokenize();
        assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::NumberLiteral));
    }

    #[test]
    fn test_strings() {
        let tokens = Lexer::new(r#""hello" 'wor\'ld' "a\nb""#).tokenize();
        assert_eq!(tokens[0].value, "hello");
        assert_eq!(tokens[1].value, "wor'ld");
        assert_eq!(tokens[2].value, "a\nb");
    }

    #[test]
    fn test_unicode_escapes() {
        let tokens = Lexer::new(r#"'a\u{1F600}b' "\x41é" '😀' "\u{41}""#).tokenize();
        assert!(tokens[..4].iter().all(|t| t.kind == TokenKind::StringLiteral));
        assert_eq!(tokens[0].value, "a\u{1F600}b");
        assert_eq!(tokens[1].value, "A\u{e9}");
        assert_eq!(tokens[2].value, "\u{1F600}");
        assert_eq!(tokens[3].value, "A");
    }

    #[test]
    fn test_malformed_escapes_are_errors() {
        for source in [r"'\x4'", r"'\u12'", r"'\u{}'", r"'\u{110000}'", r"'\uD83D'", r"'\uDE00x'", r"'\u{1F600'"] {
            let tokens = Lexer::new(source).tokenize();
            assert_eq!(tokens[0].kind, TokenKind::Error, "{}", source);
            // The whole literal is consumed
            assert_eq!(tokens[1].kind, TokenKind::Eof, "{}", source);
        }
    }

    #[test]
    fn test_cook() {
        assert_eq!(cook(r"a\tb\u{1F600}\$").as_deref(), Ok("a\tb\u{1F600}$"));
        assert!(cook(r"\xZZ").is_err());
    }

    #[test]
    fn test_template_keeps_holes() {
        let tokens = Lexer::new("`a ${b + `c`} ${ {x: 1}.x } d`").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::TemplateLiteral);
        assert_eq!(tokens[0].value, "a ${b + `c`} ${ {x: 1}.x } d");
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("+ ++ += === !== ** **= => ... ?. ?? >>> >>= &&=");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Plus,
                TokenKind::PlusPlus,
                TokenKind::PlusEq,
                TokenKind::EqEqEq,
                TokenKind::BangEqEq,
                TokenKind::StarStar,
                TokenKind::StarStarEq,
                TokenKind::FatArrow,
                TokenKind::DotDotDot,
                TokenKind::QuestionDot,
                TokenKind::QuestionQuestion,
                TokenKind::GtGtGt,
                TokenKind::GtGtEq,
                TokenKind::AmpAmpEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_conditional_with_decimal_is_not_optional_chain() {
        let tokens = kinds("a ?.5 : b");
        assert_eq!(tokens[1], TokenKind::Question);
        assert_eq!(tokens[2], TokenKind::NumberLiteral);
    }

    #[test]
    fn test_comments_and_newlines() {
        let tokens = Lexer::new("a // one\n/* two\n */ b").tokenize();
        assert_eq!(tokens.len(), 3);
        assert!(!tokens[0].newline_before);
        assert!(tokens[1].newline_before);
    }

    #[test]
    fn test_regex_versus_division() {
        let tokens = Lexer::new("x = /ab+c/gi; y = a / b").tokenize();
        assert_eq!(tokens[2].kind, TokenKind::RegexLiteral);
        assert_eq!(tokens[2].value, "ab+c/gi");
        assert_eq!(tokens[7].kind, TokenKind::Slash);
    }

    #[test]
    fn test_spans_with_offset() {
        let tokens = Lexer::with_offset("ab", 2, 10).tokenize();
        assert_eq!(tokens[0].span, Span::new(10, 12, 2));
    }

    #[test]
    fn test_contextual_keywords() {
        assert!(TokenKind::Type.is_contextual_keyword());
        assert!(TokenKind::Of.is_word());
        assert!(TokenKind::Class.is_word());
        assert!(!TokenKind::Class.is_contextual_keyword());
    }
}
