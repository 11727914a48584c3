use tsgd_ast::Span;

/// Represents the different kinds of tokens in the TypeScript subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Reserved keywords
    Let,
    Const,
    Var,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    Class,
    Extends,
    Enum,
    Import,
    Export,
    New,
    This,
    Super,
    Typeof,
    Instanceof,
    In,
    Void,
    Delete,
    Null,
    True,
    False,
    Try,
    Catch,
    Finally,
    Throw,
    Debugger,

    // Contextual keywords (also valid identifiers)
    Implements,
    Interface,
    Type,
    From,
    As,
    Of,
    Undefined,
    Async,
    Await,
    Yield,
    Static,
    Public,
    Private,
    Protected,
    Readonly,
    Abstract,
    Declare,
    Module,
    Namespace,
    Keyof,
    Never,
    Unknown,
    Any,
    Satisfies,
    Override,
    Get,
    Set,
    Is,

    // Literals
    NumberLiteral,
    StringLiteral,
    /// Raw template body between backticks, `${...}` kept verbatim.
    TemplateLiteral,
    RegexLiteral,

    // Identifier
    Identifier,

    // Operators
    Plus,              // +
    Minus,             // -
    Star,              // *
    Slash,             // /
    Percent,           // %
    StarStar,          // **
    Eq,                // =
    EqEq,              // ==
    EqEqEq,            // ===
    BangEq,            // !=
    BangEqEq,          // !==
    Lt,                // <
    Gt,                // >
    LtEq,              // <=
    GtEq,              // >=
    AmpAmp,            // &&
    PipePipe,          // ||
    Bang,              // !
    Amp,               // &
    Pipe,              // |
    Caret,             // ^
    Tilde,             // ~
    LtLt,              // <<
    GtGt,              // >>
    GtGtGt,            // >>>
    PlusEq,            // +=
    MinusEq,           // -=
    StarEq,            // *=
    SlashEq,           // /=
    PercentEq,         // %=
    StarStarEq,        // **=
    AmpAmpEq,          // &&=
    PipePipeEq,        // ||=
    QuestionQuestionEq,// ??=
    LtLtEq,            // <<=
    GtGtEq,            // >>=
    GtGtGtEq,          // >>>=
    AmpEq,             // &=
    PipeEq,            // |=
    CaretEq,           // ^=
    QuestionQuestion,  // ??
    QuestionDot,       // ?.
    PlusPlus,          // ++
    MinusMinus,        // --
    FatArrow,          // =>
    DotDotDot,         // ...

    // Delimiters
    LParen,            // (
    RParen,            // )
    LBrace,            // {
    RBrace,            // }
    LBracket,          // [
    RBracket,          // ]
    Semicolon,         // ;
    Comma,             // ,
    Dot,               // .
    Colon,             // :
    Question,          // ?
    At,                // @

    // Special
    Eof,
    Error,
}

impl TokenKind {
    /// Keywords that TypeScript still accepts as plain identifiers.
    pub fn is_contextual_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Implements
                | TokenKind::Interface
                | TokenKind::Type
                | TokenKind::From
                | TokenKind::As
                | TokenKind::Of
                | TokenKind::Undefined
                | TokenKind::Async
                | TokenKind::Await
                | TokenKind::Yield
                | TokenKind::Static
                | TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Readonly
                | TokenKind::Abstract
                | TokenKind::Declare
                | TokenKind::Module
                | TokenKind::Namespace
                | TokenKind::Keyof
                | TokenKind::Never
                | TokenKind::Unknown
                | TokenKind::Any
                | TokenKind::Satisfies
                | TokenKind::Override
                | TokenKind::Get
                | TokenKind::Set
                | TokenKind::Is
        )
    }

    /// Any word-like token: identifiers and every keyword. Valid after `.`
    /// and as an object key.
    pub fn is_word(&self) -> bool {
        self.is_contextual_keyword()
            || matches!(
                self,
                TokenKind::Identifier
                    | TokenKind::Let
                    | TokenKind::Const
                    | TokenKind::Var
                    | TokenKind::Function
                    | TokenKind::Return
                    | TokenKind::If
                    | TokenKind::Else
                    | TokenKind::For
                    | TokenKind::While
                    | TokenKind::Do
                    | TokenKind::Break
                    | TokenKind::Continue
                    | TokenKind::Switch
                    | TokenKind::Case
                    | TokenKind::Default
                    | TokenKind::Class
                    | TokenKind::Extends
                    | TokenKind::Enum
                    | TokenKind::Import
                    | TokenKind::Export
                    | TokenKind::New
                    | TokenKind::This
                    | TokenKind::Super
                    | TokenKind::Typeof
                    | TokenKind::Instanceof
                    | TokenKind::In
                    | TokenKind::Void
                    | TokenKind::Delete
                    | TokenKind::Null
                    | TokenKind::True
                    | TokenKind::False
                    | TokenKind::Try
                    | TokenKind::Catch
                    | TokenKind::Finally
                    | TokenKind::Throw
                    | TokenKind::Debugger
            )
    }

    /// Whether a `/` following this token starts a regular expression
    /// rather than a division.
    pub(crate) fn allows_regex_after(&self) -> bool {
        !matches!(
            self,
            TokenKind::Identifier
                | TokenKind::NumberLiteral
                | TokenKind::StringLiteral
                | TokenKind::TemplateLiteral
                | TokenKind::RegexLiteral
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
        ) && !self.is_contextual_keyword()
    }
}

/// Represents a token with its kind, span, and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: String,
    /// A line break separates this token from the previous one.
    pub newline_before: bool,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span, value: String) -> Self {
        Self {
            kind,
            span,
            value,
            newline_before: false,
        }
    }
}
