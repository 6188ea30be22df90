//! Lexer for node templates using logos

use logos::Logos;

/// Byte range in template text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    /// `{{`, opens an action
    #[token("{{")]
    Open,

    /// `}}`, closes an action
    #[token("}}")]
    Close,

    #[token("{", |lex| lex.slice().to_string())]
    #[token("}", |lex| lex.slice().to_string())]
    #[regex(r"[^{}]+", |lex| lex.slice().to_string())]
    Text(String),
}

/// Tokenize a template, yielding unmatched input as `Err(span)`
pub fn lex(input: &str) -> impl Iterator<Item = Result<(Token, Span), Span>> + '_ {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| tok.map(|t| (t, span.clone())).map_err(|_| span))
}
