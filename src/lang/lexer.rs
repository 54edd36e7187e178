use super::ParseError;
use crate::ast::{Pos, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Open(char),
    Close(char),
    Atom,
    Str,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

struct Cursor<'a> {
    src: &'a str,
    offset: usize,
    pos: Pos,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.offset..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.ch = 0;
        } else {
            self.pos.ch += 1;
        }
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '"' | ';')
}

/// Split source text into tokens with positions.
pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut cursor = Cursor {
        src,
        offset: 0,
        pos: Pos::default(),
    };
    let mut tokens = Vec::new();

    loop {
        cursor.eat_while(char::is_whitespace);
        let start = cursor.pos;
        let start_offset = cursor.offset;
        let Some(c) = cursor.bump() else { break };

        let kind = match c {
            '(' | '[' => TokenKind::Open(c),
            ')' | ']' => TokenKind::Close(c),
            ';' => {
                cursor.eat_while(|c| c != '\n');
                TokenKind::Comment
            }
            '"' => {
                loop {
                    match cursor.bump() {
                        None => return Err(ParseError::new("unterminated string", start)),
                        Some('\\') => {
                            if cursor.bump().is_none() {
                                return Err(ParseError::new("unterminated string", start));
                            }
                        }
                        Some('"') => break,
                        Some(_) => {}
                    }
                }
                TokenKind::Str
            }
            _ => {
                cursor.eat_while(|c| !is_delimiter(c));
                TokenKind::Atom
            }
        };

        let mut text = &src[start_offset..cursor.offset];
        let mut end = cursor.pos;
        if kind == TokenKind::Comment {
            text = text.trim_end();
            end = Pos::new(start.line, start.ch + text.chars().count());
        }
        tokens.push(Token {
            kind,
            text,
            span: Span::new(start, end),
        });
    }

    Ok(tokens)
}
