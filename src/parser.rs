//! Surface syntax: tokens, definitions, and the terms they parse into.
//!
//! A source file is a sequence of definitions `Name = body`; a body
//! extends to the token before the next `=`. Abstractions are written
//! `\x body` or `λx body` and swallow the rest of their scope; `;`
//! applies everything on its left to everything on its right;
//! application is otherwise left-associative. Global names start with an
//! uppercase letter, variables with a lowercase one, integer literals
//! with a digit.

use crate::compiler::Term;
use num_bigint::BigInt;
use std::rc::Rc;
use thiserror::Error;

/// Source position of a token or node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileInfo {
    pub filename: Rc<str>,
    pub line: u32,
    pub column: u32,
}

/// Metadata attached to every parsed node: the display name and, when
/// known, where it came from. The evaluator never looks inside; only the
/// printer and diagnostics do.
#[derive(Clone, Debug)]
pub struct MetaInfo {
    pub name: String,
    pub file_info: Option<FileInfo>,
}

pub type Meta = Rc<MetaInfo>;

#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct ParseError {
    pub file_info: Option<FileInfo>,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct Token {
    pub file_info: FileInfo,
    pub text: String,
}

/// Split source text into tokens, tracking line and column per token.
/// `( ) \ λ ;` are single-rune tokens; whitespace only separates.
pub fn tokenize(filename: &str, src: &str) -> Vec<Token> {
    let filename: Rc<str> = Rc::from(filename);
    let mut tokens = Vec::new();
    let mut token = String::new();
    let mut token_line = 1u32;
    let mut token_column = 1u32;
    let mut line = 1u32;
    let mut column = 1u32;

    for ch in src.chars() {
        let special = matches!(ch, '(' | ')' | '\\' | 'λ' | ';');
        if ch.is_whitespace() || special {
            if !token.is_empty() {
                tokens.push(Token {
                    file_info: FileInfo {
                        filename: filename.clone(),
                        line: token_line,
                        column: token_column,
                    },
                    text: std::mem::take(&mut token),
                });
            }
            if special {
                tokens.push(Token {
                    file_info: FileInfo { filename: filename.clone(), line, column },
                    text: ch.to_string(),
                });
            }
        } else {
            if token.is_empty() {
                token_line = line;
                token_column = column;
            }
            token.push(ch);
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    if !token.is_empty() {
        tokens.push(Token {
            file_info: FileInfo { filename, line: token_line, column: token_column },
            text: token,
        });
    }

    tokens
}

/// Parse a whole file of definitions, in source order.
pub fn definitions(filename: &str, src: &str) -> Result<Vec<(String, Term<Meta>)>, ParseError> {
    let toks = tokenize(filename, src);
    let mut defs = Vec::new();
    let mut rest: &[Token] = &toks;
    while !rest.is_empty() {
        let (name, node, ends) = definition(rest)?;
        defs.push((name, node));
        rest = &rest[ends..];
    }
    Ok(defs)
}

/// Parse a single expression covering the whole input.
pub fn single(filename: &str, src: &str) -> Result<Term<Meta>, ParseError> {
    let toks = tokenize(filename, src);
    single_from_tokens(&toks)?.ok_or_else(|| ParseError {
        file_info: None,
        message: "no expression".to_string(),
    })
}

fn definition(toks: &[Token]) -> Result<(String, Term<Meta>, usize), ParseError> {
    if toks.len() < 3 || toks[1].text != "=" {
        return Err(ParseError {
            file_info: toks.first().map(|t| t.file_info.clone()),
            message: "no or invalid definition".to_string(),
        });
    }
    let name = toks[0].text.clone();
    if !name.chars().next().is_some_and(char::is_uppercase) {
        return Err(err(&toks[0], &format!("invalid global name '{name}'")));
    }
    // The body runs to the token before the next '=' (that token is the
    // next definition's name). The scan starts past the first body token
    // so a stray leading '=' cannot produce an empty split.
    let mut ends = toks.len();
    for i in 3..toks.len() {
        if toks[i].text == "=" {
            ends = i - 1;
            break;
        }
    }
    let node = single_from_tokens(&toks[2..ends])?
        .ok_or_else(|| err(&toks[0], &format!("no expression in definition of '{name}'")))?;
    Ok((name, node, ends))
}

fn single_from_tokens(toks: &[Token]) -> Result<Option<Term<Meta>>, ParseError> {
    let mut node: Option<Term<Meta>> = None;
    let mut i = 0usize;

    while i < toks.len() {
        let tok = &toks[i];
        let right = match tok.text.as_str() {
            "(" => {
                let len = matching_paren(&toks[i + 1..])
                    .ok_or_else(|| err(tok, "no matching right parenthesis"))?;
                let inner = single_from_tokens(&toks[i + 1..i + 1 + len])?
                    .ok_or_else(|| err(tok, "no expression inside parenthesis"))?;
                i += 1 + len;
                inner
            }
            ")" => return Err(err(tok, "no matching left parenthesis")),
            "\\" | "λ" => {
                if i + 1 >= toks.len() {
                    return Err(err(tok, &format!("no binding after '{}'", tok.text)));
                }
                let bound_tok = &toks[i + 1];
                let bound = bound_tok.text.clone();
                if !bound.chars().next().is_some_and(char::is_lowercase) {
                    return Err(err(bound_tok, &format!("invalid bound name '{bound}'")));
                }
                let body = single_from_tokens(&toks[i + 2..])?
                    .ok_or_else(|| err(tok, "no body in abstraction"))?;
                let abst = Term::Abst {
                    bound: bound.clone(),
                    body: Box::new(body),
                    meta: Rc::new(MetaInfo {
                        name: bound,
                        file_info: Some(tok.file_info.clone()),
                    }),
                };
                return Ok(Some(wrap_appl(node, abst)));
            }
            ";" => {
                let after = single_from_tokens(&toks[i + 1..])?
                    .ok_or_else(|| err(tok, "no expression after ';'"))?;
                return Ok(Some(wrap_appl(node, after)));
            }
            text => {
                let first = text.chars().next().expect("tokens are never empty");
                let meta = Rc::new(MetaInfo {
                    name: text.to_string(),
                    file_info: Some(tok.file_info.clone()),
                });
                if first.is_ascii_digit() {
                    let value = text
                        .parse::<BigInt>()
                        .map_err(|_| err(tok, &format!("invalid integer literal '{text}'")))?;
                    Term::Int { value, meta }
                } else if first.is_uppercase() {
                    Term::Global { name: text.to_string(), meta }
                } else {
                    Term::Var { name: text.to_string(), meta }
                }
            }
        };
        node = Some(wrap_appl(node, right));
        i += 1;
    }

    Ok(node)
}

/// Index of the `)` closing the scope the slice starts inside of.
fn matching_paren(toks: &[Token]) -> Option<usize> {
    let mut nest = 1i32;
    for (i, tok) in toks.iter().enumerate() {
        match tok.text.as_str() {
            "(" => nest += 1,
            ")" => nest -= 1,
            _ => {}
        }
        if nest == 0 {
            return Some(i);
        }
    }
    None
}

fn wrap_appl(left: Option<Term<Meta>>, right: Term<Meta>) -> Term<Meta> {
    match left {
        None => right,
        Some(left) => {
            let meta = left.meta().clone();
            Term::Appl {
                left: Box::new(left),
                right: Box::new(right),
                meta,
            }
        }
    }
}

fn err(tok: &Token, message: &str) -> ParseError {
    ParseError {
        file_info: Some(tok.file_info.clone()),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_tracks_positions() {
        let toks = tokenize("t.lam", "I = \\x x\nK = λa λb a");
        let texts: Vec<&str> = toks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["I", "=", "\\", "x", "x", "K", "=", "λ", "a", "λ", "b", "a"]);
        assert_eq!((toks[0].file_info.line, toks[0].file_info.column), (1, 1));
        assert_eq!((toks[2].file_info.line, toks[2].file_info.column), (1, 5));
        assert_eq!((toks[5].file_info.line, toks[5].file_info.column), (2, 1));
        assert_eq!(&*toks[0].file_info.filename, "t.lam");
    }

    #[test]
    fn parse_definitions_splits_on_equals() {
        let defs = definitions("t.lam", "I = \\x x\nK = \\a \\b a").unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].0, "I");
        assert_eq!(defs[1].0, "K");
        match &defs[1].1 {
            Term::Abst { bound, .. } => assert_eq!(bound, "a"),
            other => panic!("expected an abstraction, got {other:?}"),
        }
    }

    #[test]
    fn application_is_left_associative() {
        let term = single("t.lam", "f x y").unwrap();
        match term {
            Term::Appl { left, right, .. } => {
                assert!(matches!(*right, Term::Var { ref name, .. } if name == "y"));
                assert!(matches!(*left, Term::Appl { .. }));
            }
            other => panic!("expected an application, got {other:?}"),
        }
    }

    #[test]
    fn semicolon_breaks_association() {
        // f ; g x is f (g x), not ((f g) x).
        let term = single("t.lam", "f ; g x").unwrap();
        match term {
            Term::Appl { left, right, .. } => {
                assert!(matches!(*left, Term::Var { ref name, .. } if name == "f"));
                assert!(matches!(*right, Term::Appl { .. }));
            }
            other => panic!("expected an application, got {other:?}"),
        }
    }

    #[test]
    fn case_of_first_letter_classifies_names() {
        let term = single("t.lam", "Global local 42").unwrap();
        let Term::Appl { left, right, .. } = term else {
            panic!("expected an application");
        };
        assert!(matches!(*right, Term::Int { .. }));
        let Term::Appl { left, right, .. } = *left else {
            panic!("expected an application");
        };
        assert!(matches!(*left, Term::Global { .. }));
        assert!(matches!(*right, Term::Var { .. }));
    }

    #[test]
    fn abstraction_swallows_its_scope() {
        // \x x y parses as λx (x y), not (λx x) y.
        let term = single("t.lam", "\\x x y").unwrap();
        match term {
            Term::Abst { body, .. } => assert!(matches!(*body, Term::Appl { .. })),
            other => panic!("expected an abstraction, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_bound_names() {
        let e = single("t.lam", "\\X X").unwrap_err();
        assert_eq!(e.message, "invalid bound name 'X'");
        let fi = e.file_info.unwrap();
        assert_eq!((fi.line, fi.column), (1, 2));
    }

    #[test]
    fn rejects_unbalanced_parens() {
        let e = single("t.lam", "(x").unwrap_err();
        assert_eq!(e.message, "no matching right parenthesis");
        let e = single("t.lam", "x)").unwrap_err();
        assert_eq!(e.message, "no matching left parenthesis");
    }

    #[test]
    fn rejects_lowercase_definition_names() {
        let e = definitions("t.lam", "x = y").unwrap_err();
        assert_eq!(e.message, "invalid global name 'x'");
        let fi = e.file_info.unwrap();
        assert_eq!((fi.line, fi.column), (1, 1));
    }

    #[test]
    fn rejects_malformed_integer_literals() {
        let e = single("t.lam", "5x").unwrap_err();
        assert_eq!(e.message, "invalid integer literal '5x'");
    }

    #[test]
    fn rejects_empty_definitions() {
        let e = definitions("t.lam", "A = B = \\x x").unwrap_err();
        assert_eq!(e.message, "no expression in definition of 'A'");
    }
}
