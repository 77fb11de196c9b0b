//! Shared pieces of the local fallback simulators.
//!
//! These are deliberately small, pure text-scanning functions: they cannot
//! handle arbitrary expressions, nested calls, or multi-statement lines.
//! Their job is graceful degradation when a remote backend is unreachable,
//! not correctness.

/// Value substituted for identifiers the simulators cannot resolve.
pub(crate) const PLACEHOLDER: i64 = 42;

/// What a simulator reports when it recognized no output statements at all.
pub(crate) const SIMULATED_SUCCESS: &str = "Program compiled and executed successfully";

/// Decode the escape sequences the simulators understand.
pub(crate) fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// True when the argument is a plain double-quoted string literal.
pub(crate) fn is_string_literal(arg: &str) -> bool {
    arg.len() >= 2 && arg.starts_with('"') && arg.ends_with('"')
}

/// Strip the surrounding quotes of a string literal.
pub(crate) fn literal_contents(arg: &str) -> &str {
    &arg[1..arg.len() - 1]
}

/// Render one call argument: string literals verbatim, everything else
/// evaluated as an integer expression, falling back to the raw text when the
/// expression is beyond the evaluator.
pub(crate) fn render_argument(arg: &str, resolve: &dyn Fn(&str) -> i64) -> String {
    let arg = arg.trim();
    if is_string_literal(arg) {
        return literal_contents(arg).to_string();
    }
    match eval_int_expr(arg, resolve) {
        Some(value) => value.to_string(),
        None => arg.to_string(),
    }
}

/// Substitute positional format specifiers (`%d`-style, one character from
/// `specs`) with rendered arguments. Specifiers beyond the argument list are
/// left in place.
pub(crate) fn substitute_format(
    format: &str,
    specs: &[char],
    args: &[&str],
    resolve: &dyn Fn(&str) -> i64,
) -> String {
    let mut out = String::with_capacity(format.len());
    let mut next_arg = 0;
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            if let Some(&spec) = chars.peek() {
                if specs.contains(&spec) && next_arg < args.len() {
                    chars.next();
                    out.push_str(&render_argument(args[next_arg], resolve));
                    next_arg += 1;
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

#[derive(Debug, PartialEq)]
enum Token {
    Int(i64),
    Ident(String),
    Op(char),
    Open,
    Close,
}

fn tokenize(expr: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '0'..='9' => {
                let mut value: i64 = 0;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    value = value.checked_mul(10)?.checked_add(d as i64)?;
                    chars.next();
                }
                tokens.push(Token::Int(value));
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            '+' | '-' | '*' | '/' | '%' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '(' => {
                tokens.push(Token::Open);
                chars.next();
            }
            ')' => {
                tokens.push(Token::Close);
                chars.next();
            }
            _ => return None,
        }
    }
    Some(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    resolve: &'a dyn Fn(&str) -> i64,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn expr(&mut self) -> Option<i64> {
        let mut value = self.term()?;
        while let Some(&Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = match op {
                '+' => value.checked_add(rhs)?,
                _ => value.checked_sub(rhs)?,
            };
        }
        Some(value)
    }

    fn term(&mut self) -> Option<i64> {
        let mut value = self.factor()?;
        while let Some(&Token::Op(op @ ('*' | '/' | '%'))) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = match op {
                '*' => value.checked_mul(rhs)?,
                '/' => value.checked_div(rhs)?,
                _ => value.checked_rem(rhs)?,
            };
        }
        Some(value)
    }

    fn factor(&mut self) -> Option<i64> {
        match self.peek()? {
            Token::Int(n) => {
                let n = *n;
                self.pos += 1;
                Some(n)
            }
            Token::Ident(name) => {
                let value = (self.resolve)(name);
                self.pos += 1;
                Some(value)
            }
            Token::Op('-') => {
                self.pos += 1;
                Some(self.factor()?.checked_neg()?)
            }
            Token::Open => {
                self.pos += 1;
                let value = self.expr()?;
                match self.peek() {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Some(value)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Evaluate a simple integer expression (`+ - * / %`, parentheses, unary
/// minus). Identifiers go through `resolve`. Returns `None` for anything the
/// grammar does not cover, including division by zero.
pub(crate) fn eval_int_expr(expr: &str, resolve: &dyn Fn(&str) -> i64) -> Option<i64> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return None;
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        resolve,
    };
    let value = parser.expr()?;
    if parser.pos == tokens.len() {
        Some(value)
    } else {
        None
    }
}
