//! Tokenizer for rule conditions and value expressions.
//!
//! Fee rules carry their conditions and yield expressions as flat token
//! sequences (`ClaimCount GT 10`, `( A OR B ) AND C`, `100<EUR>`). Tokens
//! are plain strings; keywords and operators are recognized by the
//! consumers (condition extraction, expression evaluation), not here.

/// Split a rule fragment into tokens.
///
/// Whitespace separates tokens. Parentheses and commas are always
/// standalone tokens even when written without surrounding spaces.
/// Everything else stays intact, so currency literals (`100<EUR>`) and
/// ISO dates (`2024-01-31`) come out as single tokens.
pub fn tokenize(src: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in src.chars() {
        if c.is_whitespace() {
            flush(&mut current, &mut tokens);
            continue;
        }
        match c {
            '(' | ')' | ',' => {
                flush(&mut current, &mut tokens);
                tokens.push(c.to_string());
            }
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);

    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}
