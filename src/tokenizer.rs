/// Splits one raw command line into tokens.
///
/// Unquoted spaces separate tokens. A double quote toggles quoted mode, in
/// which spaces are kept; the quote characters themselves are never part of
/// the output. Tokens are trimmed and empty tokens are dropped.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut inside_quote = false;

    for symbol in line.chars() {
        match symbol {
            '"' => inside_quote = !inside_quote,
            ' ' if !inside_quote => push_token(&mut tokens, &mut current),
            _ => current.push(symbol),
        }
    }

    push_token(&mut tokens, &mut current);

    tokens
}

fn push_token(tokens: &mut Vec<String>, current: &mut String) {
    let token = current.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
    current.clear();
}
