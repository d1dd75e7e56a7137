/// Escapes the five HTML special characters so user text can be embedded in markup.
/// Single quotes become `&#039;`.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Drops every character that cannot appear in an email address.
/// Keeps ASCII letters, digits and ``!#$%&'*+-=?^_`{|}~@.[]``. Does not validate.
pub fn sanitize_email(input: &str) -> String {
    input.chars().filter(|c| is_email_char(*c)).collect()
}

fn is_email_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-=?^_`{|}~@.[]".contains(c)
}
