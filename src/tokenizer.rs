//! Line tokenizer for delimited spreadsheet exports
//!
//! Splits one logical line into ordered field values, honoring quoting.
//! The exports this crate ingests are human-maintained, so the tokenizer is
//! deliberately permissive: an unterminated quote swallows the rest of the
//! line instead of raising an error, and stray text after a closing quote is
//! appended to the field.

/// Default field delimiter for exports.
pub const DEFAULT_DELIMITER: char = ',';

/// Default quote character for exports.
pub const DEFAULT_QUOTE: char = '"';

/// Split a single line into ordered fields.
///
/// Quoting rules:
/// - a quote is only significant at the start of a field;
/// - inside a quoted field, the delimiter is not a field boundary;
/// - a doubled quote inside a quoted field yields one literal quote;
/// - an unterminated quote runs to the end of the line.
///
/// Fields are returned verbatim, without trimming; consumers normalize
/// where they match. An empty line yields one empty field.
pub fn tokenize_line(line: &str, delimiter: char, quote: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;
    let mut at_field_start = true;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == quote {
                if chars.peek() == Some(&quote) {
                    chars.next();
                    field.push(quote);
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == quote && at_field_start {
            in_quotes = true;
            at_field_start = false;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut field));
            at_field_start = true;
        } else {
            field.push(c);
            at_field_start = false;
        }
    }

    fields.push(field);
    fields
}
