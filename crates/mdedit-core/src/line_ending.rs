//! Line ending helpers.
//!
//! Every markdown transformation in this crate assumes LF (`'\n'`) newlines. Text captured from a
//! surface may still carry CRLF (`"\r\n"`) or lone CR (`'\r'`) sequences, so command regions are
//! normalized before a command inspects them.

use std::borrow::Cow;

/// Convert CRLF and lone CR newlines to LF.
///
/// Borrows the input when it contains no carriage return.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}
