//! Line splitting shared by the SCL and KBM readers.

/// Iterator over the lines of a text blob, independent of line ending.
///
/// `\n`, `\r\n` and a lone `\r` all end a line and may be mixed in one document. A
/// terminator at the very end does not produce an extra empty line. Items are
/// `(line_number, line)` with 1-based numbers and surrounding spaces/tabs trimmed.
pub(crate) struct LogicalLines<'a> {
    rest: &'a str,
    lineno: usize,
}

pub(crate) fn logical_lines(text: &str) -> LogicalLines<'_> {
    LogicalLines {
        rest: text,
        lineno: 0,
    }
}

impl<'a> Iterator for LogicalLines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let (line, rest) = match self.rest.find(['\n', '\r']) {
            Some(end) => {
                let skip = if self.rest[end..].starts_with("\r\n") {
                    2
                } else {
                    1
                };
                (&self.rest[..end], &self.rest[end + skip..])
            }
            None => (self.rest, ""),
        };

        self.rest = rest;
        self.lineno += 1;
        Some((self.lineno, line.trim_matches([' ', '\t'])))
    }
}
