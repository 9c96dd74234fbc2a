//! line-clearing output.

use {
    crossterm::{
        queue,
        terminal::{Clear, ClearType},
    },
    std::io::{self, Write},
};

/// a writer that erases stale characters at the end of every line it writes.
///
/// each line feed passed to [`Write::write`] is preceded by a "clear until end of line"
/// sequence. when a frame is redrawn over a previous one, lines that became shorter lose
/// their leftover tail.
///
/// NB: only `\n` line endings are rewritten. text using `\r\n` or bare `\r` is passed
/// through, with undefined results on screen.
pub struct EscapeWriter<W> {
    inner: W,
    /// the number of line feeds that have been expanded.
    cleared: usize,
}

// === impl EscapeWriter ===

impl<W: Write> EscapeWriter<W> {
    const MARKER: u8 = b'\n';

    /// wraps the given writer.
    pub fn new(inner: W) -> Self {
        Self { inner, cleared: 0 }
    }

    /// returns the number of line feeds rewritten so far.
    pub fn cleared(&self) -> usize {
        self.cleared
    }

    /// returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for EscapeWriter<W> {
    /// writes `buf`, expanding line feeds.
    ///
    /// the returned length is always `buf.len()`; the injected escape sequences are not
    /// counted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Self { inner, cleared } = self;

        let mut lines = buf.split(|b| *b == Self::MARKER);
        if let Some(first) = lines.next() {
            inner.write_all(first)?;
        }
        for line in lines {
            queue!(inner, Clear(ClearType::UntilNewLine))?;
            inner.write_all(&[Self::MARKER])?;
            inner.write_all(line)?;
            *cleared += 1;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::testing::ansi};

    fn expand(input: &str) -> (usize, usize, String) {
        let mut out = Vec::<u8>::new();
        let mut writer = EscapeWriter::new(&mut out);
        let written = writer.write(input.as_bytes()).unwrap();
        let cleared = writer.cleared();
        (written, cleared, String::from_utf8(out).unwrap())
    }

    #[test]
    fn text_without_newlines_passes_through() {
        for input in ["", "a", "hello world", "\x1b[1mbold\x1b[0m", "tab\tseparated"] {
            let (written, cleared, out) = expand(input);
            assert_eq!(written, input.len());
            assert_eq!(cleared, 0);
            assert_eq!(out, input);
        }
    }

    #[test]
    fn newlines_are_preceded_by_a_line_clear() {
        let el = ansi(Clear(ClearType::UntilNewLine));
        let (written, cleared, out) = expand("one\ntwo\n");
        assert_eq!(written, 8);
        assert_eq!(cleared, 2);
        assert_eq!(out, format!("one{el}\ntwo{el}\n"));
    }

    #[test]
    fn emitted_length_grows_by_the_expansion_per_marker() {
        let expansion = ansi(Clear(ClearType::UntilNewLine)).len();
        for (input, k) in [("\n", 1), ("a\nb", 1), ("\n\n\n", 3), ("x\ny\nz\n", 3)] {
            let (written, cleared, out) = expand(input);
            assert_eq!(written, input.len(), "{input:?}");
            assert_eq!(cleared, k, "{input:?}");
            assert_eq!(out.len(), input.len() + k * expansion, "{input:?}");
        }
    }

    #[test]
    fn carriage_returns_are_left_alone() {
        let el = ansi(Clear(ClearType::UntilNewLine));
        let (_, cleared, out) = expand("a\r\nb\r");
        assert_eq!(cleared, 1);
        assert_eq!(out, format!("a\r{el}\nb\r"));
    }

    #[test]
    fn formatted_writes_count_every_line() {
        let mut writer = EscapeWriter::new(Vec::new());
        writeln!(writer, "first").unwrap();
        writeln!(writer, "{}", "second").unwrap();
        assert_eq!(writer.cleared(), 2);

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert!(out.starts_with("first"));
        assert!(out.contains("second"));
    }
}
