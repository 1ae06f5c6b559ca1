//! Segment header writing

use std::io::{self, Write};

/// Writes the configured header as the first line of a segment
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderInjector;

impl HeaderInjector {
    /// Write `header` plus one line terminator. Returns bytes written.
    pub fn write<W: Write>(writer: &mut W, header: &str) -> io::Result<u64> {
        writer.write_all(header.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(Self::len(header))
    }

    /// Bytes a header occupies in the segment
    pub fn len(header: &str) -> u64 {
        header.len() as u64 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_header() {
        let mut buf = Vec::new();
        let written = HeaderInjector::write(&mut buf, "HDR").unwrap();
        assert_eq!(buf, b"HDR\n");
        assert_eq!(written, 4);
    }

    #[test]
    fn test_empty_header_is_a_blank_line() {
        let mut buf = Vec::new();
        HeaderInjector::write(&mut buf, "").unwrap();
        assert_eq!(buf, b"\n");
        assert_eq!(HeaderInjector::len(""), 1);
    }

    #[test]
    fn test_multibyte_header_length() {
        let header = "zeit,ereignis,größe";
        assert_eq!(HeaderInjector::len(header), header.len() as u64 + 1);
    }
}
