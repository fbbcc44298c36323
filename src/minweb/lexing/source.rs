//! Named character sources

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// An owned input stream of characters with a human-readable name.
///
/// Sources are read to completion when they are created, so scanning never blocks. Once
/// a source is exhausted it keeps reporting end of input.
pub struct InputSource {
    name: String,
    chars: std::vec::IntoIter<char>,
}

impl InputSource {
    pub fn from_string(name: impl Into<String>, text: impl AsRef<str>) -> Self {
        InputSource {
            name: name.into(),
            chars: text.as_ref().chars().collect::<Vec<_>>().into_iter(),
        }
    }

    /// Read everything from `reader`. The bytes must be valid UTF-8.
    pub fn from_reader(name: impl Into<String>, mut reader: impl Read) -> io::Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::from_string(name, text))
    }

    /// Open a file. The source is named after the path exactly as given.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Ok(Self::from_string(path.display().to_string(), text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn next_char(&mut self) -> Option<char> {
        self.chars.next()
    }
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSource")
            .field("name", &self.name)
            .field("remaining", &self.chars.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_source_stays_exhausted() {
        let mut source = InputSource::from_string("s", "ab");
        assert_eq!(source.next_char(), Some('a'));
        assert_eq!(source.next_char(), Some('b'));
        assert_eq!(source.next_char(), None);
        assert_eq!(source.next_char(), None);
    }

    #[test]
    fn test_from_reader_rejects_invalid_utf8() {
        let bytes: &[u8] = &[0x66, 0xff, 0x6f];
        assert!(InputSource::from_reader("bad", bytes).is_err());
    }

    #[test]
    fn test_from_reader_keeps_multibyte_characters() {
        let mut source = InputSource::from_reader("utf8", "é<".as_bytes()).unwrap();
        assert_eq!(source.name(), "utf8");
        assert_eq!(source.next_char(), Some('é'));
        assert_eq!(source.next_char(), Some('<'));
    }
}
