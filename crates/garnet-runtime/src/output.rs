//! Output sink for script side effects
//!
//! `puts`, `print`, `p` and the banner functions write here. The sink is
//! either the process stdout or an in-memory buffer the host can read back.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Where a state writes its output
#[derive(Debug, Clone)]
pub enum Output {
    Stdout,
    Buffer(OutputBuffer),
}

impl Output {
    /// New in-memory sink
    pub fn buffer() -> Self {
        Output::Buffer(OutputBuffer::default())
    }

    /// Write text and flush so output interleaves with the host's own prints
    pub fn write_str(&self, text: &str) -> io::Result<()> {
        match self {
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes())?;
                stdout.flush()
            }
            Output::Buffer(buffer) => {
                buffer.0.borrow_mut().extend_from_slice(text.as_bytes());
                Ok(())
            }
        }
    }
}

/// Shared handle to captured output
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer(Rc<RefCell<Vec<u8>>>);

impl OutputBuffer {
    /// Everything captured so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Return and clear captured output
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_captures_in_order() {
        let buffer = OutputBuffer::default();
        let output = Output::Buffer(buffer.clone());
        output.write_str("a\n").unwrap();
        output.write_str("b").unwrap();
        assert_eq!(buffer.contents(), "a\nb");
        assert_eq!(buffer.take(), "a\nb");
        assert!(buffer.is_empty());
    }
}
