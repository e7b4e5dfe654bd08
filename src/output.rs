use bytes::{BufMut, BytesMut};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// An in‑memory `print` sink.  Clones share the same buffer, so one handle
/// can be given to the interpreter while another reads the output back.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Rc<RefCell<BytesMut>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, decoded lossily.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.borrow()).into_owned()
    }

    /// Written output split into lines, without the trailing newline.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Drain the buffer, returning what it held.
    pub fn take(&self) -> String {
        let bytes = self.inner.borrow_mut().split();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.borrow_mut().put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
