// In-memory terminal output for view and event-loop tests

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use super::view::TerminalView;
use crate::services::notification::NotificationService;

#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A view writing into a buffer, with desktop notifications off.
pub fn buffered_view() -> (TerminalView, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let view = TerminalView::new(Box::new(buffer.clone()), NotificationService::new(false));
    (view, buffer)
}
