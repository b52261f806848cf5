use std::{cell::Cell, fmt::Display};

/// Represents a trait responsible for handling diagnostics in the compiler.
pub trait Handler<T> {
    /// Receive an error and handles it.
    fn receive(&self, error: T);
}

/// A handler that prints every received error to stderr and remembers that it did.
#[derive(Debug, Default)]
pub struct PrintHandler {
    printed: Cell<bool>,
}

impl PrintHandler {
    /// Create a new print handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether at least one error has been printed.
    #[must_use]
    pub fn has_printed(&self) -> bool {
        self.printed.get()
    }
}

impl<E: Display> Handler<E> for PrintHandler {
    fn receive(&self, error: E) {
        eprintln!("{error}");
        self.printed.set(true);
    }
}

/// A handler that discards the error output but remembers that errors occurred.
#[derive(Debug, Default)]
pub struct SilentHandler {
    received: Cell<bool>,
}

impl SilentHandler {
    /// Create a new silent handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether at least one error has been received.
    #[must_use]
    pub fn has_received(&self) -> bool {
        self.received.get()
    }
}

impl<E> Handler<E> for SilentHandler {
    fn receive(&self, _error: E) {
        self.received.set(true);
    }
}

/// A handler that ignores every received error.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidHandler;

impl<E> Handler<E> for VoidHandler {
    fn receive(&self, _error: E) {}
}
