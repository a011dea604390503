//! External resource-identifier host-service contracts.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

/// Object-safe boxed future used by [`ExternalUrnService`].
pub type ExternalUrnFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service for opening URNs/URLs (`tel:`, `geo:`, `https:`, ...) outside the application.
pub trait ExternalUrnService {
    /// Navigates to `urn` using the host's external navigation mechanism.
    fn open_urn<'a>(&'a self, urn: &'a str) -> ExternalUrnFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op external URN service for unsupported targets.
pub struct NoopExternalUrnService;

impl ExternalUrnService for NoopExternalUrnService {
    fn open_urn<'a>(&'a self, _urn: &'a str) -> ExternalUrnFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// Recording external URN service. Clones share the same log.
pub struct MemoryExternalUrnService {
    opened: Rc<RefCell<Vec<String>>>,
}

impl MemoryExternalUrnService {
    /// Returns every URN opened so far.
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl ExternalUrnService for MemoryExternalUrnService {
    fn open_urn<'a>(&'a self, urn: &'a str) -> ExternalUrnFuture<'a, Result<(), String>> {
        Box::pin(async move {
            if urn.trim().is_empty() {
                return Err("cannot open an empty URN".to_string());
            }
            self.opened.borrow_mut().push(urn.to_string());
            Ok(())
        })
    }
}
