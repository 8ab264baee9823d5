//! # Disposal scopes: ownership regions for subscriptions.
//!
//! Every subscription a handler creates is registered with the innermost
//! live scope and removed when that scope disposes. [`with_scope`] runs a
//! builder inside a fresh scope and returns both the builder's value and the
//! [`Scope`] handle; [`on_teardown`] registers a callback in the current
//! scope.
//!
//! ## Rules
//! - Teardowns run once, in reverse registration order (LIFO).
//! - [`Scope::dispose`] is idempotent.
//! - A scope built inside another scope is disposed with its parent.
//! - [`on_teardown`] outside any scope logs a warning and drops the
//!   callback: it would otherwise never run.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Teardown = Box<dyn FnOnce()>;

struct ScopeInner {
    teardowns: RefCell<Vec<Teardown>>,
    disposed: Cell<bool>,
}

impl ScopeInner {
    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let mut teardowns = self.teardowns.take();
        while let Some(teardown) = teardowns.pop() {
            teardown();
        }
    }
}

thread_local! {
    static SCOPE_STACK: RefCell<Vec<Rc<ScopeInner>>> = const { RefCell::new(Vec::new()) };
}

/// Handle to a disposal scope.
///
/// Dropping the handle does **not** dispose the scope; teardown is explicit
/// via [`Scope::dispose`] (or implicit through the parent scope).
pub struct Scope {
    inner: Rc<ScopeInner>,
}

impl Scope {
    /// Runs all teardowns registered during the build, newest first.
    ///
    /// Subsequent calls (including via a parent scope) are no-ops.
    pub fn dispose(self) {
        self.inner.dispose();
    }
}

/// Runs `build` inside a fresh scope.
///
/// Returns the builder's value together with the [`Scope`] handle that
/// disposes everything registered during the build. When called inside
/// another scope, the new scope is also registered as a teardown of its
/// parent, so disposing the parent disposes the child.
pub fn with_scope<T>(build: impl FnOnce() -> T) -> (T, Scope) {
    let inner = Rc::new(ScopeInner {
        teardowns: RefCell::new(Vec::new()),
        disposed: Cell::new(false),
    });

    SCOPE_STACK.with(|stack| {
        if let Some(parent) = stack.borrow().last() {
            let child = Rc::clone(&inner);
            parent
                .teardowns
                .borrow_mut()
                .push(Box::new(move || child.dispose()));
        }
        stack.borrow_mut().push(Rc::clone(&inner));
    });

    // Pop even if the builder panics, so the stack stays usable.
    struct StackGuard;
    impl Drop for StackGuard {
        fn drop(&mut self) {
            SCOPE_STACK.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }

    let value = {
        let _guard = StackGuard;
        build()
    };

    (value, Scope { inner })
}

/// Registers a teardown callback in the current scope.
///
/// Outside any scope the callback would never run, so it is dropped with a
/// warning instead.
pub fn on_teardown(teardown: impl FnOnce() + 'static) {
    let registered = SCOPE_STACK.with(|stack| {
        if let Some(scope) = stack.borrow().last() {
            scope.teardowns.borrow_mut().push(Box::new(teardown));
            true
        } else {
            false
        }
    });

    if !registered {
        log::warn!("teardown registered outside a scope; it will never run");
    }
}
