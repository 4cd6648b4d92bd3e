//! Context scopes (§4.12): thread-local "active basis / basis graph /
//! conversion graph" stacks with RAII-guard entry/exit.
//!
//! Grounded on `examples/original_source/ucon/basis.py`'s
//! `using_basis`/`using_basis_graph` and `ucon/graph.py`'s `using_graph` —
//! Python's `contextvars.ContextVar` plus a `try/finally` context manager is
//! realized here as a `thread_local!` `RefCell<Vec<T>>` stack per scope
//! kind, popped by a guard's `Drop` impl so the previous value is restored
//! on every exit path, panics included.

use std::cell::RefCell;
use std::rc::Rc;

use crate::basis::Basis;
use crate::basis_graph::BasisGraph;
use crate::graph::ConversionGraph;
use crate::standard;

thread_local! {
    static BASIS_STACK: RefCell<Vec<Basis>> = RefCell::new(vec![standard::si_basis()]);
    static BASIS_GRAPH_STACK: RefCell<Vec<Rc<BasisGraph>>> =
        RefCell::new(vec![Rc::new(standard::basis_graph())]);
    static CONVERSION_GRAPH_STACK: RefCell<Vec<Rc<ConversionGraph>>> =
        RefCell::new(vec![Rc::new(standard::conversion_graph())]);
}

/// Returns the currently active basis (default: SI).
pub fn current_basis() -> Basis {
    BASIS_STACK.with(|stack| stack.borrow().last().expect("basis stack is never empty").clone())
}

/// Returns the currently active basis graph (default: SI/CGS/CGS-ESU).
pub fn current_basis_graph() -> Rc<BasisGraph> {
    BASIS_GRAPH_STACK.with(|stack| {
        stack
            .borrow()
            .last()
            .expect("basis graph stack is never empty")
            .clone()
    })
}

/// Returns the currently active conversion graph (default: the standard
/// catalog). This also serves as the parsing graph (§4.12).
pub fn current_conversion_graph() -> Rc<ConversionGraph> {
    CONVERSION_GRAPH_STACK.with(|stack| {
        stack
            .borrow()
            .last()
            .expect("conversion graph stack is never empty")
            .clone()
    })
}

/// Pushes `basis` as the active basis until the returned guard is dropped.
pub fn using_basis(basis: Basis) -> BasisScope {
    BASIS_STACK.with(|stack| stack.borrow_mut().push(basis));
    BasisScope { _private: () }
}

pub fn using_basis_graph(graph: BasisGraph) -> BasisGraphScope {
    BASIS_GRAPH_STACK.with(|stack| stack.borrow_mut().push(Rc::new(graph)));
    BasisGraphScope { _private: () }
}

pub fn using_conversion_graph(graph: ConversionGraph) -> ConversionGraphScope {
    CONVERSION_GRAPH_STACK.with(|stack| stack.borrow_mut().push(Rc::new(graph)));
    ConversionGraphScope { _private: () }
}

/// RAII guard restoring the previous active basis on drop. Scopes nest
/// arbitrarily; dropping guards out of LIFO order still pops correctly
/// since each guard only ever pops the top of the stack.
pub struct BasisScope {
    _private: (),
}

impl Drop for BasisScope {
    fn drop(&mut self) {
        BASIS_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

pub struct BasisGraphScope {
    _private: (),
}

impl Drop for BasisGraphScope {
    fn drop(&mut self) {
        BASIS_GRAPH_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

pub struct ConversionGraphScope {
    _private: (),
}

impl Drop for ConversionGraphScope {
    fn drop(&mut self) {
        CONVERSION_GRAPH_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::BasisComponent;

    #[test]
    fn scope_restores_previous_basis_on_drop() {
        let default_name = current_basis().name().to_string();
        {
            let custom = Basis::new("custom", vec![BasisComponent::new("x", Some("x"))]).unwrap();
            let _guard = using_basis(custom.clone());
            assert_eq!(current_basis().name(), "custom");
        }
        assert_eq!(current_basis().name(), default_name);
    }

    #[test]
    fn scopes_nest() {
        let a = Basis::new("a", vec![BasisComponent::new("x", Some("x"))]).unwrap();
        let b = Basis::new("b", vec![BasisComponent::new("y", Some("y"))]).unwrap();
        let _outer = using_basis(a);
        assert_eq!(current_basis().name(), "a");
        {
            let _inner = using_basis(b);
            assert_eq!(current_basis().name(), "b");
        }
        assert_eq!(current_basis().name(), "a");
    }
}
