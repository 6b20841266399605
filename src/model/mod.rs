//! Model orchestration and the step-advance protocol.
//!
//! The model owns one parameter store, one clock, and a handle to the
//! simulation kernel. Callers build a store (optionally overriding values),
//! construct a model from it, then repeatedly step; between steps they may
//! read any parameter and mutate the runtime-mutable subset. Each completed
//! step produces a fresh [`ResultSnapshot`].

mod results;
mod runtime;

#[cfg(test)]
mod tests;

pub use results::ResultSnapshot;
pub use runtime::Model;
