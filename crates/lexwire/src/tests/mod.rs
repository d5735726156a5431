//! Crate-level shared fixtures and behaviour tests.

pub(crate) mod support;
