/// Runtime values.
///
/// Defines [`core::Value`], the closure type, truthiness, structural
/// equality, deep copying and the display format used by `print` and `str`.
pub mod core;

/// The fixed set of host-provided functions: `len`, `str`, `int`, `float`
/// and `print`.
pub mod builtin;
