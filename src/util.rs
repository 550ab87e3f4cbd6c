/// Numeric conversion helpers.
///
/// Conversions between `i64`, `usize` and `f64` that either succeed exactly
/// as the language defines them or report a `RuntimeError` carrying the line.
pub mod num;

/// Minimum stack space to keep available before recursing (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Stack space allocated each time the stack has to grow (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first growing the native stack if less than the red zone is
/// left.
///
/// Parsing and evaluation recurse once per nesting level of the source, so
/// every recursive entry point goes through here. The language-level call
/// depth limit then decides when a script has recursed too far, instead of
/// the host stack.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_recursion_grows_the_stack() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(100_000), 100_000);
    }
}
