pub trait Apply: Sized {
    /// Applies `f` to a mutable reference of `self` and returns the result.
    fn with<X>(mut self, f: impl FnOnce(&mut Self) -> X) -> Self {
        f(&mut self);
        self
    }

    /// Passes `self` through `f` only if `value` is `Some(...)`.
    ///
    /// Useful for optional steps in builder chains.
    ///
    /// #### Example
    /// ```rust
    /// # use folio_utils::Apply;
    /// fn greeting(name: Option<&str>) -> String {
    ///     String::from("Hello").apply_map(name, |s, name| format!("{s}, {name}"))
    /// }
    /// assert_eq!(greeting(None), "Hello");
    /// assert_eq!(greeting(Some("Al")), "Hello, Al");
    /// ```
    fn apply_map<U>(self, value: Option<U>, f: impl FnOnce(Self, U) -> Self) -> Self {
        match value {
            Some(value) => f(self, value),
            None => self,
        }
    }
}

impl<T> Apply for T {}

/// Asserts that an expression matches a pattern, printing the value on failure.
#[macro_export]
macro_rules! assert_matches {
    ($expr:expr, $pat:pat) => {
        match ($expr) {
            $pat => (),
            val => ::core::panic!(
                "Assertion failed: Value {val:?} did not match pattern {}",
                ::core::stringify!($pat)
            ),
        }
    };
    ($expr:expr, $pat:pat if $pred:expr) => {{
        let val = $expr;
        match (&val) {
            $pat if $pred => (),
            _ => ::core::panic!(
                "Assertion failed: Value {val:?} did not match {} if {}",
                ::core::stringify!($pat),
                ::core::stringify!($pred)
            ),
        }
    }};
}
