use std::fmt;

/// The module a throw or catch site belongs to.
///
/// Scopes are explicit tokens rather than something recovered from the call
/// stack. Use [`scope!`](crate::scope) to get the scope of the current module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope(&'static str);

impl Scope {
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Expands to the [`Scope`] of the module the macro is invoked in.
#[macro_export]
macro_rules! scope {
    () => {
        $crate::Scope::new(::core::module_path!())
    };
}
