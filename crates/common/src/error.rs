//! Context helpers shared by the media, voice and segment error types.
//!
//! Each crate keeps its own `thiserror` enum; this module only supplies the
//! `.context()` / `.with_context()` sugar that turns foreign failures (I/O,
//! subprocesses, decoders) into that enum's message variant.

/// An error type with a variant that carries a free-form message.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

/// `"{context}: {cause}"`, the shape every context message takes.
#[must_use]
pub fn contextual(context: &str, cause: &dyn std::fmt::Display) -> String {
    format!("{context}: {cause}")
}

/// Define a crate-local `Context` trait for `Result` and `Option`.
///
/// Expects `Error: FromMessage` and `Result<T>` to be in scope where it is
/// invoked, normally the crate's `error` module:
///
/// ```ignore
/// tessera_common::impl_context!();
///
/// let bytes = tokio::fs::read(path).await.with_context(|| format!("read {}", path.display()))?;
/// ```
#[macro_export]
macro_rules! impl_context {
    () => {
        pub trait Context<T> {
            fn context(self, context: impl Into<String>) -> Result<T>;

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                self.with_context(|| context)
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.map_err(|cause| {
                    let context: String = f().into();
                    let message = $crate::error::contextual(&context, &cause);
                    <Error as $crate::FromMessage>::from_message(message)
                })
            }
        }

        impl<T> Context<T> for Option<T> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                self.with_context(|| context)
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.ok_or_else(|| <Error as $crate::FromMessage>::from_message(f().into()))
            }
        }
    };
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use crate::FromMessage;

    #[derive(Debug, PartialEq)]
    enum Error {
        Lookup(String),
    }

    impl FromMessage for Error {
        fn from_message(message: String) -> Self {
            Self::Lookup(message)
        }
    }

    type Result<T> = std::result::Result<T, Error>;

    crate::impl_context!();

    #[test]
    fn result_context_prefixes_the_cause() {
        let res: std::result::Result<(), &str> = Err("no such member");
        let err = res.context("at 10001").unwrap_err();
        assert_eq!(err, Error::Lookup("at 10001: no such member".into()));
    }

    #[test]
    fn with_context_is_lazy() {
        let ok: std::result::Result<u8, &str> = Ok(1);
        let value = ok
            .with_context(|| -> String { panic!("context built for a success") })
            .unwrap();
        assert_eq!(value, 1);
    }

    #[test]
    fn option_context_is_the_whole_message() {
        let none: Option<u8> = None;
        let err = none.with_context(|| "city has no adcode").unwrap_err();
        assert_eq!(err, Error::Lookup("city has no adcode".into()));
    }
}
