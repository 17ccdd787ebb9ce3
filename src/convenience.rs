//! Construction macros.
//!
//! # Usage
//!
//! ```rust
//! use tagged_errors::errorf;
//!
//! let user = "ann";
//! let err = errorf!("auth#a3: unknown user %s", user);
//! assert_eq!(err.to_string(), "auth#a3: unknown user ann");
//! ```
//!
//! ```rust
//! use tagged_errors::{errorf, Error};
//! use std::io;
//!
//! // `%w` takes the argument as the cause
//! let err = errorf!("cfg: cannot read %s: %w", "app.toml", io::Error::other("denied"));
//! assert!(err.cause().is_some());
//! ```
//!
//! # Argument Kinds
//!
//! Every argument is classified when the macro expands:
//!
//! - values implementing `std::error::Error + Send + Sync + 'static` are kept
//!   as errors, so they can become the cause when they sit under `%w`
//! - `Box<dyn Error + Send + Sync>` is kept as an error as well
//! - references, including references to errors, are rendered
//! - anything else implementing `Display` is rendered to a string right away
//!
//! A cause is always owned: pass the error by value to wrap it, by reference
//! to only mention it.
//!
//! # Call Sites
//!
//! - [`errorf!`](crate::errorf) records `file!()`, `line!()` and the
//!   enclosing function where it is written. The file is made absolute
//!   against the calling crate's `CARGO_MANIFEST_DIR` when cargo sets it
//! - [`tracef!`](crate::tracef) takes a depth and walks the stack instead,
//!   for helpers that want to report *their* caller

/// Create an [`Error`](crate::Error) from a template and arguments, recording
/// the call site at compile time.
///
/// ```rust
/// # use tagged_errors::errorf;
/// let err = errorf!("%s#%s: invalid %s", "email", "h45", "username");
/// assert_eq!(err.tag(), "email");
/// assert_eq!(err.code(), "h45");
/// assert_eq!(err.message(), "invalid username");
/// assert_eq!(err.line(), line!() - 4);
/// ```
#[macro_export]
macro_rules! errorf {
    ($template:expr $(, $arg:expr)* $(,)?) => {
        $crate::Error::with_trace(
            $crate::Trace::from_source(
                ::core::option_env!("CARGO_MANIFEST_DIR"),
                ::core::file!(),
                ::core::line!(),
                $crate::__function_path!(),
            ),
            $template,
            ::std::vec![$($crate::__arg!($arg)),*],
        )
    };
}

/// Create an [`Error`](crate::Error) attributed to the frame `depth` levels
/// above the macro's location.
///
/// `tracef!(1, …)` reports the function containing the macro. A helper that
/// builds errors for its caller uses `2`:
///
/// ```rust
/// use tagged_errors::{tracef, Error};
///
/// #[inline(never)]
/// fn invalid(field: &str) -> Error {
///     tracef!(2, "validation#v1: invalid %s", field)
/// }
///
/// let err = invalid("email");
/// assert_eq!(err.message(), "invalid email");
/// // With symbols available, the trace names this function, not `invalid`.
/// ```
#[macro_export]
macro_rules! tracef {
    ($depth:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::Error::traced(
            $depth,
            $template,
            ::std::vec![$($crate::__arg!($arg)),*],
        )
    };
}

/// Fully qualified path of the function the macro is expanded in.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_path {
    () => {{
        fn __here() {}
        let name: &'static str = ::std::any::type_name_of_val(&__here);
        match name.strip_suffix("::__here") {
            ::core::option::Option::Some(path) => path,
            ::core::option::Option::None => name,
        }
    }};
}

/// Classify one macro argument into an [`Arg`](crate::Arg).
#[doc(hidden)]
#[macro_export]
macro_rules! __arg {
    ($arg:expr) => {
        match $arg {
            arg => {
                #[allow(unused_imports)]
                use $crate::__private::{AdhocKind as _, BoxedKind as _, RefKind as _, TraitKind as _};
                (&&&$crate::__private::wrap(&arg)).__arg_kind().into_arg(arg)
            }
        }
    };
}

/// Autoref dispatch behind [`__arg!`](crate::__arg).
///
/// The receiver is `&&&Wrap<T>` where `T` is the exact argument type. Method
/// lookup peels one reference per step, so the impls are tried in order:
///
/// 1. [`RefKind`] on `&&Wrap<&T>`: any borrowed `T: Display`, errors included,
///    is rendered
/// 2. [`TraitKind`] on `&Wrap<E>` when `E: Error + Send + Sync + 'static`, and
///    [`BoxedKind`] on `&Wrap<Box<dyn Error + Send + Sync>>`
/// 3. [`AdhocKind`] on `Wrap<T>` when `T: Display`
///
/// `Wrap` keeps `T` from absorbing the outer references, so each impl only
/// matches at its own step.
#[doc(hidden)]
pub mod kind {
    use crate::{Arg, BoxError};
    use std::error::Error as StdError;
    use std::fmt::Display;
    use std::marker::PhantomData;

    pub struct Wrap<T>(PhantomData<T>);

    #[inline]
    pub fn wrap<T>(_: &T) -> Wrap<T> {
        Wrap(PhantomData)
    }

    pub struct Adhoc;

    impl Adhoc {
        #[inline]
        pub fn into_arg<T: Display>(self, value: T) -> Arg {
            Arg::display(value)
        }
    }

    pub trait RefKind {
        #[inline]
        fn __arg_kind(&self) -> Adhoc {
            Adhoc
        }
    }

    impl<T> RefKind for &&Wrap<&T> where T: ?Sized + Display {}

    pub struct Trait;

    pub trait TraitKind {
        #[inline]
        fn __arg_kind(&self) -> Trait {
            Trait
        }
    }

    impl<E> TraitKind for &Wrap<E> where E: StdError + Send + Sync + 'static {}

    impl Trait {
        #[inline]
        pub fn into_arg<E>(self, error: E) -> Arg
        where
            E: StdError + Send + Sync + 'static,
        {
            Arg::error(error)
        }
    }

    pub struct Boxed;

    pub trait BoxedKind {
        #[inline]
        fn __arg_kind(&self) -> Boxed {
            Boxed
        }
    }

    impl BoxedKind for &Wrap<BoxError> {}

    impl Boxed {
        #[inline]
        pub fn into_arg(self, error: BoxError) -> Arg {
            Arg::Error(error)
        }
    }

    pub trait AdhocKind {
        #[inline]
        fn __arg_kind(&self) -> Adhoc {
            Adhoc
        }
    }

    impl<T> AdhocKind for Wrap<T> where T: Display {}
}
