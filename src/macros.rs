//! Macros for building actions and sequences.
//!
//! - `action!`: a plain action with a `type` and named fields
//! - `sequence!`: a (possibly nested) list ready to dispatch

/// Build a plain action.
///
/// Each `key: value` pair becomes a field; values can be anything that
/// converts into a [`Field`](crate::Field), including async values.
///
/// ```
/// use phunk::{action, async_value};
///
/// let got_user = action!("GOT_USER", user: async_value("user").unwrap());
/// assert!(got_user.field("user").is_some());
/// ```
#[macro_export]
macro_rules! action {
    ($kind:expr $(, $key:ident : $value:expr)* $(,)?) => {
        $crate::Element::action($kind)
            $(.with(stringify!($key), $value))*
    };
}

/// Build a list of elements to dispatch as one sequence.
///
/// Entries can be elements or nested `sequence!` lists; nesting is
/// flattened when the sequence is dispatched.
///
/// ```
/// use phunk::{action, sequence, Dispatch};
///
/// let list = sequence![action!("A"), sequence![action!("B"), action!("C")]];
/// assert_eq!(Dispatch::from(list).flatten().len(), 3);
/// ```
#[macro_export]
macro_rules! sequence {
    ($($item:expr),* $(,)?) => {
        ::std::vec![$($crate::Dispatch::from($item)),*]
    };
}
