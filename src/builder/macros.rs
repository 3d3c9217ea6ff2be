//! Macros for ergonomic state type declarations.

/// Declare an enum and implement [`State`](crate::core::State) for it.
///
/// The variant table and names follow declaration order. Variants must be
/// fieldless.
///
/// # Example
///
/// ```
/// use stateflow::core::State;
/// use stateflow::state_enum;
///
/// state_enum! {
///     pub enum MenuState {
///         Closed,
///         Opening,
///         Open,
///     }
/// }
///
/// assert_eq!(MenuState::names(), vec!["Closed", "Opening", "Open"]);
/// assert_eq!(MenuState::Open.name(), "Open");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            const VARIANTS: &'static [Self] = &[$(Self::$variant),*];

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
