//! Macro for implementing string conversions for stored enums
//!
//! Enums persisted as TEXT columns (check status, weekday, frequency kind)
//! need the same three conversions: a stable `as_str`, `Display`, and a
//! case-insensitive `FromStr`.
//!
//! # Example
//!
//! ```rust
//! use routinely_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Shade {
//!     Light,
//!     Dark,
//! }
//!
//! impl_domain_status_conversions!(Shade {
//!     Light => "light",
//!     Dark => "dark",
//! });
//!
//! assert_eq!(Shade::Dark.as_str(), "dark");
//! assert_eq!("LIGHT".parse::<Shade>().unwrap(), Shade::Light);
//! ```

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their stored,
///   lowercase string representation
///
/// Parsing is case-insensitive; the error names the enum and the rejected
/// input.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Stored string representation.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
