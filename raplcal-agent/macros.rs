//! Declarative macros for the name tables used across raplcal

/// Define a metric enum with automatic `name()` and `all()` implementations
///
/// # Example
/// ```
/// use raplcal::metric_enum;
///
/// metric_enum! {
///     pub enum Outcome {
///         Ok => "ok",
///         Unsupported => "unsupported",
///     }
/// }
///
/// let outcome = Outcome::Ok;
/// assert_eq!(outcome.name(), "ok");
/// assert_eq!(Outcome::all().len(), 2);
/// ```
///
/// Expands to:
/// - An enum with Debug, Clone, Copy, PartialEq, Eq, Hash derives
/// - A `name(&self) -> &'static str` method
/// - An `all() -> Vec<Self>` method
#[macro_export]
macro_rules! metric_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $str:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)*
        }

        impl $name {
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $str,)*
                }
            }

            pub fn all() -> Vec<$name> {
                vec![$($name::$variant,)*]
            }
        }
    };
}

/// Define an enum with name() and all() methods, plus custom data per variant
///
/// # Example
/// ```
/// use raplcal::enum_with_data;
///
/// enum_with_data! {
///     pub enum Domain: u32 {
///         Package => ("package", 0x611),
///         Dram => ("dram", 0x619),
///     }
///     impl address -> u32
/// }
///
/// let domain = Domain::Dram;
/// assert_eq!(domain.name(), "dram");
/// assert_eq!(domain.address(), 0x619);
/// ```
#[macro_export]
macro_rules! enum_with_data {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $data_type:ty {
            $($variant:ident => ($str:literal, $data:expr)),* $(,)?
        }
        impl $method:ident -> $return_type:ty
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)*
        }

        impl $name {
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $str,)*
                }
            }

            pub fn $method(&self) -> $return_type {
                match self {
                    $($name::$variant => $data,)*
                }
            }

            pub fn all() -> Vec<$name> {
                vec![$($name::$variant,)*]
            }
        }
    };
}
