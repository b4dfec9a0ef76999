//! Traits for enum-valued STAC properties.

/// A closed set of string values usable with enum fields.
///
/// Usually derived with `#[derive(StacEnum)]`, which also implements
/// `From<Self> for Literal` and `Display`. Each variant maps to the string
/// written into the filter document.
///
/// # Example
///
/// ```
/// use stacql::StacEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq, StacEnum)]
/// enum OrbitState {
///     Ascending,
///     Descending,
///     Geostationary,
/// }
///
/// assert_eq!(OrbitState::Ascending.as_str(), "ascending");
/// assert_eq!(OrbitState::VARIANTS.len(), 3);
/// ```
pub trait StacEnum: Copy + 'static {
    /// Every variant, in declaration order.
    const VARIANTS: &'static [Self];

    /// The string this variant stands for.
    fn as_str(&self) -> &'static str;

    /// Looks up a variant by its string value.
    fn from_str_value(value: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.as_str() == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Direction {
        Left,
        Right,
    }

    impl StacEnum for Direction {
        const VARIANTS: &'static [Self] = &[Direction::Left, Direction::Right];

        fn as_str(&self) -> &'static str {
            match self {
                Direction::Left => "left",
                Direction::Right => "right",
            }
        }
    }

    #[test]
    fn manual_impl() {
        assert_eq!(Direction::Left.as_str(), "left");
        assert_eq!(Direction::from_str_value("right"), Some(Direction::Right));
        assert_eq!(Direction::from_str_value("up"), None);
    }

    #[test]
    fn variants_feed_enum_kind() {
        let kind = crate::FieldKind::of_enum::<Direction>();
        assert_eq!(
            kind.enum_values().unwrap(),
            &["left".to_string(), "right".to_string()]
        );
    }
}
