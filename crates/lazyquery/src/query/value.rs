//! Property types and values.
//!
//! Every property in a [`QueryDefinition`](super::QueryDefinition) declares a
//! [`PropertyType`]; items hold [`PropertyValue`]s for those properties.

use std::cmp::Ordering;
use std::fmt;

/// The declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// UTF-8 text.
    String,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point number.
    Float,
    /// Boolean flag.
    Bool,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A dynamically typed property value.
///
/// `None` stands for an absent value and is accepted by every property type.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropertyValue {
    /// No value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
}

impl PropertyValue {
    /// Returns `true` if this is `PropertyValue::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, PropertyValue::None)
    }

    /// Returns the type of the contained value, or `None` for an absent value.
    pub fn property_type(&self) -> Option<PropertyType> {
        match self {
            PropertyValue::None => None,
            PropertyValue::String(_) => Some(PropertyType::String),
            PropertyValue::Int(_) => Some(PropertyType::Int),
            PropertyValue::Float(_) => Some(PropertyType::Float),
            PropertyValue::Bool(_) => Some(PropertyType::Bool),
        }
    }

    /// Returns `true` if the value may be stored in a property of type `ty`.
    pub fn fits(&self, ty: PropertyType) -> bool {
        self.property_type().is_none_or(|own| own == ty)
    }

    /// Returns the value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(n) => Some(*n),
            PropertyValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Total order used for sorting.
    ///
    /// Absent values sort first, then booleans, numbers (integers and floats
    /// compared numerically) and finally strings.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        fn rank(value: &PropertyValue) -> u8 {
            match value {
                PropertyValue::None => 0,
                PropertyValue::Bool(_) => 1,
                PropertyValue::Int(_) | PropertyValue::Float(_) => 2,
                PropertyValue::String(_) => 3,
            }
        }

        match (self, other) {
            (PropertyValue::Bool(a), PropertyValue::Bool(b)) => a.cmp(b),
            (PropertyValue::Int(a), PropertyValue::Int(b)) => a.cmp(b),
            (PropertyValue::String(a), PropertyValue::String(b)) => a.cmp(b),
            (a, b) if rank(a) == 2 && rank(b) == 2 => {
                let (a, b) = (a.as_float().unwrap_or_default(), b.as_float().unwrap_or_default());
                a.total_cmp(&b)
            }
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Int(n)
    }
}

impl From<i32> for PropertyValue {
    fn from(n: i32) -> Self {
        PropertyValue::Int(n as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Float(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropertyValue::None, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits() {
        assert!(PropertyValue::from("a").fits(PropertyType::String));
        assert!(!PropertyValue::from(1).fits(PropertyType::String));
        assert!(PropertyValue::None.fits(PropertyType::Bool));
    }

    #[test]
    fn test_sort_cmp_mixed_numbers() {
        assert_eq!(PropertyValue::Int(2).sort_cmp(&PropertyValue::Float(1.5)), Ordering::Greater);
        assert_eq!(PropertyValue::Float(2.0).sort_cmp(&PropertyValue::Int(2)), Ordering::Equal);
    }

    #[test]
    fn test_sort_cmp_ranks() {
        let mut values = vec![
            PropertyValue::from("b"),
            PropertyValue::Int(3),
            PropertyValue::None,
            PropertyValue::Bool(true),
            PropertyValue::from("a"),
        ];
        values.sort_by(PropertyValue::sort_cmp);
        assert_eq!(
            values,
            vec![
                PropertyValue::None,
                PropertyValue::Bool(true),
                PropertyValue::Int(3),
                PropertyValue::from("a"),
                PropertyValue::from("b"),
            ]
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(PropertyValue::from(None::<i64>), PropertyValue::None);
        assert_eq!(PropertyValue::from(Some("x")), PropertyValue::from("x"));
    }
}
