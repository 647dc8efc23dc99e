//! Option Maps
//!
//! On the wire an option map is an object of boolean flags
//! (`{"trust": true, "corporation": false, ...}`). Inside the engine every
//! option map has a closed enum; decoding counts the `true` flags so the
//! "exactly one" rule is checked once, at the boundary.

use std::fmt;

use serde_json::{Map, Value};

use crate::document::Doc;

/// A closed set of option-map keys.
pub trait OptionKey: Copy + Eq + fmt::Debug + 'static {
    /// Every option in display order.
    const ALL: &'static [Self];

    /// Wire key of this option.
    fn key(&self) -> &'static str;

    /// Default option map: every flag false.
    fn empty_map() -> Value {
        let map: Map<String, Value> = Self::ALL
            .iter()
            .map(|o| (o.key().to_string(), Value::Bool(false)))
            .collect();
        Value::Object(map)
    }

    /// Option map with exactly `self` set.
    fn selected_map(&self) -> Value {
        let map: Map<String, Value> = Self::ALL
            .iter()
            .map(|o| (o.key().to_string(), Value::Bool(o == self)))
            .collect();
        Value::Object(map)
    }
}

/// Declare an option-map enum and its wire keys.
macro_rules! option_map {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $key:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::options::OptionKey for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn key(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }
    };
}

pub(crate) use option_map;

/// Decoded option map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<E> {
    Empty,
    One(E),
    Many(Vec<E>),
}

impl<E: OptionKey> Selection<E> {
    pub fn decode(node: Option<&Value>) -> Self {
        let mut chosen: Vec<E> = E::ALL
            .iter()
            .copied()
            .filter(|o| {
                node.and_then(|n| n.get(o.key()))
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
            })
            .collect();
        match chosen.len() {
            0 => Selection::Empty,
            1 => Selection::One(chosen.remove(0)),
            _ => Selection::Many(chosen),
        }
    }

    /// The single chosen option; `None` when empty or ambiguous.
    pub fn one(&self) -> Option<E> {
        match self {
            Selection::One(e) => Some(*e),
            _ => None,
        }
    }

    pub fn contains(&self, option: E) -> bool {
        match self {
            Selection::Empty => false,
            Selection::One(e) => *e == option,
            Selection::Many(all) => all.contains(&option),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Selection::Empty => 0,
            Selection::One(_) => 1,
            Selection::Many(all) => all.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }
}

impl<'a> Doc<'a> {
    /// Decode the option map at a dotted path.
    pub fn selection<E: OptionKey>(&self, dotted: &str) -> Selection<E> {
        Selection::decode(self.get(dotted))
    }

    /// The single chosen option at a dotted path.
    pub fn choice<E: OptionKey>(&self, dotted: &str) -> Option<E> {
        self.selection::<E>(dotted).one()
    }
}

option_map! {
    /// Generic yes/no question.
    pub enum YesNo {
        Yes => "yes",
        No => "no",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    option_map! {
        enum Colour {
            Red => "red",
            Green => "green",
            Blue => "blue",
        }
    }

    #[test]
    fn test_decode_counts_true_flags() {
        let none = json!({"red": false, "green": false, "blue": false});
        let one = json!({"red": false, "green": true, "blue": false});
        let two = json!({"red": true, "green": true, "blue": false});

        assert_eq!(Selection::<Colour>::decode(Some(&none)), Selection::Empty);
        assert_eq!(Selection::<Colour>::decode(Some(&one)), Selection::One(Colour::Green));
        assert_eq!(
            Selection::<Colour>::decode(Some(&two)),
            Selection::Many(vec![Colour::Red, Colour::Green])
        );
        assert_eq!(Selection::<Colour>::decode(Some(&two)).one(), None);
        assert_eq!(Selection::<Colour>::decode(None).count(), 0);
    }

    #[test]
    fn test_non_flag_siblings_are_ignored() {
        let map = json!({"red": true, "otherDetails": "crimson"});
        assert_eq!(Selection::<Colour>::decode(Some(&map)).one(), Some(Colour::Red));
    }

    #[test]
    fn test_generated_maps() {
        assert_eq!(
            Colour::empty_map(),
            json!({"red": false, "green": false, "blue": false})
        );
        assert_eq!(
            YesNo::No.selected_map(),
            json!({"yes": false, "no": true})
        );
    }
}
