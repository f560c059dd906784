//! Color stacking order.
//!
//! Colors are stitched one after another, so later colors sit on top of
//! earlier ones. A stacking policy only reorders whole colors: the routed
//! order of shapes inside a color is the stitch path and never changes.

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::shapes::ColorGroups;

/// How merged color groups are ordered before emission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackingPolicy {
    /// Keep generation order (warp colors first, in pallet order)
    #[default]
    Pallet,
    /// Largest total fill area first, so narrow stripes end up on top
    LargestFirst,
    /// Listed colors first, in list order; the rest keep generation order
    Custom(Vec<String>),
}

impl StackingPolicy {
    /// Get policy name as string.
    pub fn name(&self) -> &'static str {
        match self {
            StackingPolicy::Pallet => "pallet",
            StackingPolicy::LargestFirst => "largest_first",
            StackingPolicy::Custom(_) => "custom",
        }
    }

    /// Parse policy from string.
    ///
    /// Custom orders are written as `custom:red,#00ff00,blue`.
    pub fn from_name(name: &str) -> Option<StackingPolicy> {
        let name = name.trim();
        if let Some((kind, colors)) = name.split_once(':') {
            if !kind.eq_ignore_ascii_case("custom") {
                return None;
            }
            let colors = colors
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
            return Some(StackingPolicy::Custom(colors));
        }

        match name.to_lowercase().as_str() {
            "pallet" | "palette" | "generation" => Some(StackingPolicy::Pallet),
            "largest_first" | "largest" | "area" => Some(StackingPolicy::LargestFirst),
            "custom" => Some(StackingPolicy::Custom(Vec::new())),
            _ => None,
        }
    }

    /// Reorder color groups in place. The sort is stable.
    pub fn apply(&self, groups: &mut ColorGroups) {
        match self {
            StackingPolicy::Pallet => {}
            StackingPolicy::LargestFirst => {
                groups.sort_by(|_, a, _, b| b.fill_area().total_cmp(&a.fill_area()));
            }
            StackingPolicy::Custom(order) => {
                let rank = |color: &String| order.iter().position(|c| c == color).unwrap_or(order.len());
                groups.sort_by(|a, _, b, _| rank(a).cmp(&rank(b)));
            }
        }
    }
}

/// Accepts either a policy name (see [`StackingPolicy::from_name`]) or the
/// derived enum representation.
pub(crate) fn deserialize_policy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StackingPolicy, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Name(String),
        Policy(StackingPolicy),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Name(name) => StackingPolicy::from_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown stacking policy: {}", name))),
        Repr::Policy(policy) => Ok(policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{LineString, Point, Polygon};
    use crate::shapes::{ColorGroup, Direction, RoutedShape};

    fn group_with_area(side: f64) -> ColorGroup {
        let polygon = Polygon::rect(0.0, 0.0, side, side);
        let start = Point::new(0.0, 0.0);
        ColorGroup {
            fills: vec![RoutedShape::fill(polygon, start, start, Direction::Warp)],
            strokes: vec![],
        }
    }

    fn groups() -> ColorGroups {
        let mut groups = ColorGroups::new();
        groups.insert("small".into(), group_with_area(1.0));
        groups.insert("large".into(), group_with_area(10.0));
        groups.insert("medium".into(), group_with_area(5.0));
        groups
    }

    fn colors(groups: &ColorGroups) -> Vec<&str> {
        groups.keys().map(String::as_str).collect()
    }

    #[test]
    fn pallet_keeps_generation_order() {
        let mut g = groups();
        StackingPolicy::Pallet.apply(&mut g);
        assert_eq!(colors(&g), vec!["small", "large", "medium"]);
    }

    #[test]
    fn largest_first_sorts_by_fill_area() {
        let mut g = groups();
        StackingPolicy::LargestFirst.apply(&mut g);
        assert_eq!(colors(&g), vec!["large", "medium", "small"]);
    }

    #[test]
    fn custom_puts_listed_colors_first() {
        let mut g = groups();
        StackingPolicy::Custom(vec!["medium".into(), "nonexistent".into()]).apply(&mut g);
        assert_eq!(colors(&g), vec!["medium", "small", "large"]);
    }

    #[test]
    fn shapes_inside_a_color_keep_their_order() {
        let mut g = groups();
        let travel = RoutedShape::travel(
            LineString::segment(Point::new(0.0, 0.0), Point::new(0.0, 9.0)),
            Direction::Warp,
        );
        g["small"].fills.push(travel.clone());
        g["small"].fills.push(group_with_area(2.0).fills.remove(0));

        let before = g["small"].clone();
        StackingPolicy::LargestFirst.apply(&mut g);
        assert_eq!(g["small"], before);
        assert_eq!(g["small"].fills[1], travel);
    }

    #[test]
    fn policy_parsing() {
        assert_eq!(StackingPolicy::from_name("pallet"), Some(StackingPolicy::Pallet));
        assert_eq!(StackingPolicy::from_name("Largest"), Some(StackingPolicy::LargestFirst));
        assert_eq!(
            StackingPolicy::from_name("custom: red, blue"),
            Some(StackingPolicy::Custom(vec!["red".into(), "blue".into()]))
        );
        assert_eq!(StackingPolicy::from_name("invalid"), None);
        assert_eq!(StackingPolicy::from_name("other:red"), None);
        assert_eq!(StackingPolicy::LargestFirst.name(), "largest_first");
    }
}
