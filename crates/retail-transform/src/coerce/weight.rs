//! Product weight normalization to kilograms.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use retail_model::{ProductRules, UnknownUnitPolicy};

/// Optional `N x` multipack prefix, a magnitude, then an optional unit token.
/// Whatever follows the unit must be punctuation or whitespace.
static WEIGHT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)\s*[xX]\s*)?(\d+(?:\.\d*)?|\.\d+)\s*([A-Za-z]*)([^A-Za-z0-9]*)$")
        .expect("Invalid weight regex")
});

/// Outcome of converting one raw weight.
#[derive(Debug, Clone, PartialEq)]
pub enum Weight {
    Kilograms(f64),
    /// The unit is not in the factor table. `kept` holds the magnitude when
    /// the policy keeps such values.
    UnknownUnit { unit: String, kept: Option<f64> },
    Unparseable,
}

impl Weight {
    pub fn kilograms(&self) -> Option<f64> {
        match self {
            Self::Kilograms(kg) => Some(*kg),
            Self::UnknownUnit { kept, .. } => *kept,
            Self::Unparseable => None,
        }
    }
}

/// Converts raw weight strings such as `77g`, `0.5ml`, `12 x 100g` to kilograms.
#[derive(Debug, Clone)]
pub struct WeightConverter {
    factors: BTreeMap<String, f64>,
    policy: UnknownUnitPolicy,
}

impl WeightConverter {
    pub fn new(factors: BTreeMap<String, f64>, policy: UnknownUnitPolicy) -> Self {
        Self { factors, policy }
    }

    pub fn from_rules(rules: &ProductRules) -> Self {
        Self::new(rules.unit_factors.clone(), rules.unknown_unit)
    }

    pub fn convert(&self, value: &str) -> Weight {
        let Some(caps) = WEIGHT_REGEX.captures(value.trim()) else {
            return Weight::Unparseable;
        };
        let count = match caps.get(1) {
            Some(count) => match count.as_str().parse::<f64>() {
                Ok(count) => count,
                Err(_) => return Weight::Unparseable,
            },
            None => 1.0,
        };
        let Some(magnitude) = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok()) else {
            return Weight::Unparseable;
        };
        let magnitude = count * magnitude;
        let unit = caps
            .get(3)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();

        // A bare number is already in kilograms.
        if unit.is_empty() {
            return Weight::Kilograms(magnitude);
        }
        match self.factors.get(&unit) {
            Some(factor) => Weight::Kilograms(magnitude * factor),
            None => Weight::UnknownUnit {
                unit,
                kept: match self.policy {
                    UnknownUnitPolicy::Keep => Some(magnitude),
                    UnknownUnitPolicy::Null => None,
                },
            },
        }
    }
}

/// Arithmetic mean of the present values, `None` when there are none.
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter(policy: UnknownUnitPolicy) -> WeightConverter {
        let factors = [("ml", 0.001), ("g", 0.001), ("kg", 1.0), ("k", 1.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        WeightConverter::new(factors, policy)
    }

    fn approx(weight: &Weight, expected: f64) -> bool {
        weight
            .kilograms()
            .is_some_and(|kg| (kg - expected).abs() < 1e-9)
    }

    #[test]
    fn test_units_convert_to_kilograms() {
        let c = converter(UnknownUnitPolicy::Null);
        assert!(approx(&c.convert("77g"), 0.077));
        assert!(approx(&c.convert("1kg"), 1.0));
        assert!(approx(&c.convert("500ml"), 0.5));
        assert!(approx(&c.convert("340 g"), 0.34));
        assert!(approx(&c.convert("2.5K"), 2.5));
    }

    #[test]
    fn test_trailing_junk_and_multipacks() {
        let c = converter(UnknownUnitPolicy::Null);
        assert!(approx(&c.convert("77g ."), 0.077));
        assert!(approx(&c.convert("12 x 100g"), 1.2));
        assert!(approx(&c.convert("3 X 2kg"), 6.0));
    }

    #[test]
    fn test_bare_numbers_are_kilograms() {
        let c = converter(UnknownUnitPolicy::Null);
        assert!(approx(&c.convert("0.077"), 0.077));
        assert!(approx(&c.convert("1"), 1.0));
    }

    #[test]
    fn test_unknown_unit_policy() {
        let null = converter(UnknownUnitPolicy::Null).convert("16oz");
        assert_eq!(
            null,
            Weight::UnknownUnit {
                unit: "oz".to_string(),
                kept: None
            }
        );
        let keep = converter(UnknownUnitPolicy::Keep).convert("16oz");
        assert_eq!(keep.kilograms(), Some(16.0));
    }

    #[test]
    fn test_garbage_is_unparseable() {
        let c = converter(UnknownUnitPolicy::Keep);
        assert_eq!(c.convert("9GO9NZ5JTL"), Weight::Unparseable);
        assert_eq!(c.convert(""), Weight::Unparseable);
        assert_eq!(c.convert("kg"), Weight::Unparseable);
    }

    #[test]
    fn test_mean_ignores_missing() {
        assert_eq!(mean(&[Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(mean(&[None, None]), None);
    }
}
