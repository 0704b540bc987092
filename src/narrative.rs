use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attribution::ContributionVector;

/// How explanation lines are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeOrder {
    /// Form layout order, which is also the feature schema order
    #[default]
    Schema,
    /// Largest absolute contribution first; ties keep schema order
    Magnitude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increased,
    Decreased,
}

/// One sentence of the explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeLine {
    pub feature: String,
    pub value: f32,
    pub direction: Direction,
    /// Absolute size of the contribution
    pub amount: f64,
}

impl fmt::Display for NarrativeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.direction {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
        };
        write!(
            f,
            "- {} ({:.2}) {} risk by {:.2}",
            self.feature, self.value, verb, self.amount
        )
    }
}

/// The explanation text block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Narrative {
    pub lines: Vec<NarrativeLine>,
}

impl Narrative {
    pub const HEADING: &'static str = "Explanation for this prediction:";

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", Self::HEADING)?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// One line per feature with a non-zero contribution. Features that did not
/// move the prediction at all are left out.
pub fn generate_narrative(contributions: &ContributionVector, order: NarrativeOrder) -> Narrative {
    let mut lines: Vec<NarrativeLine> = contributions
        .iter()
        .filter_map(|c| {
            let direction = if c.contribution > 0.0 {
                Direction::Increased
            } else if c.contribution < 0.0 {
                Direction::Decreased
            } else {
                return None;
            };
            Some(NarrativeLine {
                feature: c.feature.clone(),
                value: c.value,
                direction,
                amount: c.contribution.abs(),
            })
        })
        .collect();

    if order == NarrativeOrder::Magnitude {
        // stable sort keeps schema order among equal amounts
        lines.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    }
    Narrative { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::Contribution;

    fn contributions(items: &[(&str, f32, f64)]) -> ContributionVector {
        ContributionVector::new(
            0.5,
            items
                .iter()
                .map(|&(feature, value, contribution)| Contribution {
                    feature: feature.to_string(),
                    value,
                    contribution,
                })
                .collect(),
        )
    }

    #[test]
    fn test_zero_contribution_is_omitted() {
        let cv = contributions(&[("duration", 12.0, 0.3), ("age", 30.0, -0.1), ("job", 2.0, 0.0)]);
        let narrative = generate_narrative(&cv, NarrativeOrder::Schema);

        assert_eq!(narrative.len(), 2);
        assert_eq!(narrative.lines[0].feature, "duration");
        assert_eq!(narrative.lines[1].feature, "age");
        assert_eq!(
            narrative.to_string(),
            "Explanation for this prediction:\n\
             - duration (12.00) increased risk by 0.30\n\
             - age (30.00) decreased risk by 0.10\n"
        );
    }

    #[test]
    fn test_one_line_per_nonzero_feature() {
        let cv = contributions(&[
            ("a", 1.0, 1e-9),
            ("b", 1.0, -0.0),
            ("c", 1.0, -2.5),
            ("d", 1.0, 0.0),
            ("e", 1.0, 0.004),
        ]);
        let narrative = generate_narrative(&cv, NarrativeOrder::Schema);
        let features: Vec<_> = narrative.lines.iter().map(|l| l.feature.as_str()).collect();
        assert_eq!(features, vec!["a", "c", "e"]);
        // tiny but non-zero contributions still get a line, rounded for display
        assert_eq!(narrative.lines[0].to_string(), "- a (1.00) increased risk by 0.00");
    }

    #[test]
    fn test_magnitude_order_is_opt_in() {
        let cv = contributions(&[("duration", 12.0, 0.1), ("age", 30.0, -0.4), ("job", 2.0, 0.1)]);
        let by_schema = generate_narrative(&cv, NarrativeOrder::default());
        let by_size = generate_narrative(&cv, NarrativeOrder::Magnitude);

        let names = |n: &Narrative| n.lines.iter().map(|l| l.feature.clone()).collect::<Vec<_>>();
        assert_eq!(names(&by_schema), vec!["duration", "age", "job"]);
        assert_eq!(names(&by_size), vec!["age", "duration", "job"]);
    }

    #[test]
    fn test_empty_narrative_keeps_heading() {
        let cv = contributions(&[("duration", 12.0, 0.0)]);
        let narrative = generate_narrative(&cv, NarrativeOrder::Schema);
        assert!(narrative.is_empty());
        assert_eq!(narrative.to_string(), "Explanation for this prediction:\n");
    }
}
