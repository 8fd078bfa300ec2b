//! Folding children's values into their parent's value

use crate::domain::value::NodeValue;

/// Fold child values (in order) into a parent value.
///
/// The result keeps `prior_exp`, the parent's own exponent. A child with a
/// negative exponent has its numerator and denominator swapped and the
/// exponent negated first. Only the numerator is raised to the child's
/// exponent; the denominator is multiplied as is. `None` is absorbing in both
/// accumulators independently.
pub fn aggregate<I>(prior_exp: f64, children: I) -> NodeValue
where
    I: IntoIterator<Item = NodeValue>,
{
    children.into_iter().fold(
        NodeValue::known(1.0, 1.0, prior_exp),
        |mut acc, child| {
            let NodeValue {
                mut num,
                mut denom,
                mut exp,
            } = child;

            if exp < 0.0 {
                exp = -exp;
                std::mem::swap(&mut num, &mut denom);
            }

            acc.num = match (acc.num, num) {
                (Some(a), Some(n)) => Some(a * n.powf(exp)),
                _ => None,
            };
            acc.denom = match (acc.denom, denom) {
                (Some(a), Some(d)) => Some(a * d),
                _ => None,
            };
            acc
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_two_children_denominator_not_exponentiated() {
        let out = aggregate(
            1.0,
            [NodeValue::known(2.0, 1.0, 1.0), NodeValue::known(3.0, 5.0, 1.0)],
        );
        assert_eq!(out, NodeValue::known(6.0, 5.0, 1.0));
    }

    #[test]
    fn test_negative_exponent_swaps_num_and_denom() {
        let out = aggregate(1.0, [NodeValue::known(4.0, 2.0, -1.0)]);
        assert_eq!(out, NodeValue::known(2.0, 4.0, 1.0));
    }

    #[rstest]
    #[case(NodeValue::known(3.0, 7.0, 2.0), NodeValue::known(9.0, 7.0, 4.0))]
    #[case(NodeValue::known(3.0, 7.0, -2.0), NodeValue::known(49.0, 3.0, 4.0))]
    #[case(NodeValue::new(None, Some(7.0), 2.0), NodeValue::new(None, Some(7.0), 4.0))]
    #[case(NodeValue::new(Some(3.0), None, 1.0), NodeValue::new(Some(3.0), None, 4.0))]
    fn test_single_child_cases(#[case] child: NodeValue, #[case] expected: NodeValue) {
        assert_eq!(aggregate(4.0, [child]), expected);
    }

    #[test]
    fn test_null_numerator_is_absorbing() {
        let out = aggregate(
            1.0,
            [
                NodeValue::known(2.0, 1.0, 1.0),
                NodeValue::new(None, Some(3.0), 1.0),
                NodeValue::known(5.0, 1.0, 1.0),
            ],
        );
        assert_eq!(out.num, None);
        assert_eq!(out.denom, Some(3.0));
    }

    #[test]
    fn test_negative_exponent_moves_null_into_denominator() {
        let out = aggregate(1.0, [NodeValue::new(None, Some(3.0), -1.0)]);
        assert_eq!(out.num, Some(3.0));
        assert_eq!(out.denom, None);
    }

    #[test]
    fn test_zero_denominator_propagates_unchanged() {
        let out = aggregate(1.0, [NodeValue::known(2.0, 0.0, 1.0)]);
        assert_eq!(out, NodeValue::known(2.0, 0.0, 1.0));
        assert_eq!(out.evaluate(), None);
    }
}
