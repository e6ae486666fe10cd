//! Conditional logic evaluation
//!
//! Shared by configuration-level logic (does a PDF apply to an entry?) and
//! field-level logic (is a field visible for an entry?).

use formpdf_model::{
    ConditionalLogic, Entry, FieldValue, LogicAction, LogicType, Rule, RuleOperator,
};

/// Whether the subject governed by `logic` is shown for the entry
///
/// Absent logic, or logic with no rules, always shows the subject.
pub fn is_shown(logic: Option<&ConditionalLogic>, entry: &Entry) -> bool {
    let Some(logic) = logic else {
        return true;
    };
    if logic.rules.is_empty() {
        return true;
    }

    let matched = match logic.logic {
        LogicType::All => logic.rules.iter().all(|r| rule_matches(r, entry)),
        LogicType::Any => logic.rules.iter().any(|r| rule_matches(r, entry)),
    };

    match logic.action {
        LogicAction::Show => matched,
        LogicAction::Hide => !matched,
    }
}

/// Evaluate one rule against the entry
pub fn rule_matches(rule: &Rule, entry: &Entry) -> bool {
    // Multi-value fields match when any selected value matches
    let candidates: Vec<String> = match entry.value(rule.field_id) {
        Some(FieldValue::List(items)) => items.clone(),
        Some(value) => vec![value.display_text()],
        None => vec![String::new()],
    };

    match rule.operator {
        RuleOperator::IsNot => !candidates.iter().any(|c| compare(RuleOperator::Is, c, &rule.value)),
        op => candidates.iter().any(|c| compare(op, c, &rule.value)),
    }
}

fn compare(op: RuleOperator, actual: &str, expected: &str) -> bool {
    let actual_lc = actual.to_lowercase();
    let expected_lc = expected.to_lowercase();
    match op {
        RuleOperator::Is => actual_lc == expected_lc,
        RuleOperator::IsNot => actual_lc != expected_lc,
        RuleOperator::Contains => actual_lc.contains(&expected_lc),
        RuleOperator::StartsWith => actual_lc.starts_with(&expected_lc),
        RuleOperator::EndsWith => actual_lc.ends_with(&expected_lc),
        RuleOperator::Greater | RuleOperator::Less => {
            match (parse_number(actual), parse_number(expected)) {
                (Some(a), Some(b)) if op == RuleOperator::Greater => a > b,
                (Some(a), Some(b)) => a < b,
                _ => false,
            }
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use formpdf_model::{FieldId, FormId};

    fn entry() -> Entry {
        let mut entry = Entry::new(1, FormId(1));
        entry.set(1, FieldValue::text("Yes"));
        entry.set(2, FieldValue::Number(42.0));
        entry.set(3, FieldValue::List(vec!["red".to_string(), "blue".to_string()]));
        entry
    }

    fn rule(field: u32, operator: RuleOperator, value: &str) -> Rule {
        Rule {
            field_id: FieldId(field),
            operator,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_no_logic_is_shown() {
        assert!(is_shown(None, &entry()));
        assert!(is_shown(Some(&ConditionalLogic::default()), &entry()));
    }

    #[test]
    fn test_operators() {
        let e = entry();
        assert!(rule_matches(&rule(1, RuleOperator::Is, "yes"), &e));
        assert!(rule_matches(&rule(1, RuleOperator::IsNot, "No"), &e));
        assert!(rule_matches(&rule(2, RuleOperator::Greater, "41"), &e));
        assert!(!rule_matches(&rule(2, RuleOperator::Less, "41"), &e));
        assert!(rule_matches(&rule(1, RuleOperator::StartsWith, "Y"), &e));
        assert!(rule_matches(&rule(1, RuleOperator::EndsWith, "es"), &e));
        assert!(rule_matches(&rule(1, RuleOperator::Contains, "e"), &e));
        assert!(!rule_matches(&rule(9, RuleOperator::Greater, "1"), &e));
    }

    #[test]
    fn test_list_values_match_any_item() {
        let e = entry();
        assert!(rule_matches(&rule(3, RuleOperator::Is, "blue"), &e));
        assert!(!rule_matches(&rule(3, RuleOperator::IsNot, "blue"), &e));
        assert!(rule_matches(&rule(3, RuleOperator::IsNot, "green"), &e));
    }

    #[test]
    fn test_all_any_and_hide() {
        let e = entry();
        let mut logic = ConditionalLogic {
            action: LogicAction::Show,
            logic: LogicType::All,
            rules: vec![
                rule(1, RuleOperator::Is, "Yes"),
                rule(2, RuleOperator::Less, "10"),
            ],
        };
        assert!(!is_shown(Some(&logic), &e));

        logic.logic = LogicType::Any;
        assert!(is_shown(Some(&logic), &e));

        logic.action = LogicAction::Hide;
        assert!(!is_shown(Some(&logic), &e));
    }
}
