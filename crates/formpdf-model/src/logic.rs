//! Conditional logic records
//!
//! Used both by configurations (does this PDF apply to the entry?) and by
//! fields (is this field visible for the entry?). Evaluation lives in
//! `formpdf-core`.

use serde::{Deserialize, Serialize};

use crate::field::FieldId;

/// What happens when the rules match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicAction {
    #[default]
    Show,
    Hide,
}

/// How rules combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicType {
    #[default]
    All,
    Any,
}

/// Rule comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    Is,
    #[serde(rename = "isnot")]
    IsNot,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
    Contains,
    StartsWith,
    EndsWith,
}

/// One comparison against an entry value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub field_id: FieldId,
    pub operator: RuleOperator,
    #[serde(default)]
    pub value: String,
}

/// A set of rules and the action they trigger
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionalLogic {
    #[serde(default)]
    pub action: LogicAction,
    #[serde(default)]
    pub logic: LogicType,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_tags() {
        let rule: Rule =
            serde_json::from_str(r#"{"field_id": 2, "operator": "isnot", "value": "x"}"#).unwrap();
        assert_eq!(rule.operator, RuleOperator::IsNot);

        let rule: Rule =
            serde_json::from_str(r#"{"field_id": 2, "operator": ">", "value": "3"}"#).unwrap();
        assert_eq!(rule.operator, RuleOperator::Greater);
    }
}
