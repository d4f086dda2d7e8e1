use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Identifier held in an expense's `id` field.
///
/// Callers choose the identifier; the store never generates or checks uniqueness of it.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseId {
    Text(String),
    Number(Number),
}

impl ExpenseId {
    /// Compares against an identifier given as text.
    ///
    /// Text ids must be equal. Numeric ids also match text that parses to the
    /// same numeric value, so a stored `7` is found by `"7"` or `"7.0"`.
    pub fn loosely_matches(&self, expense_id: &str) -> bool {
        match self {
            ExpenseId::Text(id) => id == expense_id,
            ExpenseId::Number(n) => number_matches(n, expense_id),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(id) => Some(ExpenseId::Text(id.clone())),
            Value::Number(n) => Some(ExpenseId::Number(n.clone())),
            _ => None,
        }
    }
}

// Empty text never matches, not even a stored 0
fn number_matches(n: &Number, expense_id: &str) -> bool {
    if n.to_string() == expense_id {
        return true;
    }
    match (n.as_f64(), expense_id.trim().parse::<f64>()) {
        (Some(stored), Ok(wanted)) => stored == wanted,
        _ => false,
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpenseId::Text(id) => f.write_str(id),
            ExpenseId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ExpenseId {
    fn from(id: &str) -> Self {
        ExpenseId::Text(id.to_owned())
    }
}

impl From<String> for ExpenseId {
    fn from(id: String) -> Self {
        ExpenseId::Text(id)
    }
}

impl From<u64> for ExpenseId {
    fn from(id: u64) -> Self {
        ExpenseId::Number(id.into())
    }
}

impl From<ExpenseId> for Value {
    fn from(id: ExpenseId) -> Self {
        match id {
            ExpenseId::Text(id) => Value::String(id),
            ExpenseId::Number(n) => Value::Number(n),
        }
    }
}

/// One expense record of a user, kept exactly as stored.
///
/// Only the `id` field is ever looked at. A record whose `id` is missing or
/// is neither text nor a number is still loaded and written back; it just
/// never matches a lookup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct Expense(Value);

impl Expense {
    pub fn new(id: impl Into<ExpenseId>) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_owned(), id.into().into());
        Self(Value::Object(fields))
    }

    /// Adds a field to the record. Records that are not JSON objects are left as they are.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Value::Object(fields) = &mut self.0 {
            fields.insert(key.into(), value.into());
        }
        self
    }

    pub fn id(&self) -> Option<ExpenseId> {
        self.0.get("id").and_then(ExpenseId::from_value)
    }

    /// Get a field by name.
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn matches(&self, expense_id: &str) -> bool {
        match self.0.get("id") {
            Some(Value::String(id)) => id == expense_id,
            Some(Value::Number(n)) => number_matches(n, expense_id),
            _ => false,
        }
    }
}

impl From<Value> for Expense {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!("a51f"), "a51f", true ; "same text")]
    #[test_case(json!("a51f"), "A51F", false ; "text is case sensitive")]
    #[test_case(json!("7"), "7.0", false ; "text ids are not coerced")]
    #[test_case(json!(7), "7", true ; "number against its text")]
    #[test_case(json!(7), "7.0", true ; "number against equal value")]
    #[test_case(json!(7), " 7 ", true ; "surrounding whitespace ignored for numbers")]
    #[test_case(json!(7), "8", false ; "different number")]
    #[test_case(json!(2.5), "2.5", true ; "fractional number")]
    #[test_case(json!(7), "seven", false ; "number against non numeric text")]
    #[test_case(json!(0), "", false ; "empty text never matches zero")]
    #[test_case(json!(""), "", true ; "empty text id matches itself")]
    #[test_case(json!(16), "0x10", false ; "hex text is not a number")]
    #[test_case(json!(null), "null", false ; "null id never matches")]
    #[test_case(json!(true), "true", false ; "boolean id never matches")]
    fn loose_matching(stored: Value, wanted: &str, expected: bool) {
        let expense = Expense::from(json!({ "id": stored }));
        assert_eq!(expense.matches(wanted), expected);
        if let Some(id) = expense.id() {
            assert_eq!(id.loosely_matches(wanted), expected);
        }
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = json!({
            "id": "be48",
            "descripcion": "Cena",
            "valor": 35.1,
            "fecha": 1655457126000u64
        });

        let expense: Expense = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(expense.id(), Some(ExpenseId::from("be48")));
        assert_eq!(expense.detail("valor"), Some(&json!(35.1)));
        assert_eq!(serde_json::to_value(&expense).unwrap(), raw);
    }

    #[test_case(json!({ "valor": 1 }) ; "missing id")]
    #[test_case(json!({ "id": null, "valor": 1 }) ; "null id")]
    #[test_case(json!({ "id": false }) ; "boolean id")]
    #[test_case(json!("just text") ; "not an object")]
    fn records_without_usable_id_still_load(raw: Value) {
        let expense: Expense = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(expense.id(), None);
        assert!(!expense.matches("1"));
        assert_eq!(serde_json::to_value(&expense).unwrap(), raw);
    }

    #[test]
    fn built_expense_carries_its_id() {
        let expense = Expense::new(7u64).with_detail("valor", 2);

        assert_eq!(expense.as_value(), &json!({ "id": 7, "valor": 2 }));
        assert!(expense.matches("7"));
    }
}
