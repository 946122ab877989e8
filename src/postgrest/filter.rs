//! Filter and ordering clauses for collection queries

use serde_json::Value;

/// Equality filter on one column (`column=eq.value`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq<T: ToString>(column: &str, value: T) -> Self {
        Self {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    /// Query-string form understood by PostgREST
    pub fn to_query(&self) -> (String, String) {
        (self.column.clone(), format!("eq.{}", self.value))
    }

    /// Evaluate the filter against a JSON record
    pub fn matches(&self, record: &Value) -> bool {
        match record.get(&self.column) {
            Some(Value::String(s)) => *s == self.value,
            Some(Value::Null) | None => self.value == "null",
            Some(other) => other.to_string() == self.value,
        }
    }
}

/// Sort clause (`order=column.asc|desc`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn to_query(&self) -> (String, String) {
        let direction = if self.ascending { "asc" } else { "desc" };
        ("order".to_string(), format!("{}.{}", self.column, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_query_form() {
        assert_eq!(
            Filter::eq("user_id", "u1").to_query(),
            ("user_id".to_string(), "eq.u1".to_string())
        );
        let order = OrderBy {
            column: "created_at".to_string(),
            ascending: false,
        };
        assert_eq!(order.to_query().1, "created_at.desc");
    }

    #[test]
    fn filter_matches_json_values() {
        let record = json!({ "user_id": "u1", "count": 3, "flag": true, "gone": null });
        assert!(Filter::eq("user_id", "u1").matches(&record));
        assert!(!Filter::eq("user_id", "u2").matches(&record));
        assert!(Filter::eq("count", 3).matches(&record));
        assert!(Filter::eq("flag", true).matches(&record));
        assert!(Filter::eq("gone", "null").matches(&record));
        assert!(!Filter::eq("missing", "x").matches(&record));
    }
}
