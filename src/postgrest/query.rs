//! Options for listing a collection

use crate::postgrest::filter::{Filter, OrderBy};

/// `where` and `orderBy` options of a list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows where `column` equals `value`
    pub fn eq<T: ToString>(mut self, column: &str, value: T) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    /// Order the results by a column
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order_by = Some(OrderBy {
            column: column.to_string(),
            ascending,
        });
        self
    }

    /// Query parameters for a PostgREST select
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(self.filters.iter().map(Filter::to_query));
        if let Some(order) = &self.order_by {
            params.push(order.to_query());
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parameters_keep_order() {
        let options = ListOptions::new()
            .eq("user_id", "u1")
            .order("created_at", false);
        let params = options.to_query();
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), "eq.u1".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn empty_options_select_everything() {
        assert_eq!(ListOptions::new().to_query().len(), 1);
    }
}
