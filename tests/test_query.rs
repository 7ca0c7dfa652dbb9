use fintrack_sdk::query::Op;
use fintrack_sdk::QueryBuilder;

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[test]
fn test_default_select_is_star() {
    let q = QueryBuilder::new("categories").build();
    assert_eq!(q.to_params(), vec![("select".to_string(), "*".to_string())]);
}

#[test]
fn test_filters_render_in_insertion_order() {
    let q = QueryBuilder::new("expenses")
        .eq("user_id", "u1")
        .gte("expense_date", "2024-05-01")
        .lt("expense_date", "2024-06-01")
        .build();
    let params = q.to_params();
    assert_eq!(params[1], ("user_id".into(), "eq.u1".into()));
    assert_eq!(params[2], ("expense_date".into(), "gte.2024-05-01".into()));
    assert_eq!(params[3], ("expense_date".into(), "lt.2024-06-01".into()));
}

#[test]
fn test_embed_and_columns_in_select() {
    let q = QueryBuilder::new("budgets")
        .select(&["id", "amount"])
        .embed("categories", &["name", "icon"])
        .build();
    assert_eq!(q.select_clause(), "id,amount,categories(name,icon)");
    assert_eq!(q.embeds[0].foreign_key(), "category_id");
}

#[test]
fn test_order_limit_offset() {
    let q = QueryBuilder::new("expenses")
        .order_desc("expense_date")
        .order_asc("created_at")
        .limit(50)
        .offset(100)
        .build();
    let params = q.to_params();
    assert_eq!(param(&params, "order"), Some("expense_date.desc,created_at.asc"));
    assert_eq!(param(&params, "limit"), Some("50"));
    assert_eq!(param(&params, "offset"), Some("100"));
}

#[test]
fn test_in_list_quotes_reserved_characters() {
    let q = QueryBuilder::new("categories")
        .in_list("name", &["Food", "Rent, shared"])
        .build();
    assert_eq!(q.filters[0].op, Op::In);
    assert_eq!(param(&q.to_params(), "name"), Some("in.(Food,\"Rent, shared\")"));
}

#[test]
fn test_filter_params_exclude_select_and_order() {
    let q = QueryBuilder::new("expenses")
        .eq("id", "e1")
        .order_desc("expense_date")
        .limit(1)
        .build();
    assert_eq!(q.filter_params(), vec![("id".to_string(), "eq.e1".to_string())]);
}
