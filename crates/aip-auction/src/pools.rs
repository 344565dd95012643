//! Pool classification (§4.8 step 2), grounded in
//! `original_source/app/auction/runner.py::_classify_pools`.

use aip_types::ContextRequest;
use serde_json::Value;

fn value_to_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => vec![],
    }
}

fn dedup_preserve_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}

/// First non-empty candidate among `category_pools`, `categories`,
/// `pools`, the same three keys nested under `context`, then
/// `features.topic`. A scalar becomes a singleton; duplicates are
/// removed preserving first-seen order; an all-empty result yields
/// `["default"]`.
pub fn classify(context: &ContextRequest) -> Vec<String> {
    let nested = |key: &str| -> Option<&Value> { context.context.as_ref()?.get(key) };

    let candidates: [Option<&Value>; 7] = [
        context.category_pools.as_ref(),
        context.categories.as_ref(),
        context.pools.as_ref(),
        nested("category_pools"),
        nested("categories"),
        nested("pools"),
        context.features.as_ref().and_then(|f| f.get("topic")),
    ];

    for candidate in candidates.into_iter().flatten() {
        let list = value_to_list(candidate);
        if !list.is_empty() {
            return dedup_preserve_order(list);
        }
    }
    vec!["default".to_string()]
}
