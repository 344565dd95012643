//! Weave creative formatting (§9 supplement), grounded in
//! `original_source/app/weave/service.py::_generate_weave_creative`.

use aip_types::LedgerRecord;
use serde_json::Value;

#[derive(Debug, Clone, serde::Serialize)]
pub struct CreativeMetadata {
    pub brand_name: String,
    pub product_name: String,
    pub description: String,
    pub url: String,
}

/// Empty content and metadata when the auction had no winner; otherwise
/// `"[Ad] {product_name} - {description} Learn more: {url}"`, reading
/// `winner.offer.creative_input.{brand_name,product_name,descriptions[0],resource_urls[0]}`.
pub fn generate(record: &LedgerRecord) -> (String, Option<CreativeMetadata>) {
    let Some(winner) = &record.winner else {
        return (String::new(), None);
    };
    let creative_input = winner.pointer("/offer/creative_input").unwrap_or(&Value::Null);

    let brand_name = str_field(creative_input, "brand_name");
    let product_name = str_field(creative_input, "product_name");
    let description = first_str_in_array(creative_input, "descriptions").unwrap_or_default();
    let url = first_str_in_array(creative_input, "resource_urls").unwrap_or_else(|| "#".to_string());

    let content = format!("[Ad] {product_name} - {description} Learn more: {url}");
    let metadata = CreativeMetadata { brand_name, product_name, description, url };
    (content, Some(metadata))
}

fn str_field(value: &Value, key: &str) -> String {
    value.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn first_str_in_array(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_array()?.first()?.as_str().map(str::to_string)
}
