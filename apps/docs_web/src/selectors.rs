use shared::protocol::{API_KEY_HEADER, DATASET_PARAM};

/// The documentation UI names the key field after the header it is sent as.
pub fn api_key_input_selector() -> String {
    format!("input[name={API_KEY_HEADER}]")
}

/// Multi-select inside the parameter-table row for `param_name`.
pub fn multi_select_selector(param_name: &str) -> String {
    format!(
        "tr[data-param-name=\"{}\"] select[multiple]",
        escape_attribute_value(param_name)
    )
}

pub fn dataset_select_selector() -> String {
    multi_select_selector(DATASET_PARAM)
}

fn escape_attribute_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
