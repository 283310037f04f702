//! Variable resolution.
//!
//! Replaces `{{identifier}}` placeholders in element text with values from
//! the data context. Resolution never fails — an identifier that cannot be
//! matched leaves its placeholder verbatim, and values of unexpected shape
//! degrade to their best-effort textual form.
//!
//! Identifier matching is tolerant of label-style template keys: when an
//! exact lookup misses, keys are compared case-insensitively with any
//! trailing colon stripped (so a data key `"Customer:"` satisfies the
//! identifier `customer`).

use std::collections::HashMap;

use crate::value::Value;

/// Resolve the placeholders in `text` according to the element's
/// `variableName` binding.
///
/// - empty `variable_name`: every key in the context is substituted where
///   its placeholder appears;
/// - `[a,"b",c]`: the bracketed identifiers are substituted in list order;
/// - anything else: the single named identifier is substituted.
pub fn resolve(text: &str, variable_name: &str, fields: &HashMap<String, Value>) -> String {
    if variable_name.is_empty() {
        return replace_all(text, fields);
    }
    if variable_name.starts_with('[') && variable_name.ends_with(']') {
        return resolve_list(text, variable_name, fields);
    }
    resolve_named(text, variable_name, fields)
}

/// Substitute every context key's placeholder. Placeholders naming absent
/// keys stay verbatim.
fn replace_all(text: &str, fields: &HashMap<String, Value>) -> String {
    let mut result = text.to_string();
    for (key, value) in fields {
        let placeholder = format!("{{{{{}}}}}", key);
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, &value.render());
        }
    }
    result
}

/// Substitute one identifier: exact key match first, then case-insensitive
/// with trailing colons stripped from candidate keys. No match leaves the
/// text untouched.
fn resolve_named(text: &str, name: &str, fields: &HashMap<String, Value>) -> String {
    let placeholder = format!("{{{{{}}}}}", name);

    if let Some(value) = fields.get(name) {
        return text.replace(&placeholder, &value.render());
    }

    for (key, value) in fields {
        if key.trim_end_matches(':').eq_ignore_ascii_case(name) {
            return text.replace(&placeholder, &value.render());
        }
    }

    text.to_string()
}

/// Substitute a bracketed identifier list (`[a,"b",c]`) entry by entry, in
/// list order. Entries that fail to resolve leave their placeholders intact
/// for any later passes.
fn resolve_list(text: &str, list_spec: &str, fields: &HashMap<String, Value>) -> String {
    let inner = list_spec.trim_matches(['[', ']']);
    let mut result = text.to_string();
    for entry in inner.split(',') {
        let name = entry.trim_matches([' ', '"', '\'']);
        if name.is_empty() {
            continue;
        }
        result = resolve_named(&result, name, fields);
    }
    result
}

/// Resolve one loop iteration's text: the looped field's placeholder gets
/// the item's value, and every other placeholder resolves against the outer
/// context — excluding the array's own key.
pub fn resolve_loop_item(
    text: &str,
    loop_field: &str,
    item_text: &str,
    array_name: &str,
    fields: &HashMap<String, Value>,
) -> String {
    if text.is_empty() {
        return item_text.to_string();
    }

    let mut result = text.replace(&format!("{{{{{}}}}}", loop_field), item_text);
    for (key, value) in fields {
        if key == array_name {
            continue;
        }
        let placeholder = format!("{{{{{}}}}}", key);
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, &value.render());
        }
    }
    result
}

/// Extract a named field from a loop item as text. Items that are not
/// mappings, and mappings missing the field, yield the empty string.
pub fn array_field_text(item: &Value, field: &str) -> String {
    item.get(field).map(Value::render).unwrap_or_default()
}

/// Content for QR/barcode elements: the type-specific literal wins, then
/// the bound variable's value, then the element text after normal
/// resolution.
pub fn special_content(
    literal: &str,
    text: &str,
    variable_name: &str,
    fields: &HashMap<String, Value>,
) -> String {
    if !literal.is_empty() {
        return literal.to_string();
    }
    if !variable_name.is_empty()
        && let Some(value) = fields.get(variable_name)
    {
        return value.render();
    }
    resolve(text, variable_name, fields)
}
