//! Resource-name inflection: "posts" -> "post", and the foreign-key
//! field other resources use to reference a resource ("post" + "Id" -> "postId").

/// Irregular (plural, singular) pairs checked before the suffix rules.
const IRREGULAR: &[(&str, &str)] = &[
    ("people", "person"),
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("teeth", "tooth"),
    ("feet", "foot"),
];

/// Words whose singular and plural are identical.
const UNCOUNTABLE: &[&str] = &["data", "info", "information", "news", "series", "species", "sheep", "fish", "media"];

/// Convert a resource name to its singular form.
/// e.g. "posts" -> "post", "categories" -> "category", "boxes" -> "box"
pub fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return preserve_case(word, singular);
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    for suffix in ["ches", "shes", "sses", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

/// Foreign-key field name used by children of a resource with this singular name.
/// e.g. ("post", "Id") -> "postId"
pub fn foreign_key(singular: &str, suffix: &str) -> String {
    format!("{}{}", singular, suffix)
}

fn preserve_case(original: &str, replacement: &str) -> String {
    let mut chars = original.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let mut out = String::with_capacity(replacement.len());
            let mut rest = replacement.chars();
            if let Some(c) = rest.next() {
                out.extend(c.to_uppercase());
            }
            out.extend(rest);
            out
        }
        _ => replacement.to_string(),
    }
}
