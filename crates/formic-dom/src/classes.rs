//! Class Attribute Utility
//!
//! Add/has/remove over a single space-delimited class string, tolerant
//! of absent values.

/// Check whether a class string contains a class name
pub fn has_class(class_attr: Option<&str>, name: &str) -> bool {
    match class_attr {
        Some(value) => value.split_ascii_whitespace().any(|c| c == name),
        None => false,
    }
}

/// Add a class name, returning the new class string
pub fn add_class(class_attr: Option<&str>, name: &str) -> String {
    match class_attr {
        None | Some("") => name.to_string(),
        Some(value) if has_class(Some(value), name) => value.to_string(),
        Some(value) => format!("{value} {name}"),
    }
}

/// Remove a class name, returning the new class string
pub fn remove_class(class_attr: Option<&str>, name: &str) -> String {
    match class_attr {
        Some(value) => {
            let kept: Vec<&str> = value
                .split_ascii_whitespace()
                .filter(|c| *c != name)
                .collect();
            kept.join(" ")
        }
        None => String::new(),
    }
}

/// Check whether every whitespace-separated token of `names` is present.
///
/// Configured message classes may be compound ("help-block text-danger");
/// matching follows `getElementsByClassName` semantics.
pub fn has_all_classes(class_attr: Option<&str>, names: &str) -> bool {
    let mut tokens = names.split_ascii_whitespace().peekable();
    if tokens.peek().is_none() {
        return false;
    }
    tokens.all(|t| has_class(class_attr, t))
}
