//! Identifier helpers for the document model.
use once_cell::sync::Lazy;
use regex::Regex;

static OPERATION_ID_UNSAFE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.\-{}\s]").expect("operation id pattern")
});

/// Split into words on separators, lower→upper transitions and acronym ends
/// (`XMLHttp` → `XML`, `Http`).
fn words(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let camel_hump = (prev.is_lowercase() || prev.is_ascii_digit()) && c.is_uppercase();
            let acronym_end = prev.is_uppercase() && c.is_uppercase() && next_is_lower;
            if camel_hump || acronym_end {
                out.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `pet-store_id` → `petStoreId`, `XMLHttpRequest` → `xmlHttpRequest`.
pub fn camel_case(s: &str) -> String {
    let mut out = String::new();
    for (i, word) in words(s).into_iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            out.push_str(&capitalize(&lower));
        }
    }
    out
}

/// Name of the generated client method for one operation.
///
/// An `operationId` wins and only has its unsafe characters replaced by `_`.
/// Otherwise the name comes from the verb and the path:
/// `get /pets/{petId}` → `getPetsByPetId`.
pub fn method_name(method: &str, path: &str, operation_id: Option<&str>) -> String {
    if let Some(id) = operation_id {
        return OPERATION_ID_UNSAFE.replace_all(id, "_").into_owned();
    }
    let verb = method.to_lowercase();
    if path == "/" || path.is_empty() {
        return verb;
    }

    let clean = path.strip_suffix('/').unwrap_or(path);
    let segments: Vec<String> = clean
        .split('/')
        .skip(1)
        .map(|segment| {
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(param) => format!("by{}", capitalize(param)),
                None => segment.to_owned(),
            }
        })
        .collect();

    let tail = camel_case(&segments.join("-"));
    format!("{verb}{}", capitalize(&tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_words() {
        assert_eq!(camel_case("pet-store_id"), "petStoreId");
        assert_eq!(camel_case("petId"), "petId");
        assert_eq!(camel_case("X-Request-ID"), "xRequestId");
        assert_eq!(camel_case("XMLHttpRequest"), "xmlHttpRequest");
        assert_eq!(camel_case("api_key"), "apiKey");
        assert_eq!(camel_case("page2Size"), "page2Size");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn method_name_from_path() {
        assert_eq!(method_name("GET", "/pets/{petId}", None), "getPetsByPetId");
        assert_eq!(method_name("post", "/pets/", None), "postPets");
        assert_eq!(method_name("delete", "/store/order/{orderId}", None), "deleteStoreOrderByOrderId");
        assert_eq!(method_name("get", "/", None), "get");
        assert_eq!(method_name("get", "", None), "get");
    }

    #[test]
    fn method_name_from_operation_id() {
        assert_eq!(method_name("get", "/ignored", Some("pets.find-by status")), "pets_find_by_status");
        assert_eq!(method_name("get", "/ignored", Some("{x}")), "_x_");
    }
}
