/// Normalize a route template into an `OpenAPI` path.
///
/// The result always starts with a single `/`. Inside `{...}` segments only the
/// parameter name is kept: defaults (`{page=1}`), constraints (`{id:int}`,
/// including regex constraints with nested braces), optional markers
/// (`{id?}`) and catch-all prefixes (`{*slug}`, `{**slug}`) are removed.
#[must_use]
pub fn normalize_path(relative_path: &str) -> String {
    let mut normalized = String::with_capacity(relative_path.len() + 1);
    normalized.push('/');

    let mut chars = relative_path.trim_start_matches('/').chars();
    while let Some(ch) = chars.next() {
        if ch != '{' {
            normalized.push(ch);
            continue;
        }

        let mut name = String::new();
        let mut depth = 1;
        let mut in_name = true;
        for inner in chars.by_ref() {
            match inner {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                '=' | ':' | '?' if depth == 1 => in_name = false,
                '*' if in_name && name.is_empty() => {}
                _ if in_name && depth == 1 => name.push(inner),
                _ => {}
            }
        }

        normalized.push('{');
        normalized.push_str(name.trim());
        normalized.push('}');
    }

    normalized
}
