use std::collections::HashSet;

/// Canonical lower snake case form of a column name.
///
/// `TABLE_NAME`, `tableName` and `Table Name` all become `table_name`;
/// acronyms stay together (`HTTPStatus` becomes `http_status`).
#[must_use]
pub fn normalize_column_name(name: &str) -> String {
    let chars: Vec<char> = name.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, ' ' | '-' | '.' | '_') {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Normalize a whole header so every name is a distinct record key.
///
/// Unnamed columns become `column_<position>` (1-based). A later column whose
/// name is already taken gets `_2`, `_3`, ... appended.
#[must_use]
pub fn unique_column_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());
    for (i, raw) in names.iter().enumerate() {
        let mut base = normalize_column_name(raw.as_ref());
        if base.is_empty() {
            base = format!("column_{}", i + 1);
        }
        let mut candidate = base.clone();
        let mut suffix = 2;
        while taken.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}
