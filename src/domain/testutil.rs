//! Shared fixtures for domain tests

use super::header::InMemoryHeaders;
use super::id::HeaderId;

pub fn id(path: &str) -> HeaderId {
    HeaderId::new(path).unwrap()
}

/// Wraps `content` in an `#ifndef`/`#define`/`#endif` guard
pub fn guarded(macro_name: &str, content: &str) -> String {
    format!(
        "//\n// Created by test.\n//\n\n#ifndef {m}\n#define {m}\n\n{content}\n\n#endif //{m}\n",
        m = macro_name,
        content = content.trim_end(),
    )
}

/// Builds a header set from `(path, guarded content)` pairs
pub fn headers(files: &[(&str, &str)]) -> InMemoryHeaders {
    let mut set = InMemoryHeaders::new();
    for (path, content) in files {
        let macro_name = path.replace(['/', '.'], "_").to_uppercase();
        set.insert(id(path), guarded(&macro_name, content));
    }
    set
}
