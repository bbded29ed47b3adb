//! URL slug 生成
//!
//! 商品 slug 由名称派生：小写、非字母数字折叠为 `-`。
//! 冲突解决（数字后缀）在 ProductRepository 中基于现有 slug 集合完成。

/// Derive a URL slug from a product name
///
/// Lowercases, collapses any run of non-alphanumeric characters into a
/// single `-`, and trims leading/trailing dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true; // suppress leading dash

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        "product".to_string()
    } else {
        slug
    }
}

/// Pick a unique slug given the set of slugs already taken
///
/// Returns `base` when free, otherwise the first free `base-2`, `base-3`, ...
pub fn resolve_collision(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|s| s == base) {
        return base.to_string();
    }

    let mut n: u32 = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken.iter().any(|s| s == &candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("iPhone 15 Pro"), "iphone-15-pro");
        assert_eq!(slugify("  Café -- Crème!  "), "caf-cr-me");
        assert_eq!(slugify("MacBook Air (M3)"), "macbook-air-m3");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify("!!!"), "product");
    }

    #[test]
    fn test_resolve_collision_free() {
        assert_eq!(resolve_collision("tv", &[]), "tv");
    }

    #[test]
    fn test_resolve_collision_numeric_suffix() {
        let taken = vec!["tv".to_string(), "tv-2".to_string()];
        assert_eq!(resolve_collision("tv", &taken), "tv-3");
    }
}
