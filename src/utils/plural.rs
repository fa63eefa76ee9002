//! Pluralization for log messages.

/// Format count with noun, handling pluralization
///
/// # Examples
///
/// - `plural_count(0, "file")` -> `"0 files"`
/// - `plural_count(1, "file")` -> `"1 file"`
/// - `plural_count(2, "entry")` -> `"2 entries"`
pub fn plural_count(count: usize, noun: &str) -> String {
    if count == 1 {
        return format!("1 {noun}");
    }

    let mut chars = noun.chars().rev();
    match (chars.next(), chars.next()) {
        (Some('y'), Some(c)) if !"aeiou".contains(c) => {
            format!("{count} {}ies", &noun[..noun.len() - 1])
        }
        _ => format!("{count} {noun}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "file"), "0 files");
        assert_eq!(plural_count(1, "file"), "1 file");
        assert_eq!(plural_count(3, "source map"), "3 source maps");
        assert_eq!(plural_count(2, "directory"), "2 directories");
        assert_eq!(plural_count(2, "key"), "2 keys");
        assert_eq!(plural_count(1, "entry"), "1 entry");
    }
}
