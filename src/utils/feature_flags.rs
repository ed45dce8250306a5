pub fn is_truthy(value: impl AsRef<str>) -> bool {
    matches!(
        value.as_ref().trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn is_falsy(value: impl AsRef<str>) -> bool {
    matches!(
        value.as_ref().trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Comma-separated list, blanks dropped.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_and_falsy_are_disjoint() {
        for v in ["1", "TRUE", " yes ", "on"] {
            assert!(is_truthy(v) && !is_falsy(v));
        }
        for v in ["0", "False", "no", "OFF"] {
            assert!(is_falsy(v) && !is_truthy(v));
        }
        assert!(!is_truthy("maybe") && !is_falsy("maybe"));
    }

    #[test]
    fn split_list_trims_and_skips_blanks() {
        assert_eq!(split_list(" OK, ,NO_TAG ,"), vec!["OK", "NO_TAG"]);
    }
}
