pub mod scenario;

/// Split a comma-separated CLI value, trimming blanks.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_drops_blanks() {
        assert_eq!(split_csv(" smoke, ,mistakes,"), vec!["smoke", "mistakes"]);
        assert!(split_csv("").is_empty());
    }
}
