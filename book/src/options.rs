use anyhow::Result;
use common::{Config, ConfigLoader};

/// Tunables for book move selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BookOptions {
    /// Weight of the visit count in move ranking.
    pub count_weight: f32,
    /// Minimum visits before an unproven node is trusted.
    pub min_count: u32,
}

impl Default for BookOptions {
    fn default() -> Self {
        BookOptions {
            count_weight: 0.0,
            min_count: 5,
        }
    }
}

impl Config for BookOptions {
    fn load(config: &ConfigLoader) -> Result<Self> {
        let defaults = BookOptions::default();
        Ok(BookOptions {
            count_weight: config
                .get_f32("book_count_weight")
                .unwrap_or(defaults.count_weight),
            min_count: config
                .get_usize("book_min_count")
                .map(|v| v as u32)
                .unwrap_or(defaults.min_count),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".conf")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_when_unset() {
        let file = write_config("unrelated = 1\n");
        let loader = ConfigLoader::new(file.path(), "book".to_string()).unwrap();

        let options: BookOptions = loader.load().unwrap();
        assert_eq!(options, BookOptions::default());
    }

    #[test]
    fn test_load_from_scope() {
        let file = write_config("book { book_count_weight = 0.25\nbook_min_count = 12 }\n");
        let loader = ConfigLoader::new(file.path(), "book".to_string()).unwrap();

        let options: BookOptions = loader.load().unwrap();
        assert_eq!(options.count_weight, 0.25);
        assert_eq!(options.min_count, 12);
    }
}
