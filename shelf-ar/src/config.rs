//! Resolver configuration
//!
//! Loaded from the `[resolver]` table of the Shelf TOML file (see
//! `shelf_common::config`); every key is optional and falls back to the
//! built-in defaults below.

use serde::{Deserialize, Serialize};
use shelf_common::config::LoggingConfig;
use std::collections::BTreeMap;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "SHELF_CONFIG";

/// Config file name under `<config_dir>/shelf/`
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Complete `shelf-ar` configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub resolver: ResolverConfig,
}

/// Author resolution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// How many ancestor directories Pass 1 inspects, nearest first
    pub depth_limit: usize,
    /// Known male given names
    pub male_names: Vec<String>,
    /// Known female given names
    pub female_names: Vec<String>,
    /// Anthology/compilation markers; matched fuzzily
    pub noise_words: Vec<String>,
    /// Trailing tokens ignored during order inference ("мл", "ст")
    pub name_suffixes: Vec<String>,
    /// Folder-name layouts, most specific first
    pub folder_layouts: Vec<String>,
    /// File-name layouts, most specific first
    pub file_layouts: Vec<String>,
    /// Metadata listing more distinct authors than this is an anthology
    pub max_metadata_authors: usize,
    /// Normalized Levenshtein similarity at which a word counts as a noise word
    pub noise_similarity: f64,
    /// Literal author rewrites, applied to each Pass 1 attribution and again in Pass 5
    pub surname_conversions: BTreeMap<String, String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            depth_limit: 5,
            male_names: to_strings(DEFAULT_MALE_NAMES),
            female_names: to_strings(DEFAULT_FEMALE_NAMES),
            noise_words: to_strings(DEFAULT_NOISE_WORDS),
            name_suffixes: to_strings(&["мл", "ст", "младший", "старший", "jr", "sr"]),
            folder_layouts: to_strings(&[
                "Series (Author)",
                "(Series) Author",
                "Author - Subtitle",
                "Author (Alias)",
                "Author",
            ]),
            file_layouts: to_strings(&[
                "Author - Title (Series)",
                "Author. Title (Series)",
                "Author - Series. Title",
                "(Author) - Title",
                "Title - (Author)",
                "Author - Title",
                "Author. Title",
                "Title (Author)",
            ]),
            max_metadata_authors: 3,
            noise_similarity: 0.85,
            surname_conversions: BTreeMap::new(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const DEFAULT_MALE_NAMES: &[&str] = &[
    "Александр", "Алексей", "Анатолий", "Андрей", "Антон", "Аркадий", "Артем", "Артур",
    "Богдан", "Борис", "Вадим", "Валентин", "Валерий", "Василий", "Виктор", "Виталий",
    "Владимир", "Владислав", "Вячеслав", "Геннадий", "Георгий", "Глеб", "Григорий",
    "Даниил", "Денис", "Дмитрий", "Евгений", "Егор", "Иван", "Игорь", "Илья", "Кирилл",
    "Константин", "Лев", "Леонид", "Максим", "Марк", "Михаил", "Никита", "Николай",
    "Олег", "Павел", "Петр", "Роман", "Руслан", "Святослав", "Семен", "Сергей",
    "Станислав", "Степан", "Тим", "Тимур", "Федор", "Эдвард", "Юрий", "Ян", "Ярослав",
];

const DEFAULT_FEMALE_NAMES: &[&str] = &[
    "Александра", "Алина", "Алла", "Анастасия", "Анна", "Валентина", "Валерия", "Вера",
    "Виктория", "Галина", "Дарья", "Евгения", "Екатерина", "Елена", "Жанна", "Зоя",
    "Ирина", "Кира", "Лариса", "Любовь", "Людмила", "Маргарита", "Марина", "Мария",
    "Надежда", "Наталья", "Нина", "Оксана", "Ольга", "Полина", "Светлана", "Софья",
    "Тамара", "Татьяна", "Юлия", "Яна",
];

const DEFAULT_NOISE_WORDS: &[&str] = &[
    "Сборник", "Антология", "Коллекция", "Компиляция", "Серия", "Цикл", "Подборка",
    "Архив", "Разное", "Другое", "Трилогия", "Дилогия", "Тетралогия",
    "Неизвестен", "Unknown", "Various", "Anthology", "Collection",
];

#[cfg(test)]
mod tests {
    use super::*;

    /// **[TC-U-CONF-010-01]** Unit test: Verify built-in defaults
    #[test]
    fn tc_u_conf_010_01_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.depth_limit, 5);
        assert_eq!(config.max_metadata_authors, 3);
        assert!(config.male_names.iter().any(|n| n == "Тим"));
        assert!(config.female_names.iter().any(|n| n == "Людмила"));
        assert_eq!(config.folder_layouts.last().map(String::as_str), Some("Author"));
    }

    /// **[TC-U-CONF-010-02]** Unit test: Verify partial TOML keeps defaults
    #[test]
    fn tc_u_conf_010_02_partial_toml() {
        let toml_text = r#"
            [logging]
            level = "shelf_ar=debug"

            [resolver]
            depth_limit = 2

            [resolver.surname_conversions]
            "Гоблин" = "Пучков Дмитрий"
        "#;

        let config: AppConfig = toml::from_str(toml_text).unwrap();

        assert_eq!(config.logging.level, "shelf_ar=debug");
        assert_eq!(config.resolver.depth_limit, 2);
        assert_eq!(
            config.resolver.surname_conversions.get("Гоблин").map(String::as_str),
            Some("Пучков Дмитрий")
        );
        assert_eq!(config.resolver.file_layouts, ResolverConfig::default().file_layouts);
    }
}
