//! Client-visible messages
//!
//! Every message returned in an `{"error": ...}` body comes from here, in the
//! operator's configured language.

use std::str::FromStr;

/// Language of client-visible messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ru" | "ru_ru" | "ru-ru" => Ok(Locale::Ru),
            "en" | "en_us" | "en-us" | "en_gb" | "en-gb" => Ok(Locale::En),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

/// Render a list of column names the way operators see them in the UI:
/// `['Fwd IAT Min', 'Flow IAT Min']`
pub fn format_column_list(columns: &[String]) -> String {
    let quoted: Vec<String> = columns.iter().map(|c| format!("'{}'", c)).collect();
    format!("[{}]", quoted.join(", "))
}

impl Locale {
    pub fn wrong_extension(self) -> String {
        match self {
            Locale::Ru => "Неверное расширение файла. Ожидается .csv".to_string(),
            Locale::En => "Invalid file extension. Expected .csv".to_string(),
        }
    }

    pub fn wrong_mime_type(self, actual: &str) -> String {
        match self {
            Locale::Ru => format!("Неверный MIME-тип: {}. Ожидается text/csv", actual),
            Locale::En => format!("Invalid MIME type: {}. Expected text/csv", actual),
        }
    }

    pub fn empty_file(self) -> String {
        match self {
            Locale::Ru => "Файл пуст или не загружен".to_string(),
            Locale::En => "File is empty or was not uploaded".to_string(),
        }
    }

    pub fn no_data(self) -> String {
        match self {
            Locale::Ru => "CSV-файл не содержит данных".to_string(),
            Locale::En => "CSV file contains no data".to_string(),
        }
    }

    pub fn missing_features(self, missing: &[String]) -> String {
        let list = format_column_list(missing);
        match self {
            Locale::Ru => format!("Отсутствуют признаки: {}", list),
            Locale::En => format!("Missing feature columns: {}", list),
        }
    }

    pub fn type_conversion(self, detail: &str) -> String {
        match self {
            Locale::Ru => format!("Ошибка преобразования типов: {}", detail),
            Locale::En => format!("Type conversion error: {}", detail),
        }
    }

    pub fn invalid_request(self, detail: &str) -> String {
        match self {
            Locale::Ru => format!("Некорректный запрос: {}", detail),
            Locale::En => format!("Invalid request: {}", detail),
        }
    }

    pub fn server_error(self, detail: &str) -> String {
        match self {
            Locale::Ru => format!("Ошибка сервера: {}", detail),
            Locale::En => format!("Server error: {}", detail),
        }
    }

    /// Production variant of `server_error`; no internal detail
    pub fn server_error_generic(self) -> String {
        match self {
            Locale::Ru => "Внутренняя ошибка сервера".to_string(),
            Locale::En => "Internal server error".to_string(),
        }
    }

    pub fn upload_too_large(self, limit: usize) -> String {
        match self {
            Locale::Ru => format!("Файл слишком большой. Максимальный размер: {} байт", limit),
            Locale::En => format!("File is too large. Maximum size: {} bytes", limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale() {
        assert_eq!("ru".parse::<Locale>().unwrap(), Locale::Ru);
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("en-US".parse::<Locale>().unwrap(), Locale::En);
        assert!("de".parse::<Locale>().is_err());
    }

    #[test]
    fn test_column_list_format() {
        let cols = vec!["Fwd IAT Min".to_string(), "Flow IAT Min".to_string()];
        assert_eq!(format_column_list(&cols), "['Fwd IAT Min', 'Flow IAT Min']");
        assert_eq!(format_column_list(&[]), "[]");
    }

    #[test]
    fn test_missing_features_mentions_columns() {
        let cols = vec!["Fwd IAT Min".to_string()];
        assert!(Locale::Ru.missing_features(&cols).contains("признаки"));
        assert!(Locale::En.missing_features(&cols).to_lowercase().contains("columns"));
        assert!(Locale::En.missing_features(&cols).contains("'Fwd IAT Min'"));
    }

    #[test]
    fn test_extension_message_names_requirement() {
        assert!(Locale::Ru.wrong_extension().to_lowercase().contains("расширение"));
        assert!(Locale::En.wrong_extension().contains(".csv"));
    }
}
