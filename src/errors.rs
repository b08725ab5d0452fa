use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EngagementError {
    ReaderNotFound(String),
    ArticleNotFound(String),
    StorageError(String),
    StatsUnavailable(String),
    Validation(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    Serialization(String),
}

impl EngagementError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            EngagementError::ReaderNotFound(_) => "E001",
            EngagementError::ArticleNotFound(_) => "E002",
            EngagementError::StorageError(_) => "E003",
            EngagementError::StatsUnavailable(_) => "E004",
            EngagementError::Validation(_) => "E005",
            EngagementError::DatabaseConfig(_) => "E006",
            EngagementError::DatabaseConnection(_) => "E007",
            EngagementError::Serialization(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            EngagementError::ReaderNotFound(_) => "Reader Not Found",
            EngagementError::ArticleNotFound(_) => "Article Not Found",
            EngagementError::StorageError(_) => "Storage Error",
            EngagementError::StatsUnavailable(_) => "Reading Stats Unavailable",
            EngagementError::Validation(_) => "Validation Error",
            EngagementError::DatabaseConfig(_) => "Database Configuration Error",
            EngagementError::DatabaseConnection(_) => "Database Connection Error",
            EngagementError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            EngagementError::ReaderNotFound(msg)
            | EngagementError::ArticleNotFound(msg)
            | EngagementError::StorageError(msg)
            | EngagementError::StatsUnavailable(msg)
            | EngagementError::Validation(msg)
            | EngagementError::DatabaseConfig(msg)
            | EngagementError::DatabaseConnection(msg)
            | EngagementError::Serialization(msg) => msg,
        }
    }

    /// Reader or article lookup failed (404-equivalent for the HTTP layer)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngagementError::ReaderNotFound(_) | EngagementError::ArticleNotFound(_)
        )
    }

    /// 格式化为彩色输出（用于 CLI 模式）
    #[cfg(feature = "cli")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for EngagementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for EngagementError {}

// 便捷的构造函数
impl EngagementError {
    pub fn reader_not_found<T: Into<String>>(reader_id: T) -> Self {
        EngagementError::ReaderNotFound(reader_id.into())
    }

    pub fn article_not_found<T: Into<String>>(article_id: T) -> Self {
        EngagementError::ArticleNotFound(article_id.into())
    }

    pub fn storage<T: Into<String>>(msg: T) -> Self {
        EngagementError::StorageError(msg.into())
    }

    pub fn stats_unavailable<T: Into<String>>(msg: T) -> Self {
        EngagementError::StatsUnavailable(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        EngagementError::Validation(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        EngagementError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        EngagementError::DatabaseConnection(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        EngagementError::Serialization(msg.into())
    }
}

impl From<sea_orm::DbErr> for EngagementError {
    fn from(err: sea_orm::DbErr) -> Self {
        EngagementError::StorageError(err.to_string())
    }
}

impl From<std::io::Error> for EngagementError {
    fn from(err: std::io::Error) -> Self {
        EngagementError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for EngagementError {
    fn from(err: serde_json::Error) -> Self {
        EngagementError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngagementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            EngagementError::reader_not_found("r"),
            EngagementError::article_not_found("a"),
            EngagementError::storage("s"),
            EngagementError::stats_unavailable("x"),
            EngagementError::validation("v"),
            EngagementError::database_config("c"),
            EngagementError::database_connection("n"),
            EngagementError::serialization("j"),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(EngagementError::reader_not_found("r1").is_not_found());
        assert!(EngagementError::article_not_found("a1").is_not_found());
        assert!(!EngagementError::storage("boom").is_not_found());
    }

    #[test]
    fn test_display_uses_simple_format() {
        let err = EngagementError::article_not_found("a-42");
        assert_eq!(err.to_string(), "Article Not Found: a-42");
    }

    #[test]
    fn test_db_err_maps_to_storage() {
        let err: EngagementError = sea_orm::DbErr::Custom("disk full".to_string()).into();
        assert!(matches!(err, EngagementError::StorageError(ref m) if m.contains("disk full")));
    }
}
