use std::fmt;

#[derive(Debug, Clone)]
pub enum TrackerError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    ConstraintViolation(String),
    Validation(String),
    NotFound(String),
    FileOperation(String),
    Serialization(String),
}

impl TrackerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            TrackerError::DatabaseConfig(_) => "E001",
            TrackerError::DatabaseConnection(_) => "E002",
            TrackerError::DatabaseOperation(_) => "E003",
            TrackerError::ConstraintViolation(_) => "E004",
            TrackerError::Validation(_) => "E005",
            TrackerError::NotFound(_) => "E006",
            TrackerError::FileOperation(_) => "E007",
            TrackerError::Serialization(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            TrackerError::DatabaseConfig(_) => "Database Configuration Error",
            TrackerError::DatabaseConnection(_) => "Database Connection Error",
            TrackerError::DatabaseOperation(_) => "Database Operation Error",
            TrackerError::ConstraintViolation(_) => "Constraint Violation",
            TrackerError::Validation(_) => "Validation Error",
            TrackerError::NotFound(_) => "Resource Not Found",
            TrackerError::FileOperation(_) => "File Operation Error",
            TrackerError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            TrackerError::DatabaseConfig(msg)
            | TrackerError::DatabaseConnection(msg)
            | TrackerError::DatabaseOperation(msg)
            | TrackerError::ConstraintViolation(msg)
            | TrackerError::Validation(msg)
            | TrackerError::NotFound(msg)
            | TrackerError::FileOperation(msg)
            | TrackerError::Serialization(msg) => msg,
        }
    }

    /// Whether a batch may skip this failure and carry on with the next candidate.
    pub fn is_candidate_local(&self) -> bool {
        matches!(
            self,
            TrackerError::ConstraintViolation(_) | TrackerError::Validation(_)
        )
    }

    /// 格式化为彩色输出
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

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TrackerError {}

// 便捷的构造函数
impl TrackerError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        TrackerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        TrackerError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        TrackerError::DatabaseOperation(msg.into())
    }

    pub fn constraint_violation<T: Into<String>>(msg: T) -> Self {
        TrackerError::ConstraintViolation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        TrackerError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        TrackerError::NotFound(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        TrackerError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        TrackerError::Serialization(msg.into())
    }
}

impl From<sea_orm::DbErr> for TrackerError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) => {
                TrackerError::DatabaseConnection(err.to_string())
            }
            _ => TrackerError::DatabaseOperation(err.to_string()),
        }
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_unique() {
        let errors = [
            TrackerError::database_config("x"),
            TrackerError::database_connection("x"),
            TrackerError::database_operation("x"),
            TrackerError::constraint_violation("x"),
            TrackerError::validation("x"),
            TrackerError::not_found("x"),
            TrackerError::file_operation("x"),
            TrackerError::serialization("x"),
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_candidate_local_errors() {
        assert!(TrackerError::constraint_violation("fk").is_candidate_local());
        assert!(TrackerError::validation("empty").is_candidate_local());
        assert!(!TrackerError::database_connection("down").is_candidate_local());
        assert!(!TrackerError::database_operation("boom").is_candidate_local());
    }

    #[test]
    fn test_conn_db_err_maps_to_connection() {
        let err: TrackerError =
            sea_orm::DbErr::Conn(sea_orm::error::RuntimeErr::Internal("refused".into())).into();
        assert!(matches!(err, TrackerError::DatabaseConnection(_)));
    }

    #[test]
    fn test_format_simple() {
        let err = TrackerError::not_found("device alpha");
        assert_eq!(err.format_simple(), "Resource Not Found: device alpha");
        assert_eq!(err.to_string(), err.format_simple());
    }
}
