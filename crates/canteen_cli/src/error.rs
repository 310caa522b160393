//! CLI error type: every failure a command can end with.

use canteen_core::{
    CalendarError, ConfigError, DbError, OrderError, OrderErrorKind, RepoError, ReportError,
    RoleError,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Logging(String),
    Db(DbError),
    Repo(RepoError),
    /// `--as-user` or `--user` names no known login.
    UnknownUser(String),
    InvalidArgument(String),
    Order(OrderError),
    Report(ReportError),
    /// JSON rendering of a result failed.
    Render(serde_json::Error),
    Output {
        path: Option<PathBuf>,
        source: std::io::Error,
    },
}

impl CliError {
    /// Process exit code: 2 for rejected requests, 1 for failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Order(err) if err.kind() == OrderErrorKind::Unavailable => 1,
            Self::Report(ReportError::Unavailable(_)) => 1,
            Self::UnknownUser(_) | Self::InvalidArgument(_) | Self::Order(_) | Self::Report(_) => 2,
            _ => 1,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::UnknownUser(login) => write!(f, "unknown user login `{login}`"),
            Self::InvalidArgument(message) => write!(f, "{message}"),
            Self::Order(err) => write!(f, "{err} [{}]", err.kind().as_str()),
            Self::Report(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "failed to render output: {err}"),
            Self::Output { path, source } => match path {
                Some(path) => write!(f, "failed to write `{}`: {source}", path.display()),
                None => write!(f, "failed to write output: {source}"),
            },
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Order(err) => Some(err),
            Self::Report(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::Output { source, .. } => Some(source),
            Self::Logging(_) | Self::UnknownUser(_) | Self::InvalidArgument(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<OrderError> for CliError {
    fn from(value: OrderError) -> Self {
        Self::Order(value)
    }
}

impl From<ReportError> for CliError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

impl From<CalendarError> for CliError {
    fn from(value: CalendarError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

impl From<RoleError> for CliError {
    fn from(value: RoleError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_exit_with_two_and_failures_with_one() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(CliError::Order(OrderError::NotOwner(id)).exit_code(), 2);
        assert_eq!(CliError::InvalidArgument("bad".to_string()).exit_code(), 2);
        assert_eq!(CliError::UnknownUser("nobody".to_string()).exit_code(), 2);
        assert_eq!(
            CliError::Order(OrderError::Unavailable(RepoError::InvalidData(
                "broken".to_string()
            )))
            .exit_code(),
            1
        );
    }

    #[test]
    fn render_failure_is_an_internal_error() {
        let json_err = serde_json::from_str::<u8>("not json").expect_err("invalid json");
        let err = CliError::Render(json_err);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().starts_with("failed to render output"));
        assert!(err.source().is_some());
    }
}
