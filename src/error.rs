pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that stop the monitor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] crate::config::Error),
    #[error(transparent)]
    Discovery(#[from] crate::discovery::Error),
    #[error(transparent)]
    Alarm(#[from] crate::alarm::Error),
    #[error(transparent)]
    Api(#[from] crate::api::Error),
    #[error("system clock is before the UNIX epoch: {0}")]
    Clock(#[from] std::time::SystemTimeError),
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ResultOkLogExt<T, E> {
    /// Logs the error under `target` and discards it.
    fn ok_log(self, target: &str) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self, target: &str) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!(target: target, "{err}");
                None
            }
        }
    }
}
