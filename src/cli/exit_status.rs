use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): nothing to do, or changes were applied
/// - `Failure` (1): a dry run found changes to make
/// - `Error` (2): a file failed to parse or the command failed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    /// Work is pending (dry run with changes).
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
