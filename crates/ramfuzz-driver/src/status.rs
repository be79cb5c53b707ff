use ramfuzz_frontend_cpp::FrontendError;
use std::path::PathBuf;

/// Outcome of a batch run over several source files.
#[derive(Debug, Default)]
pub struct RunStatus {
    /// Units the front end could not process, with the reason.
    pub failures: Vec<(PathBuf, FrontendError)>,
    /// Number of units processed successfully.
    pub units: usize,
    /// Number of harness blocks written.
    pub classes: usize,
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit code: 0 if every unit was processed, 1 otherwise.
    pub fn code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
