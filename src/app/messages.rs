use crate::model::{MetricsComparison, SolutionId};
use crate::workflow::apply::{ApplyError, ApplyOutcome};
use crate::workflow::commit::CommitError;
use crate::workflow::dispatch::{DispatchError, DispatchOutcome};
use crate::workflow::intake::{IntakeError, IntakeOutcome};
use crate::workflow::validate::{ValidateError, Verdict};
use crate::workflow::viewer::{FileView, ViewerError};

/// Messages from background tasks to the main UI thread
pub enum BackgroundMessage {
    /// Repository cloned, analyzed and listed
    IntakeDone(Result<IntakeOutcome, IntakeError>),
    FileLoaded(Result<FileView, ViewerError>),
    SolutionsReady(Result<DispatchOutcome, DispatchError>),
    /// Feedback round finished for one solution
    SolutionUpdated {
        id: SolutionId,
        result: Result<String, DispatchError>,
    },
    MetricsReady {
        id: SolutionId,
        result: Result<Option<MetricsComparison>, DispatchError>,
    },
    Applied {
        id: SolutionId,
        result: Result<ApplyOutcome, ApplyError>,
    },
    Validated(Result<Verdict, ValidateError>),
    /// Server confirmation text of a commit
    Committed(Result<String, CommitError>),
    /// Generic error (task crashes)
    Error(String),
}
