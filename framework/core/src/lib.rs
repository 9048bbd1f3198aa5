mod abort;
mod checks;
mod shutdown;

pub mod prelude {
    pub use crate::abort::IterationAbort;
    pub use crate::checks::{
        evaluate, require_all, CheckResult, CheckSubject, IterationOutcome, IterationStatus,
        ResponseSnapshot,
    };
    pub use crate::shutdown::{DelegatedShutdownListener, ShutdownHandle};
}
