use webclone_core::ProgressEvent;

/// Destination for job progress events.
///
/// Emission is best-effort and must not block or fail the caller.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}
