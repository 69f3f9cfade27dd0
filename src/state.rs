/// Where a [`RequestMachine`](crate::RequestMachine) is in a request's life.
///
/// States only move forward: `AwaitingHead`, then optionally `AwaitingBody`,
/// then `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequestState {
    AwaitingHead,
    AwaitingBody,
    Done,
}
