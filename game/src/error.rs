use snafu::Snafu;

/// How a request to the room service can fail, as far as reconciliation
/// cares.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum RemoteError {
    /// The room (or game) no longer exists. Fatal to the session.
    #[snafu(display("room no longer exists"))]
    NotFound,

    /// The server refused the request and said why.
    #[snafu(display("request rejected with status {}: {}", status, message))]
    Rejected { status: u16, message: String },

    /// Anything that the next poll may well not hit again: network trouble,
    /// server errors, bodies that don't decode.
    #[snafu(display("transient failure: {}", reason))]
    Transient { reason: String },
}

/// A status body that decoded, but can't be turned into a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum SnapshotError {
    #[snafu(display("status has no current_user"))]
    MissingCurrentUser,

    #[snafu(display("current user {} is not among the players", username))]
    UnknownCurrentUser { username: String },
}
