use serde::Serialize;

/// The one envelope failed operations report through, whatever went wrong.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
