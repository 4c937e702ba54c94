use std::{error::Error, fmt};

/// Failures surfaced by the bird store. `NotFound` and `Constraint` are the
/// conditions the schema itself can produce; `Db` wraps every other driver
/// failure.
#[derive(Debug)]
pub enum StoreError {
    NotFound(i32),
    Constraint(String),
    Internal(String),
    Db(libsql::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use StoreError::*;
        match self {
            NotFound(id) => write!(f, "no bird with id {}", id),
            Constraint(s) => write!(f, "constraint violation: {}", s),
            Internal(s) => write!(f, "store error: {}", s),
            Db(e) => write!(f, "database error: {}", e),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use StoreError::*;
        match self {
            Db(e) => Some(e),
            _ => None,
        }
    }
}

impl From<libsql::Error> for StoreError {
    fn from(error: libsql::Error) -> Self {
        // sqlite reports schema rejections only through its message text
        let text = error.to_string();
        if text.contains("constraint") || text.contains("CONSTRAINT") || text.contains("datatype mismatch") {
            StoreError::Constraint(text)
        } else {
            StoreError::Db(error)
        }
    }
}
