//! Mapping of sqlx errors onto the pipeline error type.

use enricher_core::Error;

/// SQLSTATE 22001: value too long for the column.
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

/// Whether a SQLSTATE code means the row itself was rejected.
///
/// Class 23 covers unique, not-null, check and foreign-key violations.
pub fn is_constraint_code(code: &str) -> bool {
    code.starts_with("23") || code == STRING_DATA_RIGHT_TRUNCATION
}

pub fn map_sqlx_error(e: sqlx::Error) -> Error {
    match e {
        sqlx::Error::Database(db) => {
            let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
            if is_constraint_code(&code) {
                Error::constraint(code, db.message())
            } else {
                Error::database(format!("[{}] {}", code, db.message()))
            }
        }
        sqlx::Error::Io(e) => Error::transport(format!("PostgreSQL I/O error: {}", e)),
        sqlx::Error::Tls(e) => Error::transport(format!("PostgreSQL TLS error: {}", e)),
        sqlx::Error::PoolTimedOut => Error::transport("Timed out waiting for a PostgreSQL connection"),
        sqlx::Error::PoolClosed => Error::transport("PostgreSQL pool is closed"),
        other => Error::database(other.to_string()),
    }
}
