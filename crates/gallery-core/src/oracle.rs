//! Oracle error number classification.
//!
//! Every database failure is normalized to an Oracle error number (`ORA-NNNNN`)
//! before it reaches the HTTP layer. This module holds the static table that
//! turns such a number into an HTTP status, a client-facing message and a
//! retryability flag. The API crate renders the result into the error envelope.

use serde::{Deserialize, Serialize};

/// Broad category of a classified database error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OraCategory {
    /// Unique key collision.
    UniqueViolation,
    /// Referential integrity failure.
    ForeignKeyViolation,
    /// NOT NULL, CHECK, length or format problems with supplied data.
    InvalidData,
    /// Lock contention, deadlock or serialization failure.
    Concurrency,
    /// Statement cancelled by the client.
    Cancelled,
    /// Missing privileges.
    Permission,
    /// Schema mismatch between the application and the database.
    Schema,
    /// Database unreachable or out of resources.
    Unavailable,
    /// Error raised by application code running inside the database.
    Application,
    /// Anything not in the table.
    Unknown,
}

/// Result of classifying an Oracle error number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OraClassification {
    /// The Oracle error number that was classified.
    pub code: u32,
    /// HTTP status code to respond with.
    pub status: u16,
    /// Message safe to show to API clients.
    pub message: String,
    /// Whether the operation may succeed if retried.
    pub retryable: bool,
    /// Error category.
    pub category: OraCategory,
}

impl OraClassification {
    /// Formats the code the way Oracle prints it, e.g. `ORA-00001`.
    pub fn ora_code(&self) -> String {
        format_ora_code(self.code)
    }
}

struct OraEntry {
    code: u32,
    status: u16,
    retryable: bool,
    category: OraCategory,
    message: &'static str,
}

const fn entry(
    code: u32,
    status: u16,
    retryable: bool,
    category: OraCategory,
    message: &'static str,
) -> OraEntry {
    OraEntry {
        code,
        status,
        retryable,
        category,
        message,
    }
}

/// Known Oracle error numbers. Sorted by code.
const ORA_TABLE: &[OraEntry] = &[
    entry(1, 409, false, OraCategory::UniqueViolation, "A record with the same unique value already exists"),
    entry(18, 503, true, OraCategory::Unavailable, "Maximum number of database sessions exceeded"),
    entry(20, 503, true, OraCategory::Unavailable, "Maximum number of database processes exceeded"),
    entry(54, 409, true, OraCategory::Concurrency, "The record is locked by another operation"),
    entry(60, 409, true, OraCategory::Concurrency, "A deadlock was detected while updating the record"),
    entry(904, 500, false, OraCategory::Schema, "Invalid column reference in database query"),
    entry(942, 500, false, OraCategory::Schema, "Database table or view does not exist"),
    entry(1013, 408, false, OraCategory::Cancelled, "The database operation was cancelled"),
    entry(1017, 503, false, OraCategory::Unavailable, "Database authentication failed"),
    entry(1031, 403, false, OraCategory::Permission, "Insufficient privileges for this database operation"),
    entry(1400, 400, false, OraCategory::InvalidData, "A required field is missing"),
    entry(1407, 400, false, OraCategory::InvalidData, "A required field cannot be cleared"),
    entry(1438, 400, false, OraCategory::InvalidData, "A numeric value exceeds the allowed precision"),
    entry(1555, 503, true, OraCategory::Unavailable, "The database snapshot is too old"),
    entry(1722, 400, false, OraCategory::InvalidData, "A value is not a valid number"),
    entry(1843, 400, false, OraCategory::InvalidData, "A date contains an invalid month"),
    entry(1847, 400, false, OraCategory::InvalidData, "A date contains an invalid day of month"),
    entry(1861, 400, false, OraCategory::InvalidData, "A date does not match the expected format"),
    entry(2290, 400, false, OraCategory::InvalidData, "A value violates a check constraint"),
    entry(2291, 400, false, OraCategory::ForeignKeyViolation, "A referenced record does not exist"),
    entry(2292, 400, false, OraCategory::ForeignKeyViolation, "The record is still referenced by other records"),
    entry(3113, 503, true, OraCategory::Unavailable, "The database connection was lost"),
    entry(3114, 503, true, OraCategory::Unavailable, "Not connected to the database"),
    entry(4031, 503, true, OraCategory::Unavailable, "The database is out of shared memory"),
    entry(8177, 409, true, OraCategory::Concurrency, "The record was modified by a concurrent transaction"),
    entry(12170, 503, true, OraCategory::Unavailable, "Timed out connecting to the database"),
    entry(12514, 503, true, OraCategory::Unavailable, "The database service is not available"),
    entry(12541, 503, true, OraCategory::Unavailable, "The database listener is not reachable"),
    entry(12899, 400, false, OraCategory::InvalidData, "A value is too long for its field"),
];

/// User-defined errors raised with `RAISE_APPLICATION_ERROR`.
const APPLICATION_ERROR_RANGE: std::ops::RangeInclusive<u32> = 20000..=20999;

/// Classifies an Oracle error number.
///
/// Unknown numbers map to HTTP 500 with the number embedded in the message.
pub fn classify(code: u32) -> OraClassification {
    if let Ok(idx) = ORA_TABLE.binary_search_by_key(&code, |e| e.code) {
        let e = &ORA_TABLE[idx];
        return OraClassification {
            code,
            status: e.status,
            message: e.message.to_string(),
            retryable: e.retryable,
            category: e.category,
        };
    }

    if APPLICATION_ERROR_RANGE.contains(&code) {
        return OraClassification {
            code,
            status: 422,
            message: format!("Business rule violated ({})", format_ora_code(code)),
            retryable: false,
            category: OraCategory::Application,
        };
    }

    OraClassification {
        code,
        status: 500,
        message: format!("Unexpected database error ({})", format_ora_code(code)),
        retryable: false,
        category: OraCategory::Unknown,
    }
}

/// Returns true if the code is listed in the classification table.
pub fn is_known(code: u32) -> bool {
    ORA_TABLE.binary_search_by_key(&code, |e| e.code).is_ok()
        || APPLICATION_ERROR_RANGE.contains(&code)
}

/// All codes listed in the table, in ascending order.
pub fn known_codes() -> impl Iterator<Item = u32> {
    ORA_TABLE.iter().map(|e| e.code)
}

/// Formats an error number as `ORA-NNNNN`.
pub fn format_ora_code(code: u32) -> String {
    format!("ORA-{:05}", code)
}

/// Extracts the first `ORA-NNNNN` number from a driver message.
pub fn parse_ora_code(message: &str) -> Option<u32> {
    let mut rest = message;
    while let Some(pos) = rest.find("ORA-") {
        let digits: String = rest[pos + 4..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.len() == 5 {
            return digits.parse().ok();
        }
        rest = &rest[pos + 4..];
    }
    None
}

/// Translates a PostgreSQL SQLSTATE or SQLite result code into the
/// equivalent Oracle error number.
pub fn from_sql_state(state: &str) -> Option<u32> {
    let code = match state {
        // PostgreSQL SQLSTATE
        "23505" => 1,
        "23503" => 2291,
        "23502" => 1400,
        "23514" => 2290,
        "22001" => 12899,
        "22003" => 1438,
        "22P02" => 1722,
        "22007" | "22008" => 1861,
        "40P01" => 60,
        "40001" => 8177,
        "55P03" => 54,
        "57014" => 1013,
        "42501" => 1031,
        "42P01" => 942,
        "42703" => 904,
        "53300" => 18,
        "53200" => 4031,
        "28P01" | "28000" => 1017,
        "08000" | "08003" | "08006" => 3113,
        "08001" => 12541,
        // SQLite primary/extended result codes
        "5" | "6" | "261" | "262" => 54,
        "517" => 8177,
        "1555" | "2067" => 1,
        "787" => 2291,
        "1299" => 1400,
        "275" => 2290,
        "9" => 1013,
        "23" => 1031,
        "14" => 12541,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_unique() {
        let codes: Vec<u32> = known_codes().collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_documented_mappings() {
        let unique = classify(1);
        assert_eq!(unique.status, 409);
        assert_eq!(unique.category, OraCategory::UniqueViolation);
        assert!(!unique.retryable);

        let fk = classify(2291);
        assert_eq!(fk.status, 400);
        assert_eq!(fk.category, OraCategory::ForeignKeyViolation);

        let deadlock = classify(60);
        assert_eq!(deadlock.status, 409);
        assert!(deadlock.retryable);

        assert_eq!(classify(12541).status, 503);
        assert_eq!(classify(1031).status, 403);
        assert_eq!(classify(1013).status, 408);
    }

    #[test]
    fn test_every_known_code_is_stable() {
        for code in known_codes() {
            let first = classify(code);
            let second = classify(code);
            assert_eq!(first, second);
            assert!(!first.message.is_empty());
            assert_ne!(first.category, OraCategory::Unknown);
            assert!((400..600).contains(&first.status), "code {}", code);
            assert!(is_known(code));
        }
    }

    #[test]
    fn test_unknown_code_embeds_number() {
        let c = classify(12345);
        assert_eq!(c.status, 500);
        assert!(c.message.contains("ORA-12345"));
        assert_eq!(c.category, OraCategory::Unknown);
        assert!(!is_known(12345));

        let small = classify(7);
        assert!(small.message.contains("ORA-00007"));
    }

    #[test]
    fn test_application_error_range() {
        let c = classify(20001);
        assert_eq!(c.status, 422);
        assert_eq!(c.category, OraCategory::Application);
        assert!(c.message.contains("ORA-20001"));
        assert_eq!(classify(21000).status, 500);
    }

    #[test]
    fn test_parse_ora_code() {
        assert_eq!(
            parse_ora_code("ORA-00001: unique constraint (GALLERY.UQ_EMAIL) violated"),
            Some(1)
        );
        assert_eq!(parse_ora_code("error: ORA-02291 parent key not found"), Some(2291));
        assert_eq!(parse_ora_code("ORA-12 broken ORA-00060 deadlock"), Some(60));
        assert_eq!(parse_ora_code("duplicate key value"), None);
    }

    #[test]
    fn test_from_sql_state() {
        assert_eq!(from_sql_state("23505"), Some(1));
        assert_eq!(from_sql_state("40P01"), Some(60));
        assert_eq!(from_sql_state("2067"), Some(1));
        assert_eq!(from_sql_state("787"), Some(2291));
        assert_eq!(from_sql_state("5"), Some(54));
        assert_eq!(from_sql_state("XX000"), None);
    }

    #[test]
    fn test_ora_code_format() {
        assert_eq!(format_ora_code(1), "ORA-00001");
        assert_eq!(classify(12899).ora_code(), "ORA-12899");
    }
}
