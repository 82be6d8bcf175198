//! Book instance (physical copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Loan status of a single copy. DB stores the one-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    #[serde(rename = "m")]
    Maintenance,
    #[serde(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "r")]
    Reserved,
}

impl LoanStatus {
    /// One-character status code used on the wire and in the database
    pub fn as_code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    /// Human-readable label for this status
    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }

    /// All (code, label) pairs, in declaration order
    pub fn labels() -> [(&'static str, &'static str); 4] {
        [
            ("m", "Maintenance"),
            ("o", "On loan"),
            ("a", "Available"),
            ("r", "Reserved"),
        ]
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Maintenance
    }
}

impl From<&str> for LoanStatus {
    fn from(s: &str) -> Self {
        match s {
            "o" => LoanStatus::OnLoan,
            "a" => LoanStatus::Available,
            "r" => LoanStatus::Reserved,
            _ => LoanStatus::Maintenance,
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

// SQLx conversion for LoanStatus
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        Ok(LoanStatus::from(s.trim()))
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_code().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Copy row with the joined context shown in borrowed lists and renewal
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstanceDetails {
    /// Opaque copy identifier, generated at creation
    pub id: Uuid,
    pub book_id: i32,
    pub book_title: String,
    pub imprint: String,
    /// Only meaningful while the copy is on loan
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    /// Only meaningful while the copy is on loan
    pub borrower_id: Option<i32>,
    /// Borrower login, from the list query's join
    pub borrower: Option<String>,
}

impl BookInstanceDetails {
    /// "{id} ({book title})" wherever a single copy is referenced
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.id, self.book_title)
    }
}

/// Create copy request (administrative)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookInstance {
    pub book_id: i32,
    #[validate(length(max = 200, message = "Imprint must be at most 200 characters"))]
    #[serde(default)]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    #[serde(default)]
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

/// Renewal submission for a copy on loan
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenewBookInstance {
    pub renewal_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for (code, _) in LoanStatus::labels() {
            assert_eq!(LoanStatus::from(code).as_code(), code);
        }
    }

    #[test]
    fn status_labels() {
        assert_eq!(LoanStatus::OnLoan.label(), "On loan");
        assert_eq!(LoanStatus::Maintenance.label(), "Maintenance");
        assert_eq!(LoanStatus::labels().len(), 4);
    }

    #[test]
    fn unknown_status_code_reads_as_maintenance() {
        assert_eq!(LoanStatus::from("x"), LoanStatus::Maintenance);
        assert_eq!(LoanStatus::from(""), LoanStatus::Maintenance);
    }

    #[test]
    fn default_status_is_maintenance() {
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
    }

    #[test]
    fn display_name_combines_id_and_title() {
        let id = Uuid::new_v4();
        let details = BookInstanceDetails {
            id,
            book_id: 1,
            book_title: "The Left Hand of Darkness".to_string(),
            imprint: String::new(),
            due_back: None,
            status: LoanStatus::Available,
            borrower_id: None,
            borrower: None,
        };
        assert_eq!(
            details.display_name(),
            format!("{} (The Left Hand of Darkness)", id)
        );
    }
}
