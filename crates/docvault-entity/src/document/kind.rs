//! Document classification enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use docvault_core::AppError;

/// Business entity a document is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "linked_entity_type", rename_all = "snake_case")]
pub enum LinkedEntityType {
    /// A borrower record.
    Borrower,
    /// A loan account.
    LoanAccount,
    /// A legal case.
    Case,
}

impl LinkedEntityType {
    /// Return the type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Borrower => "borrower",
            Self::LoanAccount => "loan_account",
            Self::Case => "case",
        }
    }
}

impl fmt::Display for LinkedEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkedEntityType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "borrower" => Ok(Self::Borrower),
            "loan_account" | "loanaccount" => Ok(Self::LoanAccount),
            "case" => Ok(Self::Case),
            _ => Err(AppError::validation(format!(
                "Invalid linked entity type: '{s}'. Expected one of: borrower, loan_account, case"
            ))),
        }
    }
}

/// Classification of a legal document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_type", rename_all = "snake_case")]
pub enum DocumentType {
    /// Demand or legal notice sent to a party.
    LegalNotice,
    /// Order issued by a court or tribunal.
    CourtOrder,
    /// Sworn statement.
    Affidavit,
    /// Loan or settlement agreement.
    Agreement,
    /// Power of attorney.
    PowerOfAttorney,
    /// Identity / KYC paperwork.
    KycDocument,
    /// Letters and e-mail.
    Correspondence,
    /// Exhibits and evidence.
    Evidence,
    /// Anything else.
    Other,
}

impl DocumentType {
    /// Return the type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegalNotice => "legal_notice",
            Self::CourtOrder => "court_order",
            Self::Affidavit => "affidavit",
            Self::Agreement => "agreement",
            Self::PowerOfAttorney => "power_of_attorney",
            Self::KycDocument => "kyc_document",
            Self::Correspondence => "correspondence",
            Self::Evidence => "evidence",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "legal_notice" => Ok(Self::LegalNotice),
            "court_order" => Ok(Self::CourtOrder),
            "affidavit" => Ok(Self::Affidavit),
            "agreement" => Ok(Self::Agreement),
            "power_of_attorney" => Ok(Self::PowerOfAttorney),
            "kyc_document" | "kyc" => Ok(Self::KycDocument),
            "correspondence" => Ok(Self::Correspondence),
            "evidence" => Ok(Self::Evidence),
            "other" => Ok(Self::Other),
            _ => Err(AppError::validation(format!("Invalid document type: '{s}'"))),
        }
    }
}

/// Lifecycle state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_status", rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Readable and accepting new versions.
    Active,
    /// Deleted; storage cleanup has been attempted.
    Deleted,
}

impl DocumentStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase and fold spaces/dashes to underscores.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace([' ', '-'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_entity_from_str() {
        assert_eq!(
            "Loan Account".parse::<LinkedEntityType>().unwrap(),
            LinkedEntityType::LoanAccount
        );
        assert_eq!("CASE".parse::<LinkedEntityType>().unwrap(), LinkedEntityType::Case);
        assert!("customer".parse::<LinkedEntityType>().is_err());
    }

    #[test]
    fn test_document_type_round_trips_through_str() {
        for ty in [
            DocumentType::LegalNotice,
            DocumentType::CourtOrder,
            DocumentType::PowerOfAttorney,
            DocumentType::Other,
        ] {
            assert_eq!(ty.as_str().parse::<DocumentType>().unwrap(), ty);
        }
    }
}
