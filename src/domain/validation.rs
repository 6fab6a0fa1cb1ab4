//! Supplier validation rules.
//!
//! [`validate`] is pure: it looks at a fully merged candidate and the parent
//! arena and either accepts it or names the first rule it breaks. Services
//! call it inside the write transaction, before anything is persisted.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::hierarchy::{HierarchyError, SupplierTree};
use crate::entity::SupplierType;

const MAX_TEXT_LEN: usize = 255;
const MAX_EMAIL_LEN: usize = 254;
const MAX_HOUSE_NUMBER_LEN: usize = 10;
const DEBT_DECIMAL_PLACES: u32 = 2;
/// decimal(10, 2) leaves eight integer digits.
const DEBT_LIMIT: i64 = 100_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a factory may not have a supplier.")]
    FactoryWithSupplier,

    #[error("a factory may not carry a debt.")]
    FactoryWithDebt,

    #[error("a top-level supplier may not carry a debt.")]
    TopLevelWithDebt,

    #[error("debt may not be negative.")]
    NegativeDebt,

    #[error("a supplier may not reference itself as its own supplier.")]
    SelfReference,

    #[error("{0}")]
    Hierarchy(#[from] HierarchyError),

    #[error("{field}: {reason}")]
    Field {
        field: &'static str,
        reason: String,
    },
}

impl ValidationError {
    fn field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Field {
            field,
            reason: reason.into(),
        }
    }
}

/// Complete prospective state of a supplier row.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplierCandidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    pub supplier_type: SupplierType,
    pub debt: Decimal,
    pub supplier: Option<Uuid>,
}

pub fn validate(candidate: &SupplierCandidate, tree: &SupplierTree) -> Result<(), ValidationError> {
    validate_fields(candidate)?;
    validate_rules(candidate, tree)
}

/// The five supplier rules, checked in order; the first failure wins.
pub fn validate_rules(
    candidate: &SupplierCandidate,
    tree: &SupplierTree,
) -> Result<(), ValidationError> {
    let is_factory = candidate.supplier_type == SupplierType::Factory;
    let self_referencing = candidate.supplier == Some(candidate.id);

    if is_factory && candidate.supplier.is_some() {
        return Err(ValidationError::FactoryWithSupplier);
    }
    if is_factory && !candidate.debt.is_zero() {
        return Err(ValidationError::FactoryWithDebt);
    }

    // A self link has no level to speak of; the self-reference rule reports it.
    let level = if self_referencing {
        None
    } else {
        Some(tree.level_with_parent(candidate.id, candidate.supplier)?)
    };
    if level == Some(0) && !candidate.debt.is_zero() {
        return Err(ValidationError::TopLevelWithDebt);
    }

    if candidate.debt < Decimal::ZERO {
        return Err(ValidationError::NegativeDebt);
    }
    if self_referencing {
        return Err(ValidationError::SelfReference);
    }

    Ok(())
}

pub fn validate_fields(candidate: &SupplierCandidate) -> Result<(), ValidationError> {
    required_text("name", &candidate.name, MAX_TEXT_LEN)?;
    required_text("email", &candidate.email, MAX_EMAIL_LEN)?;
    if !looks_like_email(&candidate.email) {
        return Err(ValidationError::field(
            "email",
            "enter a valid email address",
        ));
    }
    required_text("country", &candidate.country, MAX_TEXT_LEN)?;
    required_text("city", &candidate.city, MAX_TEXT_LEN)?;
    required_text("street", &candidate.street, MAX_TEXT_LEN)?;
    required_text("house_number", &candidate.house_number, MAX_HOUSE_NUMBER_LEN)?;

    if candidate.debt.normalize().scale() > DEBT_DECIMAL_PLACES {
        return Err(ValidationError::field(
            "debt",
            format!("at most {DEBT_DECIMAL_PLACES} decimal places are allowed"),
        ));
    }
    if candidate.debt.abs() >= Decimal::from(DEBT_LIMIT) {
        return Err(ValidationError::field(
            "debt",
            "at most 10 digits in total are allowed",
        ));
    }

    Ok(())
}

pub fn required_text(field: &'static str, value: &str, max_len: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::field(field, "this field may not be blank"));
    }
    if value.chars().count() > max_len {
        return Err(ValidationError::field(
            field,
            format!("ensure this field has no more than {max_len} characters"),
        ));
    }
    Ok(())
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
        }
        None => false,
    }
}
