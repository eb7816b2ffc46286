//! Coat-of-arms reward catalog and per-visitor unlock state.

use curio_core::types::DbId;
use serde::Serialize;

/// Part category (shield, symbol, helmet, mantling).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoaType {
    pub id: DbId,
    pub description: String,
}

/// A collectible part of the coat of arms.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoaPart {
    pub id: DbId,
    pub coa_type_id: DbId,
    pub name: String,
    pub image: String,
}

/// A selectable color.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoaColor {
    pub id: DbId,
    pub name: String,
}

/// Join record: a part a visitor has unlocked, and whether it is the active
/// choice within its category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorCoaPart {
    pub visitor_id: DbId,
    pub coa_part_id: DbId,
    pub is_active: bool,
}

/// Catalog part annotated with the visitor's activation flag; what the
/// client renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorPart {
    #[serde(flatten)]
    pub part: CoaPart,
    pub is_active: bool,
}
