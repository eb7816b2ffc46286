//! Coat-of-arms rewards: catalog reads and per-visitor unlock state.

use curio_core::envelope::Envelope;
use curio_core::types::DbId;
use curio_store::models::{CoaColor, CoaPart, VisitorProfile, VisitorPart};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRequest {
    pub user: DbId,
    pub part: DbId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorsRequest {
    pub user: DbId,
    pub primary_color: Option<DbId>,
    pub secondary_color: Option<DbId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsData {
    pub parts: Vec<CoaPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorsData {
    pub colors: Vec<CoaColor>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorPartsData {
    pub parts: Vec<VisitorPart>,
}

pub fn get_coa_parts(state: &AppState) -> Envelope<PartsData> {
    Envelope::ok(
        PartsData {
            parts: state.store.coa.parts().to_vec(),
        },
        "Parts found",
    )
}

pub fn get_coa_colors(state: &AppState) -> Envelope<ColorsData> {
    Envelope::ok(
        ColorsData {
            colors: state.store.coa.colors().to_vec(),
        },
        "Colors found",
    )
}

pub async fn get_visitor_coa_parts(state: &AppState, visitor_id: DbId) -> Envelope<VisitorPartsData> {
    if let Err(e) = state.store.visitors.get(visitor_id).await {
        return e.into();
    }
    Envelope::ok(
        VisitorPartsData {
            parts: state.store.coa.parts_for_visitor(visitor_id).await,
        },
        "Parts found",
    )
}

/// Unlock a catalog part for a visitor. Idempotent; unlocking from an
/// exhibit and from the app go through the same path.
pub async fn unlock_coa_part(state: &AppState, req: PartRequest) -> Envelope<VisitorPartsData> {
    if let Err(e) = state.store.visitors.get(req.user).await {
        return e.into();
    }
    if let Err(e) = state.store.coa.grant(req.user, req.part, false).await {
        return e.into();
    }
    tracing::debug!(visitor_id = req.user, part = req.part, "Coat-of-arms part unlocked");
    Envelope::created(
        VisitorPartsData {
            parts: state.store.coa.parts_for_visitor(req.user).await,
        },
        "Part unlocked",
    )
}

/// Swap the active part within its category; the part must be unlocked.
pub async fn change_visitor_coa_part(state: &AppState, req: PartRequest) -> Envelope<VisitorPartsData> {
    if let Err(e) = state.store.visitors.get(req.user).await {
        return e.into();
    }
    if let Err(e) = state.store.coa.set_active_part(req.user, req.part).await {
        return e.into();
    }
    Envelope::updated(
        VisitorPartsData {
            parts: state.store.coa.parts_for_visitor(req.user).await,
        },
        "Part changed",
    )
}

pub async fn change_visitor_coa_colors(
    state: &AppState,
    req: ColorsRequest,
) -> Envelope<VisitorProfile> {
    match state
        .store
        .visitors
        .update(req.user, |v| {
            if req.primary_color.is_some() {
                v.primary_color = req.primary_color;
            }
            if req.secondary_color.is_some() {
                v.secondary_color = req.secondary_color;
            }
            VisitorProfile::from(&*v)
        })
        .await
    {
        Ok(profile) => Envelope::updated(profile, "Colors changed"),
        Err(e) => e.into(),
    }
}
