//! Labor contract records.
//!
//! # Invariants
//! - `contract_number` follows `WT` + 8 zero-padded digits when assigned by a
//!   store, and grows with creation order within one store.
//! - `blocked_reason` is meaningful only while `is_blocked` is set.

use super::entity::{
    Entity, EntitySchema, FieldKind, FieldMapping, SequenceFormat, CREATED_AT_FIELD, ID_FIELD,
};
use serde::{Deserialize, Serialize};

/// Used when a record carries no usable contract type.
pub const DEFAULT_CONTRACT_TYPE: &str = "تعاقد أجير";

pub const CONTRACT_NUMBER: SequenceFormat = SequenceFormat {
    canonical: "contractNumber",
    wire: "contract_number",
    prefix: "WT",
    width: 8,
};

const IS_BLOCKED: FieldMapping = FieldMapping::flag("isBlocked", "is_blocked");

const CONTRACT_FIELDS: &[FieldMapping] = &[
    ID_FIELD,
    FieldMapping::new(
        "contractType",
        "contract_type",
        FieldKind::Label {
            default: DEFAULT_CONTRACT_TYPE,
        },
    ),
    FieldMapping::text(CONTRACT_NUMBER.canonical, CONTRACT_NUMBER.wire),
    FieldMapping::text("workerName", "worker_name"),
    FieldMapping::text("workerProfession", "worker_profession"),
    FieldMapping::text("workerIdNumber", "worker_id_number"),
    FieldMapping::text("workerNationality", "worker_nationality"),
    FieldMapping::text("providerEntity", "provider_entity"),
    FieldMapping::text("providerHrId", "provider_hr_id"),
    FieldMapping::text("beneficiaryEntity", "beneficiary_entity"),
    FieldMapping::text("beneficiaryHrId", "beneficiary_hr_id"),
    FieldMapping::text("contractSummary", "contract_summary"),
    FieldMapping::text("startDate", "start_date"),
    FieldMapping::text("endDate", "end_date"),
    FieldMapping::text("workLocations", "work_locations"),
    IS_BLOCKED,
    FieldMapping::text("blockedReason", "blocked_reason"),
    CREATED_AT_FIELD,
];

pub const CONTRACT_SCHEMA: EntitySchema = EntitySchema {
    name: "contract",
    table: "contracts",
    storage_key: "ajeer_contracts",
    fields: CONTRACT_FIELDS,
    status: IS_BLOCKED,
    sequence: Some(CONTRACT_NUMBER),
};

fn default_contract_type() -> String {
    DEFAULT_CONTRACT_TYPE.to_string()
}

/// Canonical contract record as returned by every read and write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_contract_type")]
    pub contract_type: String,
    pub contract_number: Option<String>,
    pub worker_name: Option<String>,
    pub worker_profession: Option<String>,
    pub worker_id_number: Option<String>,
    pub worker_nationality: Option<String>,
    pub provider_entity: Option<String>,
    pub provider_hr_id: Option<String>,
    pub beneficiary_entity: Option<String>,
    pub beneficiary_hr_id: Option<String>,
    pub contract_summary: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub work_locations: Option<String>,
    #[serde(default)]
    pub is_blocked: bool,
    pub blocked_reason: Option<String>,
    pub created_at: Option<String>,
}

impl Entity for Contract {
    type Draft = ContractDraft;

    const SCHEMA: &'static EntitySchema = &CONTRACT_SCHEMA;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Partial contract accepted by `save`.
///
/// `id: None` creates a record; `id: Some(..)` updates the fields that are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_hr_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_hr_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_locations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,
}

impl From<Contract> for ContractDraft {
    fn from(value: Contract) -> Self {
        Self {
            id: Some(value.id).filter(|id| !id.is_empty()),
            contract_type: Some(value.contract_type),
            contract_number: value.contract_number,
            worker_name: value.worker_name,
            worker_profession: value.worker_profession,
            worker_id_number: value.worker_id_number,
            worker_nationality: value.worker_nationality,
            provider_entity: value.provider_entity,
            provider_hr_id: value.provider_hr_id,
            beneficiary_entity: value.beneficiary_entity,
            beneficiary_hr_id: value.beneficiary_hr_id,
            contract_summary: value.contract_summary,
            start_date: value.start_date,
            end_date: value.end_date,
            work_locations: value.work_locations,
            is_blocked: Some(value.is_blocked),
            blocked_reason: value.blocked_reason,
        }
    }
}
