//! Health certificate records.

use super::entity::{Entity, EntitySchema, FieldMapping, CREATED_AT_FIELD, ID_FIELD};
use serde::{Deserialize, Serialize};

const IS_DISABLED: FieldMapping = FieldMapping::flag("isDisabled", "is_disabled");

const CERTIFICATE_FIELDS: &[FieldMapping] = &[
    ID_FIELD,
    FieldMapping::text("certificateNumber", "certificate_number"),
    FieldMapping::text("issueDate", "issue_date"),
    FieldMapping::text("issuer", "issuer"),
    FieldMapping::text("expiryDate", "expiry_date"),
    FieldMapping::text("holderName", "holder_name"),
    // Older local records kept the holder id under the form field name.
    FieldMapping::text("holderId", "holder_id").with_aliases(&["idn"]),
    FieldMapping::text("gender", "gender"),
    FieldMapping::text("nationality", "nationality"),
    FieldMapping::text("profession", "profession"),
    FieldMapping::text("programName", "program_name"),
    FieldMapping::text("programEndDate", "program_end_date"),
    FieldMapping::text("facilityName", "facility_name"),
    FieldMapping::text("facilityLicense", "facility_license"),
    FieldMapping::text("photoUrl", "photo_url"),
    IS_DISABLED,
    CREATED_AT_FIELD,
];

pub const CERTIFICATE_SCHEMA: EntitySchema = EntitySchema {
    name: "health certificate",
    table: "health_certificates",
    storage_key: "ajeer_health_certs",
    fields: CERTIFICATE_FIELDS,
    status: IS_DISABLED,
    sequence: None,
};

/// Canonical health certificate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCertificate {
    #[serde(default)]
    pub id: String,
    pub certificate_number: Option<String>,
    pub issue_date: Option<String>,
    pub issuer: Option<String>,
    pub expiry_date: Option<String>,
    pub holder_name: Option<String>,
    pub holder_id: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub profession: Option<String>,
    pub program_name: Option<String>,
    pub program_end_date: Option<String>,
    pub facility_name: Option<String>,
    pub facility_license: Option<String>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_disabled: bool,
    pub created_at: Option<String>,
}

impl Entity for HealthCertificate {
    type Draft = CertificateDraft;

    const SCHEMA: &'static EntitySchema = &CERTIFICATE_SCHEMA;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Partial certificate accepted by `save`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_disabled: Option<bool>,
}

impl From<HealthCertificate> for CertificateDraft {
    fn from(value: HealthCertificate) -> Self {
        Self {
            id: Some(value.id).filter(|id| !id.is_empty()),
            certificate_number: value.certificate_number,
            issue_date: value.issue_date,
            issuer: value.issuer,
            expiry_date: value.expiry_date,
            holder_name: value.holder_name,
            holder_id: value.holder_id,
            gender: value.gender,
            nationality: value.nationality,
            profession: value.profession,
            program_name: value.program_name,
            program_end_date: value.program_end_date,
            facility_name: value.facility_name,
            facility_license: value.facility_license,
            photo_url: value.photo_url,
            is_disabled: Some(value.is_disabled),
        }
    }
}
