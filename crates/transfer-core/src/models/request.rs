//! Transfer request model and the field-level updates that build it up.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

/// Upper bound on the number of date-of-birth groups per request.
pub const MAX_DOB_ENTRIES: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    #[serde(alias = "male")]
    Male,
    #[serde(alias = "female")]
    Female,
    #[serde(alias = "both")]
    Both,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Both => "Both",
        }
    }

    /// Single-letter code used in document names (`M`, `F`, `B`).
    pub fn initial(&self) -> char {
        match self {
            Sex::Male => 'M',
            Sex::Female => 'F',
            Sex::Both => 'B',
        }
    }
}

/// Ordered date-of-birth slots, one per animal group. Always holds between one and
/// [`MAX_DOB_ENTRIES`] slots; a slot may still be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DobEntries(Vec<Option<NaiveDate>>);

impl Default for DobEntries {
    fn default() -> Self {
        Self(vec![None])
    }
}

impl DobEntries {
    pub fn from_slots(slots: Vec<Option<NaiveDate>>) -> Result<Self, AppError> {
        if slots.is_empty() || slots.len() > MAX_DOB_ENTRIES {
            return Err(AppError::InvalidInput(format!(
                "Between 1 and {} DOB entries are allowed, got {}",
                MAX_DOB_ENTRIES,
                slots.len()
            )));
        }
        Ok(Self(slots))
    }

    pub fn slots(&self) -> &[Option<NaiveDate>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn can_add(&self) -> bool {
        self.0.len() < MAX_DOB_ENTRIES
    }

    /// Append an empty slot. Returns `false` once the bound is reached.
    pub fn add_slot(&mut self) -> bool {
        if !self.can_add() {
            return false;
        }
        self.0.push(None);
        true
    }

    /// Filled-in dates in slot order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.iter().flatten().copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TumourRecord {
    pub cell_line: String,
    /// Inoculation route and anatomical site, e.g. "SQ / Left flank"
    pub location: String,
    pub inoculation_date: Option<NaiveDate>,
    pub current_volume: String,
    pub monitoring_frequency: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HumaneEndpointSpec {
    pub weight_loss_limit: String,
    pub tumour_volume_limit: String,
    pub distress_signs: String,
}

/// Attachment reminders the requester ticks off. Shown back in the session view only;
/// never rendered into the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentChecklist {
    /// Mandatory
    pub monitoring_sheets: bool,
    pub cage_map: bool,
    pub tumour_growth_curves: bool,
}

impl AttachmentChecklist {
    pub const MONITORING_SHEETS: &'static str = "Monitoring sheets";
    pub const CAGE_MAP: &'static str = "Cage map / IDs";
    pub const TUMOUR_GROWTH_CURVES: &'static str = "Tumour Growth Curves";

    /// Labels of the ticked items, mandatory first.
    pub fn checked_items(&self) -> Vec<&'static str> {
        [
            (self.monitoring_sheets, Self::MONITORING_SHEETS),
            (self.cage_map, Self::CAGE_MAP),
            (self.tumour_growth_curves, Self::TUMOUR_GROWTH_CURVES),
        ]
        .into_iter()
        .filter_map(|(checked, label)| checked.then_some(label))
        .collect()
    }

    pub fn missing_mandatory(&self) -> bool {
        !self.monitoring_sheets
    }
}

/// Everything the requester has typed so far. Lives only as long as the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct TransferRequest {
    #[validate(length(min = 1, message = "Requester name is required"))]
    pub requester: String,
    #[validate(email(message = "Requester email is not a valid address"))]
    pub requester_email: Option<String>,
    pub lab_group: String,
    pub protocol: String,
    #[validate(length(min = 1, message = "Facility is required"))]
    pub facility: String,
    #[validate(required(message = "Requested transfer date is required"))]
    pub transfer_date: Option<NaiveDate>,
    pub comments: String,
    #[validate(length(min = 1, message = "Strain is required"))]
    pub strain: String,
    #[validate(range(min = 1, message = "Number of animals must be at least 1"))]
    pub quantity: u32,
    pub sex: Sex,
    pub dob_entries: DobEntries,
    pub cage_numbers: String,
    pub tumour_bearing: bool,
    pub tumour: TumourRecord,
    pub humane_endpoints: HumaneEndpointSpec,
    pub checklist: AttachmentChecklist,
    pub send_copy: bool,
}

impl Default for TransferRequest {
    fn default() -> Self {
        Self {
            requester: String::new(),
            requester_email: None,
            lab_group: String::new(),
            protocol: String::new(),
            facility: String::new(),
            transfer_date: None,
            comments: String::new(),
            strain: String::new(),
            quantity: 1,
            sex: Sex::default(),
            dob_entries: DobEntries::default(),
            cage_numbers: String::new(),
            tumour_bearing: false,
            tumour: TumourRecord::default(),
            humane_endpoints: HumaneEndpointSpec::default(),
            checklist: AttachmentChecklist::default(),
            send_copy: false,
        }
    }
}

impl TransferRequest {
    /// Requester address for the receipt, only when they asked for a copy.
    pub fn receipt_recipient(&self) -> Option<&str> {
        if !self.send_copy {
            return None;
        }
        self.requester_email.as_deref().filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TumourUpdate {
    pub cell_line: Option<String>,
    pub location: Option<String>,
    pub inoculation_date: Option<NaiveDate>,
    pub current_volume: Option<String>,
    pub monitoring_frequency: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HumaneEndpointUpdate {
    pub weight_loss_limit: Option<String>,
    pub tumour_volume_limit: Option<String>,
    pub distress_signs: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecklistUpdate {
    pub monitoring_sheets: Option<bool>,
    pub cage_map: Option<bool>,
    pub tumour_growth_curves: Option<bool>,
}

/// A batch of field edits. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldUpdate {
    pub requester: Option<String>,
    pub requester_email: Option<String>,
    pub lab_group: Option<String>,
    pub protocol: Option<String>,
    pub facility: Option<String>,
    pub transfer_date: Option<NaiveDate>,
    pub comments: Option<String>,
    pub strain: Option<String>,
    pub quantity: Option<u32>,
    pub sex: Option<Sex>,
    /// Replaces all DOB slots at once
    pub dob_entries: Option<Vec<Option<NaiveDate>>>,
    pub cage_numbers: Option<String>,
    pub tumour_bearing: Option<bool>,
    pub tumour: Option<TumourUpdate>,
    pub humane_endpoints: Option<HumaneEndpointUpdate>,
    pub checklist: Option<ChecklistUpdate>,
    pub send_copy: Option<bool>,
}

fn set(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl FieldUpdate {
    /// Apply the update. Either every field is applied or, on error, none is.
    pub fn apply_to(self, request: &mut TransferRequest) -> Result<(), AppError> {
        if self.quantity == Some(0) {
            return Err(AppError::InvalidInput(
                "Number of animals must be at least 1".to_string(),
            ));
        }
        let dob_entries = self.dob_entries.map(DobEntries::from_slots).transpose()?;

        set(&mut request.requester, self.requester);
        if let Some(email) = self.requester_email {
            let email = email.trim().to_string();
            request.requester_email = (!email.is_empty()).then_some(email);
        }
        set(&mut request.lab_group, self.lab_group);
        set(&mut request.protocol, self.protocol);
        set(&mut request.facility, self.facility);
        if let Some(date) = self.transfer_date {
            request.transfer_date = Some(date);
        }
        set(&mut request.comments, self.comments);
        set(&mut request.strain, self.strain);
        if let Some(quantity) = self.quantity {
            request.quantity = quantity;
        }
        if let Some(sex) = self.sex {
            request.sex = sex;
        }
        if let Some(dob_entries) = dob_entries {
            request.dob_entries = dob_entries;
        }
        set(&mut request.cage_numbers, self.cage_numbers);
        if let Some(flag) = self.tumour_bearing {
            request.tumour_bearing = flag;
        }
        if let Some(tumour) = self.tumour {
            let record = &mut request.tumour;
            set(&mut record.cell_line, tumour.cell_line);
            set(&mut record.location, tumour.location);
            if let Some(date) = tumour.inoculation_date {
                record.inoculation_date = Some(date);
            }
            set(&mut record.current_volume, tumour.current_volume);
            set(&mut record.monitoring_frequency, tumour.monitoring_frequency);
            set(&mut record.notes, tumour.notes);
        }
        if let Some(endpoints) = self.humane_endpoints {
            let spec = &mut request.humane_endpoints;
            set(&mut spec.weight_loss_limit, endpoints.weight_loss_limit);
            set(&mut spec.tumour_volume_limit, endpoints.tumour_volume_limit);
            set(&mut spec.distress_signs, endpoints.distress_signs);
        }
        if let Some(checklist) = self.checklist {
            let items = &mut request.checklist;
            items.monitoring_sheets = checklist.monitoring_sheets.unwrap_or(items.monitoring_sheets);
            items.cage_map = checklist.cage_map.unwrap_or(items.cage_map);
            items.tumour_growth_curves = checklist
                .tumour_growth_curves
                .unwrap_or(items.tumour_growth_curves);
        }
        if let Some(flag) = self.send_copy {
            request.send_copy = flag;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_default_request_has_one_empty_dob_slot_and_quantity_one() {
        let request = TransferRequest::default();
        assert_eq!(request.quantity, 1);
        assert_eq!(request.dob_entries.slots(), &[None]);
        assert_eq!(request.sex, Sex::Male);
    }

    #[test]
    fn test_dob_entries_bounded_at_three() {
        let mut entries = DobEntries::default();
        assert!(entries.add_slot());
        assert!(entries.add_slot());
        assert!(!entries.add_slot());
        assert_eq!(entries.len(), MAX_DOB_ENTRIES);
    }

    #[test]
    fn test_dob_entries_from_slots_rejects_out_of_range() {
        assert!(DobEntries::from_slots(vec![]).is_err());
        assert!(DobEntries::from_slots(vec![None; 4]).is_err());
        assert!(DobEntries::from_slots(vec![Some(date(2025, 8, 1)), None]).is_ok());
    }

    #[test]
    fn test_apply_update_sets_fields() {
        let mut request = TransferRequest::default();
        let update: FieldUpdate = serde_json::from_value(serde_json::json!({
            "requester": "Jane Doe",
            "requester_email": " jane@example.org ",
            "quantity": 5,
            "sex": "Female",
            "transfer_date": "2025-11-10",
            "tumour": { "cell_line": "AR42J" },
            "humane_endpoints": { "weight_loss_limit": "20%" }
        }))
        .expect("update parses");

        update.apply_to(&mut request).expect("apply");

        assert_eq!(request.requester, "Jane Doe");
        assert_eq!(request.requester_email.as_deref(), Some("jane@example.org"));
        assert_eq!(request.quantity, 5);
        assert_eq!(request.sex, Sex::Female);
        assert_eq!(request.transfer_date, Some(date(2025, 11, 10)));
        assert_eq!(request.tumour.cell_line, "AR42J");
        assert_eq!(request.humane_endpoints.weight_loss_limit, "20%");
    }

    #[test]
    fn test_apply_update_is_all_or_nothing() {
        let mut request = TransferRequest::default();
        let update = FieldUpdate {
            requester: Some("Jane Doe".to_string()),
            quantity: Some(0),
            ..Default::default()
        };
        assert!(update.apply_to(&mut request).is_err());
        assert_eq!(request, TransferRequest::default());

        let update = FieldUpdate {
            requester: Some("Jane Doe".to_string()),
            dob_entries: Some(vec![None; 4]),
            ..Default::default()
        };
        assert!(update.apply_to(&mut request).is_err());
        assert_eq!(request, TransferRequest::default());
    }

    #[test]
    fn test_blank_email_clears_address() {
        let mut request = TransferRequest {
            requester_email: Some("jane@example.org".to_string()),
            ..Default::default()
        };
        let update = FieldUpdate {
            requester_email: Some("  ".to_string()),
            ..Default::default()
        };
        update.apply_to(&mut request).expect("apply");
        assert_eq!(request.requester_email, None);
    }

    #[test]
    fn test_checklist_update_only_touches_named_items() {
        let mut request = TransferRequest::default();
        assert!(request.checklist.checked_items().is_empty());
        assert!(request.checklist.missing_mandatory());

        let update: FieldUpdate = serde_json::from_value(serde_json::json!({
            "checklist": { "tumour_growth_curves": true, "monitoring_sheets": true }
        }))
        .expect("update parses");
        update.apply_to(&mut request).expect("apply");

        let update: FieldUpdate = serde_json::from_value(serde_json::json!({
            "checklist": { "cage_map": true }
        }))
        .expect("update parses");
        update.apply_to(&mut request).expect("apply");

        assert_eq!(
            request.checklist.checked_items(),
            vec!["Monitoring sheets", "Cage map / IDs", "Tumour Growth Curves"]
        );
        assert!(!request.checklist.missing_mandatory());

        let result: Result<FieldUpdate, _> =
            serde_json::from_value(serde_json::json!({ "checklist": { "vet_notes": true } }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<FieldUpdate, _> =
            serde_json::from_value(serde_json::json!({ "favourite_colour": "blue" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_reports_missing_required_fields() {
        let request = TransferRequest::default();
        let err = request.validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("requester"));
        assert!(fields.contains_key("facility"));
        assert!(fields.contains_key("strain"));
        assert!(fields.contains_key("transfer_date"));
    }

    #[test]
    fn test_receipt_recipient_requires_opt_in() {
        let mut request = TransferRequest {
            requester_email: Some("jane@example.org".to_string()),
            ..Default::default()
        };
        assert_eq!(request.receipt_recipient(), None);
        request.send_copy = true;
        assert_eq!(request.receipt_recipient(), Some("jane@example.org"));
    }
}
