//! Ordered section -> label -> value mapping shared by the PDF renderer and the
//! e-mail body.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::models::TransferRequest;

pub const GENERAL_INFO: &str = "General Info";
pub const ANIMAL_INFO: &str = "Animal Info";
pub const TUMOUR_INFO: &str = "Tumour Info";
pub const HUMANE_ENDPOINTS: &str = "Humane Endpoints";

/// Placeholder shown wherever a value is missing.
pub const EMPTY_VALUE: &str = "-";

/// `Nov 10, 2025`
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%b %d, %Y").to_string(),
        None => EMPTY_VALUE.to_string(),
    }
}

/// Age in weeks at transfer, rounded to one decimal.
pub fn age_in_weeks(dob: NaiveDate, transfer_date: NaiveDate) -> f64 {
    let days = (transfer_date - dob).num_days() as f64;
    (days / 7.0 * 10.0).round() / 10.0
}

/// "10.0 weeks" for one date, "8.1 – 12.3 weeks" for several.
pub fn age_summary(request: &TransferRequest) -> Option<String> {
    let transfer_date = request.transfer_date?;
    let ages: Vec<f64> = request
        .dob_entries
        .dates()
        .map(|dob| age_in_weeks(dob, transfer_date))
        .collect();

    match ages.as_slice() {
        [] => None,
        [age] => Some(format!("{:.1} weeks", age)),
        _ => {
            let min = ages.iter().copied().fold(f64::INFINITY, f64::min);
            let max = ages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some(format!("{:.1} – {:.1} weeks", min, max))
        }
    }
}

pub fn tumour_duration(
    inoculation_date: Option<NaiveDate>,
    transfer_date: Option<NaiveDate>,
) -> String {
    match (inoculation_date, transfer_date) {
        (Some(inoculated), Some(transfer)) => {
            format!("{} days", (transfer - inoculated).num_days())
        }
        _ => EMPTY_VALUE.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocumentSections(IndexMap<String, IndexMap<String, String>>);

impl DocumentSections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a section; an existing section keeps its rows and position.
    pub fn section(&mut self, title: &str) -> &mut IndexMap<String, String> {
        self.0.entry(title.to_string()).or_default()
    }

    pub fn insert(&mut self, title: &str, label: &str, value: impl Into<String>) {
        self.section(title).insert(label.to_string(), value.into());
    }

    pub fn rows(&self, title: &str) -> Option<&IndexMap<String, String>> {
        self.0.get(title)
    }

    pub fn value(&self, title: &str, label: &str) -> Option<&str> {
        self.0.get(title)?.get(label).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, String>)> {
        self.0.iter().map(|(title, rows)| (title.as_str(), rows))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_request(request: &TransferRequest) -> Self {
        let mut sections = Self::new();

        let general = sections.section(GENERAL_INFO);
        general.insert("Requester".into(), request.requester.clone());
        general.insert(
            "Requester Email".into(),
            request.requester_email.clone().unwrap_or_default(),
        );
        general.insert("Facility".into(), request.facility.clone());
        general.insert("Lab Group".into(), request.lab_group.clone());
        general.insert("ACC Protocol".into(), request.protocol.clone());
        general.insert(
            "Requested Transfer Date".into(),
            format_date(request.transfer_date),
        );
        general.insert("Comments".into(), request.comments.clone());

        let dob_list = request
            .dob_entries
            .dates()
            .map(|d| format_date(Some(d)))
            .collect::<Vec<_>>()
            .join(", ");
        let animal = sections.section(ANIMAL_INFO);
        animal.insert("Strain".into(), request.strain.clone());
        animal.insert("Number of Animals".into(), request.quantity.to_string());
        animal.insert("Sex".into(), request.sex.as_str().to_string());
        animal.insert(
            "Age at Transfer".into(),
            age_summary(request).unwrap_or_default(),
        );
        animal.insert("DOB Entries".into(), dob_list);
        animal.insert("Cages".into(), request.cage_numbers.clone());
        animal.insert(
            "Tumour-bearing".into(),
            if request.tumour_bearing { "Yes" } else { "No" }.to_string(),
        );

        let tumour = sections.section(TUMOUR_INFO);
        if request.tumour_bearing {
            let record = &request.tumour;
            tumour.insert("Cell Line".into(), record.cell_line.clone());
            tumour.insert("Tumour Location".into(), record.location.clone());
            tumour.insert(
                "Inoculation Date".into(),
                format_date(record.inoculation_date),
            );
            tumour.insert(
                "Tumour Duration".into(),
                tumour_duration(record.inoculation_date, request.transfer_date),
            );
            tumour.insert("Current Tumour Volume".into(), record.current_volume.clone());
            tumour.insert(
                "Monitoring Frequency".into(),
                record.monitoring_frequency.clone(),
            );
            tumour.insert("Notes".into(), record.notes.clone());
        }

        let endpoints = &request.humane_endpoints;
        let humane = sections.section(HUMANE_ENDPOINTS);
        humane.insert(
            "Weight Loss Limit (%)".into(),
            endpoints.weight_loss_limit.clone(),
        );
        humane.insert(
            "Tumour V Limit (mm³)".into(),
            endpoints.tumour_volume_limit.clone(),
        );
        humane.insert("Signs of Distress".into(), endpoints.distress_signs.clone());

        sections
    }
}
