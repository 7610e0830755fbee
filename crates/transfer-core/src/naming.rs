//! Derived naming
//!
//! One canonical base string names both the PDF and the e-mail subject, so a preview
//! and the submitted document carry the same name when nothing changed in between.

use chrono::NaiveDate;

use crate::error::AppError;
use crate::models::{Sex, TransferRequest};

pub const NAME_PREFIX: &str = "[TransferToCCM]";

/// Longest requester fragment kept in a name, in characters.
pub const MAX_REQUESTER_CHARS: usize = 15;

/// Map one character of a name fragment to something safe in a file name.
/// Path separators and spaces are dropped; anything other than letters, digits,
/// `-` and `_` becomes `_`, so `.` and `..` can never appear.
fn safe_char(c: char) -> Option<char> {
    match c {
        '/' | '\\' => None,
        c if c.is_whitespace() => None,
        c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
        _ => Some('_'),
    }
}

/// "Jane  doe" -> "JaneDoe", made file-name safe and cut to [`MAX_REQUESTER_CHARS`].
fn compact_requester(requester: &str) -> String {
    requester
        .split_whitespace()
        .flat_map(|part| {
            let mut chars = part.chars();
            let first = chars.next().into_iter().flat_map(char::to_uppercase);
            first.chain(chars)
        })
        .filter_map(safe_char)
        .take(MAX_REQUESTER_CHARS)
        .collect()
}

fn strip_separators(value: &str) -> String {
    value.chars().filter_map(safe_char).collect()
}

/// Build the base name from its six inputs.
pub fn base_name(
    quantity: u32,
    sex: Sex,
    strain: &str,
    facility: &str,
    requester: &str,
    transfer_date: NaiveDate,
) -> String {
    format!(
        "{}_{}{}_{}_{}_{}_{}",
        NAME_PREFIX,
        quantity,
        sex.initial(),
        strip_separators(strain),
        strip_separators(facility),
        compact_requester(requester),
        transfer_date.format("%b%d")
    )
}

/// Base name for a request; the transfer date must be set.
pub fn base_name_for(request: &TransferRequest) -> Result<String, AppError> {
    let transfer_date = request.transfer_date.ok_or_else(|| {
        AppError::InvalidInput("Requested transfer date is required".to_string())
    })?;
    Ok(base_name(
        request.quantity,
        request.sex,
        &request.strain,
        &request.facility,
        &request.requester,
        transfer_date,
    ))
}

pub fn document_file_name(base: &str) -> String {
    format!("{}.pdf", base)
}

pub fn receipt_file_name(subject: &str) -> String {
    format!("Receipt_{}.pdf", subject)
}

pub fn receipt_subject(subject: &str) -> String {
    format!("Receipt: Rodent Transfer Request ({})", subject)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nov10() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 10).expect("valid date")
    }

    #[test]
    fn test_reference_example() {
        let name = base_name(5, Sex::Female, "C57BL/6J", "BC Cancer", "Jane Doe", nov10());
        assert_eq!(name, "[TransferToCCM]_5F_C57BL6J_BCCancer_JaneDoe_Nov10");
    }

    #[test]
    fn test_only_date_suffix_changes_with_date() {
        let other = NaiveDate::from_ymd_opt(2026, 1, 3).expect("valid date");
        let a = base_name(5, Sex::Both, "BALB/c", "BC Cancer", "Jane Doe", nov10());
        let b = base_name(5, Sex::Both, "BALB/c", "BC Cancer", "Jane Doe", other);
        let (prefix_a, suffix_a) = a.rsplit_once('_').expect("separator");
        let (prefix_b, suffix_b) = b.rsplit_once('_').expect("separator");
        assert_eq!(prefix_a, prefix_b);
        assert_eq!(suffix_a, "Nov10");
        assert_eq!(suffix_b, "Jan03");
    }

    #[test]
    fn test_requester_is_title_cased_and_truncated() {
        assert_eq!(compact_requester("  jane   van der doe "), "JaneVanDerDoe");
        assert_eq!(
            compact_requester("maximilian alexander"),
            "MaximilianAlexa"
        );
        assert_eq!(compact_requester("mcDonald"), "McDonald");
        assert_eq!(compact_requester(""), "");
    }

    #[test]
    fn test_path_separators_removed() {
        assert_eq!(strip_separators("NOD/SCID \\ gamma"), "NODSCIDgamma");
    }

    #[test]
    fn test_unsafe_characters_never_reach_the_name() {
        assert_eq!(compact_requester("A/../../../x"), "A______x");
        assert_eq!(compact_requester("o'brien \"jr\""), "O_brien_jr_");
        assert_eq!(compact_requester("..\\..\\etc"), "____etc");
        assert_eq!(strip_separators("Tg(Cdx2-cre)1Mmt"), "Tg_Cdx2-cre_1Mmt");
        assert_eq!(strip_separators("../BC Cancer"), "__BCCancer");
    }

    #[test]
    fn test_non_ascii_letters_are_kept() {
        assert_eq!(compact_requester("josé garcía"), "JoséGarcía");
    }

    #[test]
    fn test_hostile_inputs_give_a_single_file_name() {
        let name = base_name(
            3,
            Sex::Male,
            "../../strain",
            "/etc/passwd",
            "A/../../../x",
            nov10(),
        );
        assert!(!name.contains('/'));
        assert!(!name.contains('\\'));
        assert!(!name.contains(".."));
        let file = document_file_name(&name);
        let path = std::path::Path::new(&file);
        assert_eq!(path.components().count(), 1);
        assert_eq!(name, "[TransferToCCM]_3M_____strain_etcpasswd_A______x_Nov10");
    }

    #[test]
    fn test_base_name_for_requires_date() {
        let request = TransferRequest::default();
        assert!(base_name_for(&request).is_err());
    }

    #[test]
    fn test_receipt_names() {
        assert_eq!(receipt_file_name("X"), "Receipt_X.pdf");
        assert_eq!(receipt_subject("X"), "Receipt: Rodent Transfer Request (X)");
        assert_eq!(document_file_name("X"), "X.pdf");
    }
}
