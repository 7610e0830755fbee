//! HTML body of the facility notification and the requester receipt.

use base64::Engine;
use chrono::NaiveDate;
use htmlize::escape_text;
use std::fmt;
use std::path::Path;
use transfer_core::sections::{
    format_date, ANIMAL_INFO, EMPTY_VALUE, GENERAL_INFO, HUMANE_ENDPOINTS, TUMOUR_INFO,
};
use transfer_core::{DocumentSections, UploadedFile};

/// Image inlined at the top of the message as a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailLogo {
    mime: &'static str,
    encoded: String,
}

impl EmailLogo {
    pub fn from_bytes(data: &[u8], mime: &'static str) -> Self {
        Self {
            mime,
            encoded: base64::engine::general_purpose::STANDARD.encode(data),
        }
    }

    pub async fn load(path: &Path) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let mime = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            _ => "image/png",
        };
        Ok(Self::from_bytes(&data, mime))
    }

    fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.encoded)
    }
}

const STYLE: &str = "\
body { font-family: 'Segoe UI', Helvetica, Arial, sans-serif; background-color: #f9fafc; color: #333; line-height: 1.5; }
.container { max-width: 700px; margin: auto; background: white; border-radius: 8px; padding: 25px 30px; box-shadow: 0 2px 6px rgba(0,0,0,0.1); }
h2 { color: #002145; border-bottom: 2px solid #0055a4; padding-bottom: 4px; }
h3 { color: #002145; margin-top: 24px; }
p, li { font-size: 15px; }
ul { margin: 0; padding-left: 20px; }
.footer { margin-top: 25px; font-size: 13px; color: #666; }";

/// Inputs of the message body. Values come from the same section mapping as the PDF.
pub struct HtmlBody<'a> {
    pub sections: &'a DocumentSections,
    pub attachments: &'a [UploadedFile],
    pub submitted_on: NaiveDate,
    pub copy_sent: bool,
    pub logo: Option<&'a EmailLogo>,
}

impl HtmlBody<'_> {
    fn value(&self, section: &str, label: &str) -> String {
        let value = self
            .sections
            .value(section, label)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(EMPTY_VALUE);
        escape_text(value).into_owned()
    }

    fn write_list(
        &self,
        f: &mut fmt::Formatter<'_>,
        heading: &str,
        section: &str,
        rows: &[(&str, &str)],
    ) -> fmt::Result {
        writeln!(f, "<h3>{}</h3>\n<ul>", heading)?;
        for (shown, label) in rows {
            writeln!(
                f,
                "<li><strong>{}:</strong> {}</li>",
                escape_text(*shown),
                self.value(section, label)
            )?;
        }
        f.write_str("</ul>\n")
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HtmlBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let facility = self.value(GENERAL_INFO, "Facility");

        write!(
            f,
            "<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{}\n</style>\n</head>\n<body>\n<div class=\"container\">\n<div style=\"text-align:center;\">\n",
            STYLE
        )?;
        if let Some(logo) = self.logo {
            writeln!(
                f,
                "<img src=\"{}\" width=\"120\" style=\"margin-bottom:15px;\"/>",
                logo.data_uri()
            )?;
        }
        writeln!(
            f,
            "<h2>Animal Transfer Form \u{2014} From {} to CCM</h2>\n<p><strong>Date Submitted:</strong> {}</p>\n</div>",
            facility,
            format_date(Some(self.submitted_on))
        )?;

        self.write_list(
            f,
            "General Information",
            GENERAL_INFO,
            &[
                ("Requester", "Requester"),
                ("Requester Email", "Requester Email"),
                ("Lab Group", "Lab Group"),
                ("ACC Protocol", "ACC Protocol"),
                ("Facility", "Facility"),
                ("Requested Transfer Date", "Requested Transfer Date"),
                ("Comments", "Comments"),
            ],
        )?;
        self.write_list(
            f,
            "Animal Information",
            ANIMAL_INFO,
            &[
                ("Strain", "Strain"),
                ("Number of Animals", "Number of Animals"),
                ("Sex", "Sex"),
                ("Age at Transfer", "Age at Transfer"),
                ("DOB Entries", "DOB Entries"),
                ("Cages", "Cages"),
                ("Tumour-bearing", "Tumour-bearing"),
            ],
        )?;
        self.write_list(
            f,
            "Tumour Information",
            TUMOUR_INFO,
            &[
                ("Cell Line", "Cell Line"),
                ("Tumour Location", "Tumour Location"),
                ("Inoculation Date", "Inoculation Date"),
                ("Tumour Duration", "Tumour Duration"),
                ("Current Tumour Volume", "Current Tumour Volume"),
                ("Monitoring Frequency", "Monitoring Frequency"),
                ("Tumour-related Notes", "Notes"),
            ],
        )?;
        self.write_list(
            f,
            "Humane Endpoints",
            HUMANE_ENDPOINTS,
            &[
                ("Weight Loss Limit (%)", "Weight Loss Limit (%)"),
                ("Tumour V Limit (mm³)", "Tumour V Limit (mm³)"),
                ("Signs of Distress", "Signs of Distress"),
            ],
        )?;

        f.write_str("<h3>Attachments Summary</h3>\n<ul class=\"attachment-list\">\n")?;
        if self.attachments.is_empty() {
            f.write_str("<li>No attachments uploaded.</li>\n")?;
        }
        for file in self.attachments {
            writeln!(f, "<li>{}</li>", escape_text(file.name()))?;
        }
        f.write_str("</ul>\n")?;

        f.write_str(
            "<div class=\"footer\">\n<p>\n\
             This form was automatically generated by the <em>Animal Transfer Portal</em>.<br><br>\n\
             We have received the submitted form and will process the transfer as soon as possible.<br>\n\
             We will contact you directly in case of any questions or clarifications.<br><br>\n",
        )?;
        if self.copy_sent {
            f.write_str("A copy has been sent to the requester.\n")?;
        }
        f.write_str("</p>\n</div>\n</div>\n</body>\n</html>\n")
    }
}
