use chrono::NaiveDate;
use serde::Deserialize;
use serde_with::{NoneAsEmptyString, serde_as};

/// Device information service response.
#[must_use]
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub detailed_info: Option<DetailedInfo>,
}

impl DeviceInfo {
    /// Electronic label, if the detailed info has been read.
    #[must_use]
    pub fn label(&self) -> Option<&ElectronicLabel> {
        self.detailed_info.as_ref()?.info.as_ref()
    }
}

#[must_use]
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DetailedInfo {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub info: Option<ElectronicLabel>,
}

/// Electronic label stored in the battery management system.
#[must_use]
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ElectronicLabel {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub manufacturer: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub model: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub barcode: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub manufactured_date: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub description: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub info_version: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub elabel_version: Option<String>,
}

impl ElectronicLabel {
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%Y%m%d"];

    /// Parse the manufacture date.
    ///
    /// Labels written by different firmware versions disagree on the format,
    /// and some only carry the year and month.
    #[must_use]
    pub fn manufacture_date(&self) -> Option<NaiveDate> {
        let date = self.manufactured_date.as_deref()?.trim();
        Self::DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
            .or_else(|| NaiveDate::parse_from_str(&format!("{date}-01"), "%Y-%m-%d").ok())
    }
}
