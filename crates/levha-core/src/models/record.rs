//! Tax plate (Vergi Levhası) record models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structured fields recovered from one tax plate document.
///
/// Every field is optional: an all-empty record is a valid result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Adı Soyadı, set for individual taxpayers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_name: Option<String>,

    /// Ticaret Ünvanı, set for corporate taxpayers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,

    /// İş Yeri Adresi.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_address: Option<String>,

    /// Vergi Türü, in detection order without duplicates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tax_types: Vec<TaxType>,

    /// Faaliyet kodları, unique by code.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activities: Vec<ActivityEntry>,

    /// Vergi Dairesi.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_office: Option<String>,

    /// Vergi Kimlik No (10 digits).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,

    /// T.C. Kimlik No (11 digits).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,

    /// İşe Başlama Tarihi.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// Geçmiş matrahlar.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tax_bases: Vec<TaxBaseEntry>,

    /// Normalized document text, kept for diagnostics.
    #[serde(skip)]
    pub raw_text: String,
}

impl DocumentRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill every empty field of `self` from `other`.
    ///
    /// Populated fields are never overwritten; list fields are merged with
    /// their uniqueness rules.
    pub fn fill_from(mut self, other: DocumentRecord) -> Self {
        fill(&mut self.personal_name, other.personal_name);
        fill(&mut self.organization_name, other.organization_name);
        fill(&mut self.business_address, other.business_address);
        fill(&mut self.tax_office, other.tax_office);
        fill(&mut self.tax_id, other.tax_id);
        fill(&mut self.national_id, other.national_id);
        if self.start_date.is_none() {
            self.start_date = other.start_date;
        }
        for tax_type in other.tax_types {
            self.push_tax_type(tax_type);
        }
        for activity in other.activities {
            self.push_activity(activity);
        }
        if self.tax_bases.is_empty() {
            self.tax_bases = other.tax_bases;
        }
        self
    }

    /// Append a tax type unless already present.
    pub fn push_tax_type(&mut self, tax_type: TaxType) -> bool {
        if self.tax_types.contains(&tax_type) {
            return false;
        }
        self.tax_types.push(tax_type);
        true
    }

    /// Append an activity unless its code is already present.
    pub fn push_activity(&mut self, activity: ActivityEntry) -> bool {
        if self.activities.iter().any(|a| a.code == activity.code) {
            return false;
        }
        self.activities.push(activity);
        true
    }

    /// Whether the taxpayer is subject to corporate tax.
    pub fn is_corporate(&self) -> bool {
        self.tax_types.iter().any(TaxType::is_corporate)
    }

    /// Whether no field has been populated.
    pub fn is_empty(&self) -> bool {
        self.personal_name.is_none()
            && self.organization_name.is_none()
            && self.business_address.is_none()
            && self.tax_types.is_empty()
            && self.activities.is_empty()
            && self.tax_office.is_none()
            && self.tax_id.is_none()
            && self.national_id.is_none()
            && self.start_date.is_none()
            && self.tax_bases.is_empty()
    }

    /// Display name: organization name, else personal name.
    pub fn display_name(&self) -> Option<&str> {
        self.organization_name
            .as_deref()
            .or(self.personal_name.as_deref())
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value.filter(|v| !v.is_empty());
    }
}

/// A declared business activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// 4 to 6 digit activity code (NACE-like).
    pub code: String,
    /// Activity description.
    pub description: String,
}

impl ActivityEntry {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// A historical declared tax base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBaseEntry {
    /// Calendar year.
    pub year: i32,
    /// Declared amount in TRY.
    pub amount: Decimal,
    /// Period qualifier (e.g. "1. Dönem").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    /// Kind qualifier (e.g. "Gelir").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl TaxBaseEntry {
    pub fn new(year: i32, amount: Decimal) -> Self {
        Self {
            year,
            amount,
            period: None,
            kind: None,
        }
    }
}

/// Canonical tax categories printed on a tax plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxType {
    #[serde(rename = "Yıllık Gelir Vergisi")]
    AnnualIncomeTax,
    #[serde(rename = "Kurumlar Vergisi")]
    CorporateTax,
    #[serde(rename = "Katma Değer Vergisi")]
    ValueAddedTax,
    #[serde(rename = "Geçici Vergi")]
    ProvisionalTax,
    #[serde(rename = "Damga Vergisi")]
    StampDuty,
    #[serde(rename = "Muhtasar")]
    Withholding,
    #[serde(rename = "Stopaj")]
    Stoppage,
    #[serde(rename = "Bağ-Kur")]
    BagKur,
    #[serde(rename = "SGK")]
    SocialSecurity,
    #[serde(rename = "KDV")]
    Kdv,
    #[serde(rename = "Gelir Vergisi")]
    IncomeTax,
}

impl TaxType {
    /// Turkish display name as printed on the document.
    pub fn display(&self) -> &'static str {
        match self {
            TaxType::AnnualIncomeTax => "Yıllık Gelir Vergisi",
            TaxType::CorporateTax => "Kurumlar Vergisi",
            TaxType::ValueAddedTax => "Katma Değer Vergisi",
            TaxType::ProvisionalTax => "Geçici Vergi",
            TaxType::StampDuty => "Damga Vergisi",
            TaxType::Withholding => "Muhtasar",
            TaxType::Stoppage => "Stopaj",
            TaxType::BagKur => "Bağ-Kur",
            TaxType::SocialSecurity => "SGK",
            TaxType::Kdv => "KDV",
            TaxType::IncomeTax => "Gelir Vergisi",
        }
    }

    /// Corporate taxation marks an organization taxpayer.
    pub fn is_corporate(&self) -> bool {
        matches!(self, TaxType::CorporateTax)
    }
}

impl std::fmt::Display for TaxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display())
    }
}
