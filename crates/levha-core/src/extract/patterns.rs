//! Regex patterns and vocabulary for tax plate extraction.
//!
//! Rust's case-insensitive matching does not pair `İ`/`ı` with `i`/`I`, so
//! every Turkish `i` is spelled as an explicit class.

use lazy_static::lazy_static;
use regex::Regex;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

lazy_static! {
    // Labeled values: "<label> : <value>" up to end of line
    pub static ref LABEL_PERSONAL_NAME: Vec<Regex> = compile(&[
        r"(?i)ad[ıiİ]\s*soyad[ıiİ]\s*[:：]\s*(.+?)(?:\n|$)",
    ]);

    pub static ref LABEL_ORGANIZATION_NAME: Vec<Regex> = compile(&[
        r"(?i)t[iİı]caret\s*[üu]nvan[ıiİ]\s*[:：]\s*(.+?)(?:\n|$)",
    ]);

    pub static ref LABEL_ADDRESS: Vec<Regex> = compile(&[
        r"(?i)[iİı][şs]\s*yer[iİı]\s*adres[iİı]\s*[:：]\s*(.+?)(?:\n|$)",
    ]);

    pub static ref LABEL_TAX_OFFICE: Vec<Regex> = compile(&[
        r"(?i)verg[iİı]\s*da[iİı]res[iİı]\s*[:：]\s*(.+?)(?:\n|$)",
    ]);

    pub static ref LABEL_TAX_ID: Vec<Regex> = compile(&[
        r"(?i)verg[iİı]\s*k[iİı]ml[iİı]k\s*no\s*[:：]\s*(\d{10})\b",
        r"(?i)v\.?\s*k\.?\s*n\.?\s*[:：]\s*(\d{10})\b",
    ]);

    pub static ref LABEL_NATIONAL_ID: Vec<Regex> = compile(&[
        r"(?i)t\.?\s*c\.?\s*k[iİı]ml[iİı]k\s*no\s*[:：]?\s*(\d{11})\b",
        r"(?i)tc\s*k[iİı]ml[iİı]k\s*numaras[ıiİ]\s*[:：]?\s*(\d{11})\b",
        r"(?i)tckn\s*[:：]?\s*(\d{11})\b",
        r"(?i)t\.?\s*c\.?\s*no\s*[:：]\s*(\d{11})\b",
    ]);

    pub static ref LABEL_START_DATE: Vec<Regex> = compile(&[
        r"(?i)[iİı][şs]e\s*ba[şs]lama\s*tar[iİı]h[iİı]\s*[:：]\s*(\d{1,2}[./-]\d{1,2}[./-]\d{4})",
    ]);

    // Dates
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4})\b"
    ).unwrap();

    pub static ref DATE_DOTTED: Regex = Regex::new(r"\b\d{2}\.\d{2}\.\d{4}\b").unwrap();

    pub static ref DATE_LINE: Regex = Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").unwrap();

    // Identity lines
    pub static ref NATIONAL_ID_LINE: Regex = Regex::new(r"^\d{11}$").unwrap();

    pub static ref NATIONAL_ID_LINE_MULTI: Regex = Regex::new(r"(?m)^\s*(\d{11})\s*$").unwrap();

    pub static ref NATIONAL_ID_TOKEN: Regex = Regex::new(r"\b(\d{11})\b").unwrap();

    pub static ref DIGITS_LINE: Regex = Regex::new(r"^\d+$").unwrap();

    // Single-line (dense) layouts
    pub static ref DENSE_NAME: Regex = Regex::new(
        r"M[ÜU]KELLEF[İI]N\s+(.+?)\s+[A-ZÇĞİÖŞÜ]+\s+MAH"
    ).unwrap();

    pub static ref DENSE_ADDRESS: Regex = Regex::new(
        r"([A-ZÇĞİÖŞÜ]+\s+MAH\.?\s+.+?(?:İSTANBUL|ISTANBUL|ANKARA|İZMİR|IZMIR|BURSA|ANTALYA|KONYA))"
    ).unwrap();

    pub static ref DENSE_ADDRESS_END: Regex = Regex::new(r"\s+(?:YILLIK|KURUMLAR)\b").unwrap();

    pub static ref DENSE_TAX_OFFICE: Regex = Regex::new(
        r"(?:YILLIK\s+GEL[İI]R\s+VERG[İI]S[İI]|GEL[İI]R\s+VERG[İI]S[İI]|KURUMLAR\s+VERG[İI]S[İI])\s+([A-ZÇĞİÖŞÜ]+)\s+\d{11}"
    ).unwrap();

    pub static ref DENSE_ACTIVITY: Regex = Regex::new(
        r"(\d{6})\s*[-–]\s*([A-ZÇĞİÖŞÜa-zçğıöşü\s]+?)(?:\s+TAKV[İI]M|\s+BEYAN|\s+\d{4})"
    ).unwrap();

    // Activities
    pub static ref ACTIVITY_LINE: Regex = Regex::new(r"(\d{4,6})\s*[-–]\s*(.+)").unwrap();

    pub static ref ACTIVITY_BOILERPLATE: Regex = Regex::new(
        r"(?i)TAKV[İIı]M|BEYAN|ONAY|MATRAH"
    ).unwrap();

    pub static ref ACTIVITY_TRAILING_YEAR: Regex = Regex::new(r"\s+\d{4}\s*[A-Za-z]*$").unwrap();

    // Tax bases
    pub static ref TAX_BASE: Regex = Regex::new(
        r"(?i)\b(\d{4})\s+(?:y[ıi]l[ıi]\s+)?(?:(\d)\s*\.?\s*d[öo]nem\s+)?(\d{1,3}(?:[.,]\d{3})+(?:[.,]\d{2})?)\s*(?:TL|₺)?"
    ).unwrap();
}

/// Folded markers of the "MÜKELLEFİN" taxpayer block header.
pub const TAXPAYER_MARKERS: &[&str] = &["MKELLEF", "MÜKELLEFİN"];

/// Tokens that start a street address.
pub const ADDRESS_MARKERS: &[&str] = &[
    "MAH.", "MAH ", "CAD.", "CAD ", "SOK.", "SOK ", "SK.", "SK ", "NO:", "KAPI", "BULVARI",
    "BULV.",
];

/// Legal-form and trade vocabulary marking an organization name.
pub const ORGANIZATION_FORMS: &[&str] = &[
    "ŞİRKET", "LİMİTED", "A.Ş", "A.S.", "DERNEĞİ", "İKTİSADİ", "SANAYİ", "TİCARET",
];

/// Tax section headers, most specific first.
pub const TAX_SECTION_PHRASES: &[&str] = &[
    "KURUMLAR VERGİSİ",
    "YILLIK GELİR VERGİSİ",
    "GELİR VERGİSİ",
    "KATMA DEĞER VERGİSİ",
];

/// Fragments of web addresses printed in footers.
pub const WEB_FRAGMENTS: &[&str] = &["http", "www", "gib.gov"];

/// Markers of a tax plate title.
pub const TITLE_MARKERS: &[&str] = &["VERGİ LEVHASI", "GİB"];

/// Label text preceding the personal name.
pub const NAME_LABELS: &[&str] = &["ADI SOYADI", "ADISOYADI"];

/// Label vocabulary that never appears inside a personal name.
pub const LABEL_VOCABULARY: &[&str] = &["TİCARET", "VERGİ", "İŞ YERİ"];

/// Organization label vocabulary leaking into a personal-name value.
pub const ORGANIZATION_LABELS: &[&str] = &["TİCARET", "NVANI"];

/// Organization-name keywords for the line scan.
pub const COMPANY_LINE_KEYWORDS: &[&str] = &["ŞİRKET", "LİMİTED", "A.Ş"];

/// Lines containing these are labels or headers, not organization names.
pub const COMPANY_LINE_EXCLUSIONS: &[&str] = &["ÜNVAN", "NVANI", "VERGİ TR", "VERGİDAİ"];

/// Strong street-address tokens for the line scan.
pub const ADDRESS_LINE_KEYWORDS: &[&str] = &[
    "MAH.", "MAH ", "CAD.", "CAD ", "SOK.", "SOK ", "KAPI NO", "İÇ KAPI", "YOLU CAD.",
];

/// Building qualifiers that make a `NO:` line an address.
pub const ADDRESS_NUMBER_QUALIFIERS: &[&str] = &[
    "KAPI", "DAİRE", "KAT", "BLOK", "TOWER", "PLAZA", "RESIDENCE", "KONUT",
];

/// Building names that mark an address line on their own.
pub const BUILDING_KEYWORDS: &[&str] = &["TOWER", "PLAZA", "CENTER", "CENTRE", "İŞ MERKEZİ"];

/// Lines containing these are never addresses.
pub const ADDRESS_LINE_EXCLUSIONS: &[&str] = &["FAALİYET", "KİMLİK"];

/// Turkish provinces, upper-case.
pub const CITY_NAMES: &[&str] = &[
    "ADANA", "ADIYAMAN", "AFYONKARAHİSAR", "AĞRI", "AMASYA", "ANKARA", "ANTALYA", "ARTVİN",
    "AYDIN", "BALIKESİR", "BİLECİK", "BİNGÖL", "BİTLİS", "BOLU", "BURDUR", "BURSA",
    "ÇANAKKALE", "ÇANKIRI", "ÇORUM", "DENİZLİ", "DİYARBAKIR", "EDİRNE", "ELAZIĞ", "ERZİNCAN",
    "ERZURUM", "ESKİŞEHİR", "GAZİANTEP", "GİRESUN", "GÜMÜŞHANE", "HAKKARİ", "HATAY", "ISPARTA",
    "MERSİN", "İSTANBUL", "İZMİR", "KARS", "KASTAMONU", "KAYSERİ", "KIRKLARELİ", "KIRŞEHİR",
    "KOCAELİ", "KONYA", "KÜTAHYA", "MALATYA", "MANİSA", "KAHRAMANMARAŞ", "MARDİN", "MUĞLA",
    "MUŞ", "NEVŞEHİR", "NİĞDE", "ORDU", "RİZE", "SAKARYA", "SAMSUN", "SİİRT", "SİNOP", "SİVAS",
    "TEKİRDAĞ", "TOKAT", "TRABZON", "TUNCELİ", "ŞANLIURFA", "UŞAK", "VAN", "YOZGAT",
    "ZONGULDAK", "AKSARAY", "BAYBURT", "KARAMAN", "KIRIKKALE", "BATMAN", "ŞIRNAK", "BARTIN",
    "ARDAHAN", "IĞDIR", "YALOVA", "KARABÜK", "KİLİS", "OSMANİYE", "DÜZCE",
];
