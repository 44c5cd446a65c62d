use rust_decimal::Decimal;

/// Hourly rate applied to service categories missing from [`BASE_HOUR_RATES`].
pub const DEFAULT_HOUR_RATE: Decimal = Decimal::from_parts(75, 0, 0, false, 0);

pub const FALLBACK_TITLE: &str = "Facility Management Services";

pub const BASE_HOUR_RATES: [(&str, u32); 12] = [
    ("Maintenance & Inspection", 85),
    ("Fire Safety Checks", 95),
    ("Façade Inspections", 110),
    ("Renovation & Repairs", 90),
    ("General Building Repairs", 80),
    ("Cleaning Services", 60),
    ("Deep Cleaning", 75),
    ("Pest Control", 70),
    ("Energy Audits", 105),
    ("Green Initiatives", 90),
    ("Security Services", 65),
    ("Equipment Maintenance", 85),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientContact {
    pub name: &'static str,
    pub address: &'static str,
}

/// Demo client directory; one entry is drawn per generated quotation.
pub const CLIENT_DIRECTORY: [ClientContact; 5] = [
    ClientContact { name: "NATIONAL LIBRARY BOARD", address: "53 Margaret Dr, Singapore 149297" },
    ClientContact {
        name: "MINISTRY OF EDUCATION",
        address: "1 North Buona Vista Drive, Singapore 138675",
    },
    ClientContact {
        name: "HOUSING DEVELOPMENT BOARD",
        address: "480 Lorong 6 Toa Payoh, Singapore 310480",
    },
    ClientContact { name: "ALEXANDRA HOSPITAL", address: "378 Alexandra Road, Singapore 159964" },
    ClientContact { name: "SINGAPORE POLYTECHNIC", address: "500 Dover Rd, Singapore 139651" },
];

pub fn service_categories() -> impl Iterator<Item = &'static str> {
    BASE_HOUR_RATES.iter().map(|(category, _)| *category)
}

pub fn base_hour_rate(category: &str) -> Decimal {
    BASE_HOUR_RATES
        .iter()
        .find(|(known, _)| *known == category)
        .map(|(_, rate)| Decimal::from(*rate))
        .unwrap_or(DEFAULT_HOUR_RATE)
}

pub fn category_line_description(category: &str) -> String {
    format!(
        "{category} - Professional facility management service including installation, maintenance, and quality assurance."
    )
}
