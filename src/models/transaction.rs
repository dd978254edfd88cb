use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Well-known status values. The set is open: backends may send others.
pub mod status {
    pub const POSTED: &str = "Posted";
    pub const FLOATING: &str = "Floating";
    pub const CANCELLED: &str = "Cancelled";
    pub const PENDING: &str = "Pending";
}

/// A student payment record, keyed by `reference_code`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transaction {
    pub campus_id: String,
    pub student_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    pub reference_code: String,
    pub payment_method: String,
    pub transaction_type: String,
    pub amount: f64,
    /// `MM/DD/YYYY`, possibly empty
    pub date: String,
    pub status: String,
    pub course: String,
    pub year_level: String,
    pub school_year: String,
    pub details: String,
    pub processed_by: String,
}

impl Transaction {
    /// Every field rendered as text, in declaration order. `amount` is rendered
    /// the way a JavaScript number prints (`25000`, `550.5`).
    #[must_use]
    pub fn field_values(&self) -> [Cow<'_, str>; 14] {
        [
            Cow::Borrowed(self.campus_id.as_str()),
            Cow::Borrowed(self.student_name.as_str()),
            Cow::Borrowed(self.email.as_str()),
            Cow::Borrowed(self.reference_code.as_str()),
            Cow::Borrowed(self.payment_method.as_str()),
            Cow::Borrowed(self.transaction_type.as_str()),
            Cow::Owned(self.amount.to_string()),
            Cow::Borrowed(self.date.as_str()),
            Cow::Borrowed(self.status.as_str()),
            Cow::Borrowed(self.course.as_str()),
            Cow::Borrowed(self.year_level.as_str()),
            Cow::Borrowed(self.school_year.as_str()),
            Cow::Borrowed(self.details.as_str()),
            Cow::Borrowed(self.processed_by.as_str()),
        ]
    }

    /// Parsed `date`, or `None` if missing or malformed.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.date)
    }

    /// Sort key: missing and malformed dates are the oldest possible value.
    #[must_use]
    pub fn sort_date(&self) -> NaiveDate {
        self.parsed_date().unwrap_or(NaiveDate::MIN)
    }
}

/// Parses `month/day/year`.
#[must_use]
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().split('/');
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    let year = parts.next()?.trim().parse::<i32>().ok()?;

    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Subset of a transaction used to prefill a payment form for a known student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAutofill {
    pub campus_id: String,
    pub name: String,
    pub course: String,
    pub year_level: String,
    pub school_year: String,
}

impl From<&Transaction> for StudentAutofill {
    fn from(t: &Transaction) -> Self {
        Self {
            campus_id: t.campus_id.clone(),
            name: t.student_name.clone(),
            course: t.course.clone(),
            year_level: t.year_level.clone(),
            school_year: t.school_year.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_day_year() {
        assert_eq!(
            parse_record_date("10/05/2025"),
            NaiveDate::from_ymd_opt(2025, 10, 5)
        );
        assert_eq!(
            parse_record_date("9/1/2022"),
            NaiveDate::from_ymd_opt(2022, 9, 1)
        );
    }

    #[test]
    fn test_parse_rejects_bad_dates() {
        assert_eq!(parse_record_date(""), None);
        assert_eq!(parse_record_date("2025-10-05"), None);
        assert_eq!(parse_record_date("13/01/2025"), None);
        assert_eq!(parse_record_date("10/05/2025/1"), None);
    }

    #[test]
    fn test_missing_date_sorts_oldest() {
        let t = Transaction::default();
        assert_eq!(t.sort_date(), NaiveDate::MIN);
    }

    #[test]
    fn test_wire_format_uses_fixture_keys() {
        let json = r#"{
            "campusId": "C1005",
            "studentName": "Bob Smith",
            "Email": "bob.smith@university.edu",
            "referenceCode": "REF-001235",
            "paymentMethod": "Cash",
            "amount": 550.50,
            "date": "10/04/2025",
            "status": "Floating"
        }"#;

        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.email, "bob.smith@university.edu");
        assert_eq!(t.reference_code, "REF-001235");
        assert_eq!(t.course, "");

        let back = serde_json::to_value(&t).unwrap();
        assert_eq!(back["Email"], "bob.smith@university.edu");
        assert_eq!(back["paymentMethod"], "Cash");
    }

    #[test]
    fn test_amount_renders_like_js() {
        let mut t = Transaction {
            amount: 25000.0,
            ..Transaction::default()
        };
        assert_eq!(t.field_values()[6], "25000");
        t.amount = 550.5;
        assert_eq!(t.field_values()[6], "550.5");
    }

    #[test]
    fn test_autofill_projection() {
        let t = Transaction {
            campus_id: "C1001".to_string(),
            student_name: "Alice Johnson".to_string(),
            course: "BS Computer Science".to_string(),
            year_level: "4th Year".to_string(),
            school_year: "2025-2026".to_string(),
            ..Transaction::default()
        };

        let a = StudentAutofill::from(&t);
        assert_eq!(a.name, "Alice Johnson");
        assert_eq!(a.campus_id, "C1001");
    }
}
