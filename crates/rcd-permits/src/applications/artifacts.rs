//! Plain-text renderings of the invoice and wallet card handed to permit holders.

use chrono::{DateTime, Utc};

use super::domain::ApplicationRecord;
use crate::permits::PermitNumber;

pub(crate) const TEXT_DOCUMENT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub(crate) fn invoice_key(record: &ApplicationRecord, invoice_number: u64) -> String {
    format!("invoices/{}/RCD-INV-{invoice_number:06}.txt", record.id)
}

pub(crate) fn wallet_card_key(record: &ApplicationRecord, app_number: PermitNumber) -> String {
    format!("wallet-cards/{}/APP-{app_number}.txt", record.id)
}

pub(crate) fn dollars(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

pub(crate) fn render_invoice(
    record: &ApplicationRecord,
    invoice_number: u64,
    now: DateTime<Utc>,
) -> String {
    let submission = &record.submission;
    let payment = &submission.payment;

    let mut lines = vec![
        "Richmond Centre for Disability".to_string(),
        format!("Parking Permit Receipt RCD-INV-{invoice_number:06}"),
        format!("Date: {}", now.format("%Y-%m-%d")),
        String::new(),
        format!("Billed to: {}", record.applicant_name()),
        format!("Address: {}", submission.contact.address),
        format!(
            "Application: #{} ({} {} permit)",
            record.id,
            record.application_type().label(),
            submission.permit_type.label()
        ),
        String::new(),
        format!(
            "Processing fee: ${}",
            dollars(u64::from(payment.processing_fee_cents))
        ),
    ];
    if payment.donation_cents > 0 {
        lines.push(format!(
            "Donation: ${}",
            dollars(u64::from(payment.donation_cents))
        ));
    }
    if payment.second_donation_cents > 0 {
        lines.push(format!(
            "Second donation: ${}",
            dollars(u64::from(payment.second_donation_cents))
        ));
    }
    lines.push(format!("Total: ${}", dollars(payment.total_cents())));
    lines.push(format!("Paid by: {}", payment.method.label()));
    text_document(lines)
}

pub(crate) fn render_wallet_card(
    record: &ApplicationRecord,
    app_number: PermitNumber,
    permit_expiry_date: DateTime<Utc>,
) -> String {
    let submission = &record.submission;
    text_document(vec![
        "RCD Accessible Parking Permit".to_string(),
        format!("Holder: {}", record.applicant_name()),
        format!("APP #: {app_number}"),
        format!("Type: {}", submission.permit_type.label()),
        format!("Expires: {}", permit_expiry_date.format("%Y-%m-%d")),
    ])
}

fn text_document(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollars_pads_cents() {
        assert_eq!(dollars(0), "0.00");
        assert_eq!(dollars(5), "0.05");
        assert_eq!(dollars(2_650), "26.50");
    }
}
