use crate::infra::{at_midday, at_midnight, parse_date};
use chrono::{DateTime, Months, NaiveDate, Utc};
use clap::Args;
use rcd_permits::applicants::{
    Address, Gender, Guardian, MedicalInformation, PatientCondition, Physician,
};
use rcd_permits::applications::{
    ApplicantContact, ApplicationDetails, ApplicationSubmission, PaymentDetails, PaymentMethod,
};
use rcd_permits::config::AppConfig;
use rcd_permits::error::AppError;
use rcd_permits::permits::{classify, days_until_expiry, PermitNumber, PermitType};
use rcd_permits::reports::{
    ApplicationsReportColumn, PermitHoldersReportColumn, RenderedReport, ReportRequest,
};
use rcd_permits::Portal;

const DEMO_REVIEWER: &str = "demo-staff@rcd";
const DEMO_APP_NUMBER: u32 = 30_512;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Processing date for the demo (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip printing the CSV reports at the end of the demo.
    #[arg(long)]
    pub(crate) skip_reports: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PermitStatusArgs {
    /// Permit expiry date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) expiry_date: NaiveDate,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_permit_status(args: PermitStatusArgs) {
    let now = args.today.map(at_midday).unwrap_or_else(Utc::now);
    let expiry = at_midnight(args.expiry_date);
    println!("{}", describe_permit_status(expiry, now));
}

fn describe_permit_status(expiry: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = days_until_expiry(expiry, now);
    let status = classify(expiry, now);
    let distance = match days {
        d if d > 0 => format!("{d} day(s) remaining"),
        0 => "expires today".to_string(),
        d => format!("expired {} day(s) ago", -d),
    };
    format!(
        "Permit expiring {} on {}: {} ({distance})",
        expiry.format("%Y-%m-%d"),
        now.format("%Y-%m-%d"),
        status.label()
    )
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        skip_reports,
    } = args;
    let now = today.map(at_midday).unwrap_or_else(Utc::now);
    let config = AppConfig::load()?;
    let portal = Portal::in_memory(&config.documents);
    let service = &portal.applications;

    println!("RCD permit portal demo ({})", now.format("%Y-%m-%d"));

    let record = service.submit(demo_submission(now), now)?;
    println!(
        "Submitted {} application #{} for {} [{}]",
        record.application_type().label(),
        record.id,
        record.applicant_name(),
        record.processing.status
    );

    let record = service.begin_review(record.id, now)?;
    println!("Review started [{}]", record.processing.status);
    let record = service.approve(record.id, DEMO_REVIEWER, now)?;
    println!(
        "Approved by {DEMO_REVIEWER} [{}]; outstanding: {}",
        record.processing.status,
        task_list(&record.processing.outstanding_tasks())
    );

    service.assign_app_number(record.id, PermitNumber(DEMO_APP_NUMBER), now)?;
    service.set_hole_punched(record.id, true, now)?;
    let card = service.generate_wallet_card(record.id, now)?;
    let invoice = service.generate_invoice(record.id, now)?;
    println!("APP number {DEMO_APP_NUMBER} assigned and hole-punched");
    println!("  wallet card: {}", card.document.url);
    println!(
        "  invoice {}: {}",
        invoice.display_number(),
        invoice.document.url
    );

    let outcome = service.complete(record.id, now)?;
    println!(
        "Completed: applicant #{} holds permit {} ({}, expires {}, {} days left)",
        outcome.applicant.id,
        outcome.permit.rcd_permit_id,
        outcome.permit.status.label(),
        outcome.permit.expiry_date.format("%Y-%m-%d"),
        outcome.permit.days_until_expiry
    );

    if skip_reports {
        return Ok(());
    }

    let today = now.date_naive();
    let applications = portal.reports.render_applications(&ReportRequest {
        start_date: today,
        end_date: today,
        columns: vec![
            ApplicationsReportColumn::UserId,
            ApplicationsReportColumn::ApplicantName,
            ApplicationsReportColumn::AppNumber,
            ApplicationsReportColumn::ApplicationType,
            ApplicationsReportColumn::ApplicationStatus,
            ApplicationsReportColumn::PaymentMethod,
            ApplicationsReportColumn::TotalAmount,
        ],
    })?;
    print_report("Applications report", &applications);

    let horizon = today
        .checked_add_months(Months::new(48))
        .unwrap_or(today);
    let holders = portal.reports.render_permit_holders(
        &ReportRequest {
            start_date: today,
            end_date: horizon,
            columns: vec![
                PermitHoldersReportColumn::UserId,
                PermitHoldersReportColumn::ApplicantName,
                PermitHoldersReportColumn::GuardianPoaName,
                PermitHoldersReportColumn::RecentAppNumber,
                PermitHoldersReportColumn::PermitExpiryDate,
                PermitHoldersReportColumn::PermitStatus,
                PermitHoldersReportColumn::UserStatus,
            ],
        },
        now,
    )?;
    print_report("Permit holders report", &holders);

    Ok(())
}

fn task_list(tasks: &[rcd_permits::applications::ProcessingTask]) -> String {
    if tasks.is_empty() {
        return "none".to_string();
    }
    tasks
        .iter()
        .map(|task| task.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_report(title: &str, report: &RenderedReport) {
    println!("\n{title} ({} row(s))", report.row_count);
    print!("{}", String::from_utf8_lossy(&report.bytes));
}

fn demo_address() -> Address {
    Address {
        address_line_1: "5840 Minoru Blvd".to_string(),
        address_line_2: None,
        city: "Richmond".to_string(),
        province: "BC".to_string(),
        postal_code: "V6X 2A9".to_string(),
    }
}

fn demo_submission(now: DateTime<Utc>) -> ApplicationSubmission {
    let date_of_birth = now
        .date_naive()
        .checked_sub_months(Months::new(82 * 12))
        .unwrap_or_else(|| now.date_naive());

    ApplicationSubmission {
        contact: ApplicantContact {
            first_name: "Evelyn".to_string(),
            middle_name: Some("Mae".to_string()),
            last_name: "Chow".to_string(),
            email: Some("evelyn.chow@example.org".to_string()),
            phone: "604-555-0142".to_string(),
            address: demo_address(),
        },
        permit_type: PermitType::Permanent,
        temporary_permit_expiry: None,
        payment: PaymentDetails {
            method: PaymentMethod::Etransfer,
            processing_fee_cents: 2_600,
            donation_cents: 1_500,
            second_donation_cents: 0,
        },
        details: ApplicationDetails::New {
            date_of_birth,
            gender: Gender::Female,
            medical_information: MedicalInformation {
                disability: "Chronic obstructive pulmonary disease".to_string(),
                affected_areas: vec!["Lungs".to_string()],
                patient_condition: PatientCondition::Ambulatory,
                physician: Physician {
                    msp_number: 48_213,
                    first_name: "Daniel".to_string(),
                    last_name: "Ortiz".to_string(),
                    phone: "604-555-0171".to_string(),
                    address: demo_address(),
                },
            },
            guardian: Some(Guardian {
                first_name: "Karen".to_string(),
                last_name: "Chow".to_string(),
                relationship: "Daughter".to_string(),
                phone: "604-555-0150".to_string(),
                address: demo_address(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn permit_status_line_reports_distance() {
        let now = at_midday(date(2026, 3, 14));

        assert_eq!(
            describe_permit_status(at_midnight(date(2026, 4, 13)), now),
            "Permit expiring 2026-04-13 on 2026-03-14: Expiring (30 day(s) remaining)"
        );
        assert_eq!(
            describe_permit_status(at_midnight(date(2026, 3, 14)), now),
            "Permit expiring 2026-03-14 on 2026-03-14: Expired (expires today)"
        );
        assert_eq!(
            describe_permit_status(at_midnight(date(2026, 3, 10)), now),
            "Permit expiring 2026-03-10 on 2026-03-14: Expired (expired 4 day(s) ago)"
        );
    }

    #[test]
    fn demo_runs_end_to_end() {
        run_demo(DemoArgs {
            today: Some(date(2026, 3, 14)),
            skip_reports: false,
        })
        .expect("demo completes");
    }
}
