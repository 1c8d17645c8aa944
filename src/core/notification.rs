//! Email bodies for the two notifications sent after a lead is stored.
//!
//! Bodies live in `templates/email/`; the HTML variants are autoescaped.

use crate::domain::model::{EmailContent, Lead, LeadId};
use crate::utils::error::Result;
use askama::Template;
use chrono::{DateTime, Utc};

const MONTHS_PER_YEAR: f64 = 12.0;
const SOLAR_OFFSET_RATIO: f64 = 0.9;
const PRICE_PER_KWH: f64 = 0.13;
const KWH_PER_KW_MONTH: f64 = 120.0;

/// Figures quoted to the sales team for a given monthly bill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavingsEstimate {
    pub annual_bill: f64,
    pub potential_savings: f64,
    pub system_size_kw: f64,
}

impl SavingsEstimate {
    pub fn from_monthly_bill(monthly_bill: f64) -> Self {
        let annual_bill = monthly_bill * MONTHS_PER_YEAR;
        Self {
            annual_bill,
            potential_savings: annual_bill * SOLAR_OFFSET_RATIO,
            // rounded up to one decimal place
            system_size_kw: ((monthly_bill / PRICE_PER_KWH / KWH_PER_KW_MONTH) * 10.0).ceil()
                / 10.0,
        }
    }
}

#[derive(Template)]
#[template(path = "email/customer.html", escape = "html")]
struct CustomerHtml<'a> {
    name: &'a str,
    email: &'a str,
    monthly_bill: f64,
}

#[derive(Template)]
#[template(path = "email/customer.txt", escape = "none")]
struct CustomerText<'a> {
    name: &'a str,
    email: &'a str,
    monthly_bill: f64,
}

#[derive(Template)]
#[template(path = "email/admin.html", escape = "html")]
struct AdminHtml<'a> {
    name: &'a str,
    email: &'a str,
    zip_code: &'a str,
    monthly_bill: f64,
    submitted: &'a str,
    estimate: SavingsEstimate,
    lead_id: &'a LeadId,
}

#[derive(Template)]
#[template(path = "email/admin.txt", escape = "none")]
struct AdminText<'a> {
    name: &'a str,
    email: &'a str,
    zip_code: &'a str,
    monthly_bill: f64,
    submitted: &'a str,
    estimate: SavingsEstimate,
    lead_id: &'a LeadId,
}

pub fn render_customer_email(name: &str, email: &str, monthly_bill: f64) -> Result<EmailContent> {
    let html = CustomerHtml {
        name,
        email,
        monthly_bill,
    }
    .render()?;
    let text = CustomerText {
        name,
        email,
        monthly_bill,
    }
    .render()?;

    Ok(EmailContent {
        subject: "Thank You for Your Interest in Solar Energy!".to_string(),
        html,
        text,
    })
}

pub fn render_admin_email(lead: &Lead) -> Result<EmailContent> {
    let estimate = SavingsEstimate::from_monthly_bill(lead.monthly_bill);
    let submitted = format_submitted_at(&lead.created_at);

    let html = AdminHtml {
        name: &lead.full_name,
        email: &lead.email,
        zip_code: &lead.zip_code,
        monthly_bill: lead.monthly_bill,
        submitted: &submitted,
        estimate,
        lead_id: &lead.id,
    }
    .render()?;
    let text = AdminText {
        name: &lead.full_name,
        email: &lead.email,
        zip_code: &lead.zip_code,
        monthly_bill: lead.monthly_bill,
        submitted: &submitted,
        estimate,
        lead_id: &lead.id,
    }
    .render()?;

    Ok(EmailContent {
        subject: format!("New Lead: {} - Solar Quote Request", lead.full_name),
        html,
        text,
    })
}

/// Long US-style date with a 12-hour clock, e.g. `March 14, 2026 at 03:09 PM UTC`.
pub fn format_submitted_at(created_at: &DateTime<Utc>) -> String {
    created_at.format("%B %-d, %Y at %I:%M %p UTC").to_string()
}
