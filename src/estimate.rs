//! Cost estimate: INR helpers and the markup summary shown before the
//! declaration step.

use crate::backend::LeadSnapshot;
use crate::config::ContactConfig;
use crate::dialog::session::{Budget, BudgetBucket, Category, EmployeeSize, LeadPath};

const THOUSAND: u64 = 1_000;
const LAKH: u64 = 100_000;
const CRORE: u64 = 10_000_000;

/// Format whole rupees with thousands grouping: `125000` → `₹125,000`.
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("₹{grouped}")
}

/// Parse an INR amount with optional currency marker and unit suffix.
///
/// `₹`, `Rs`, `INR`, commas and spaces are ignored. Suffixes: `K`,
/// `L`/`LAC`/`LAKH`/`LAKHS`, `CR`/`CRORE`/`CRORES`. Returns the rounded
/// rupee value, or `None` when the text is not a non-negative number.
pub fn parse_inr(input: &str) -> Option<u64> {
    let clean: String = input
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| !matches!(c, '₹' | ',' | ' ' | '\t'))
        .collect();

    let mut rest = clean.as_str();
    for prefix in ["INR", "RS.", "RS"] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
            break;
        }
    }

    let split = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let (number, unit) = rest.split_at(split);
    if number.is_empty() {
        return None;
    }
    let value: f64 = number.parse().ok()?;

    let multiplier = match unit {
        "" => 1,
        "K" => THOUSAND,
        "L" | "LAC" | "LAKH" | "LAKHS" => LAKH,
        "CR" | "CRORE" | "CRORES" => CRORE,
        _ => return None,
    };

    let rupees = (value * multiplier as f64).round();
    if !rupees.is_finite() || rupees < 0.0 || rupees > u64::MAX as f64 {
        return None;
    }
    Some(rupees as u64)
}

/// What the lead said about money, reduced to something we can price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetDescriptor {
    Fixed(u64),
    Range { min: u64, max: u64 },
    AtLeast(u64),
}

impl BudgetDescriptor {
    pub fn from_budget(budget: Budget) -> Self {
        match budget {
            Budget::Custom { amount } => Self::Fixed(amount),
            Budget::Bucket(BudgetBucket::Under50K) => Self::Range {
                min: 0,
                max: 50 * THOUSAND,
            },
            Budget::Bucket(BudgetBucket::From50KTo1L) => Self::Range {
                min: 50 * THOUSAND,
                max: LAKH,
            },
            Budget::Bucket(BudgetBucket::From1LTo5L) => Self::Range {
                min: LAKH,
                max: 5 * LAKH,
            },
            Budget::Bucket(BudgetBucket::Above5L) => Self::AtLeast(5 * LAKH),
        }
    }

    /// Amount the component split is computed from.
    pub fn base_amount(&self) -> u64 {
        match *self {
            Self::Fixed(amount) => amount,
            Self::Range { min, max } => (min + max) / 2,
            Self::AtLeast(min) => min,
        }
    }
}

/// Component split (label, percent) for build categories.
fn build_components(category: Category) -> Vec<(&'static str, u64)> {
    match category {
        Category::WebDevelopment => vec![
            ("UI/UX Design", 20),
            ("Web Development", 50),
            ("Testing", 10),
            ("Deployment", 10),
            ("API & hosting", 10),
        ],
        other => vec![
            ("UI/UX Design", 15),
            (core_label(other), 30),
            ("Dashboard Development", 30),
            ("Testing", 10),
            ("Deployment", 10),
            ("API & hosting", 5),
        ],
    }
}

fn core_label(category: Category) -> &'static str {
    match category {
        Category::Ai => "AI Development",
        other => other.label(),
    }
}

/// Monthly retainer for marketing categories, priced by company size.
pub fn monthly_retainer(category: Category, size: EmployeeSize) -> Option<u64> {
    let amount = match (category, size) {
        (Category::DigitalMarketing, EmployeeSize::Small) => 25 * THOUSAND,
        (Category::DigitalMarketing, EmployeeSize::Medium) => 40 * THOUSAND,
        (Category::DigitalMarketing, EmployeeSize::Large) => 70 * THOUSAND,
        (Category::Seo, EmployeeSize::Small) => 10 * THOUSAND,
        (Category::Seo, EmployeeSize::Medium) => 15 * THOUSAND,
        (Category::Seo, EmployeeSize::Large) => 20 * THOUSAND,
        _ => return None,
    };
    Some(amount)
}

fn build_table(title: &str, category: Category, budget: Option<BudgetDescriptor>) -> String {
    let base = budget.map(|b| b.base_amount());
    let mut rows = String::new();
    let mut total: u64 = 0;
    for (label, percent) in build_components(category) {
        let cell = match base {
            Some(base) => {
                let amount = base.saturating_mul(percent).saturating_add(50) / 100;
                total = total.saturating_add(amount);
                format_inr(amount)
            }
            None => "-".to_string(),
        };
        rows.push_str(&format!("<tr><td>{label}</td><td>{cell}</td></tr>"));
    }
    let total_cell = base.map_or_else(|| "-".to_string(), |_| format_inr(total));
    format!(
        "<div class=\"estimate-title\">{title}</div>\n\
         <table class=\"estimate-table\">\n\
         <thead><tr><th>Component</th><th>Estimated Cost</th></tr></thead>\n\
         <tbody>{rows}</tbody>\n\
         <tfoot><tr><th>Total</th><th>{total_cell}</th></tr></tfoot>\n\
         </table>\n"
    )
}

fn retainer_table(category: Category, size: Option<EmployeeSize>) -> String {
    let cell = size
        .and_then(|s| monthly_retainer(category, s))
        .map_or_else(|| "-".to_string(), |amount| format!("{}/ month", format_inr(amount)));
    format!(
        "<div class=\"estimate-title\">{}</div>\n\
         <table class=\"estimate-table\">\n\
         <thead><tr><th>Item</th><th>Estimated Cost</th></tr></thead>\n\
         <tbody><tr><td>Monthly Retainer</td><td>{cell}</td></tr></tbody>\n\
         </table>\n",
        category.label()
    )
}

/// The estimate table alone, picked by category.
pub fn estimate_table(lead: &LeadSnapshot) -> String {
    let budget = lead.budget().map(BudgetDescriptor::from_budget);
    match lead.category {
        Some(Category::Ai) => build_table("AI Development", Category::Ai, budget),
        Some(category @ (Category::DigitalMarketing | Category::Seo)) => {
            retainer_table(category, lead.employee_size)
        }
        Some(category) => build_table(category.label(), category, budget),
        None => "<div class=\"estimate-title\">Estimate</div>\n\
                 <table class=\"estimate-table\">\n\
                 <thead><tr><th>Item</th><th>Estimated Cost</th></tr></thead>\n\
                 <tbody><tr><td>-</td><td>-</td></tr></tbody>\n\
                 </table>\n"
            .to_string(),
    }
}

/// Full summary: table, terms note and contact line.
pub fn render_summary(lead: &LeadSnapshot, contact: &ContactConfig) -> String {
    let retainer = lead.category.is_some_and(|c| !c.needs_budget());
    let note = if retainer {
        "<p class=\"estimate-note\"><em>Minimum engagement for this service is 6 months.</em></p>"
    } else {
        "<p class=\"estimate-note\">Note: The above pricing is indicative and may vary after we start working and refine the scope in detail.</p>"
    };
    format!(
        "{}{note}<p class=\"estimate-contact\">Contact: {} | {}</p>",
        estimate_table(lead),
        escape_html(&contact.email),
        escape_html(&contact.phone),
    )
}

/// Key/value table of everything collected, for the sales team email.
pub fn lead_overview(lead: &LeadSnapshot) -> String {
    let path = lead.path.map(|p| match p {
        LeadPath::Job => "job",
        LeadPath::Product => "product",
        LeadPath::Unset => "",
    });
    let fields: [(&str, Option<String>); 12] = [
        ("Name", lead.name.clone()),
        ("Company", lead.company_name.clone()),
        ("Email", lead.email.clone()),
        ("Phone", lead.phone.clone()),
        ("Path", path.map(str::to_string)),
        ("Category", lead.category.map(|c| c.label().to_string())),
        ("Employee Size", lead.employee_size.map(|s| s.label().to_string())),
        ("Budget", lead.budget.clone()),
        ("Custom Amount", lead.budget_amount.map(format_inr)),
        ("Start Time", lead.start_time.map(|s| s.label().to_string())),
        ("Requirements", lead.requirement_text.clone()),
        ("CV Filename", lead.cv_filename.clone()),
    ];

    let rows: String = fields
        .iter()
        .map(|(label, value)| {
            format!(
                "<tr><td style='padding:6px 8px;border:1px solid #eee;'>{label}</td>\
                 <td style='padding:6px 8px;border:1px solid #eee;'>{}</td></tr>",
                escape_html(value.as_deref().unwrap_or(""))
            )
        })
        .collect();

    format!(
        "<h3 style='margin:10px 0 6px;'>Lead Details</h3>\
         <table style='border-collapse:collapse;font-size:14px;'><tbody>{rows}</tbody></table>"
    )
}

/// Minimal escaping for visitor-supplied text placed into markup.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactConfig {
        ContactConfig {
            email: "sales@example.com".to_string(),
            phone: "+91 90000 00000".to_string(),
        }
    }

    fn lead(category: Category) -> LeadSnapshot {
        LeadSnapshot {
            name: Some("Ann".into()),
            company_name: Some("Acme".into()),
            path: Some(LeadPath::Product),
            category: Some(category),
            employee_size: Some(EmployeeSize::Medium),
            ..Default::default()
        }
    }

    #[test]
    fn inr_formatting() {
        assert_eq!(format_inr(0), "₹0");
        assert_eq!(format_inr(999), "₹999");
        assert_eq!(format_inr(1_000), "₹1,000");
        assert_eq!(format_inr(125_000), "₹125,000");
        assert_eq!(format_inr(10_000_000), "₹10,000,000");
    }

    #[test]
    fn inr_parsing() {
        assert_eq!(parse_inr("₹50K"), Some(50_000));
        assert_eq!(parse_inr("1L"), Some(100_000));
        assert_eq!(parse_inr("5 lakhs"), Some(500_000));
        assert_eq!(parse_inr("INR 2,500"), Some(2_500));
        assert_eq!(parse_inr("2.5 crores"), Some(25_000_000));
        assert_eq!(parse_inr("0"), Some(0));
        assert_eq!(parse_inr("-1"), None);
        assert_eq!(parse_inr("ten"), None);
        assert_eq!(parse_inr("10 bucks"), None);
    }

    #[test]
    fn descriptor_base_amounts() {
        let d = |b| BudgetDescriptor::from_budget(Budget::Bucket(b)).base_amount();
        assert_eq!(d(BudgetBucket::Under50K), 25_000);
        assert_eq!(d(BudgetBucket::From50KTo1L), 75_000);
        assert_eq!(d(BudgetBucket::From1LTo5L), 300_000);
        assert_eq!(d(BudgetBucket::Above5L), 500_000);
        assert_eq!(
            BudgetDescriptor::from_budget(Budget::Custom { amount: 123_456 }).base_amount(),
            123_456
        );
    }

    #[test]
    fn app_table_splits_budget() {
        let mut l = lead(Category::AppDevelopment);
        l.budget = Some("Custom".into());
        l.budget_amount = Some(100_000);
        let table = estimate_table(&l);
        assert!(table.contains("App Development"));
        assert!(table.contains("<td>UI/UX Design</td><td>₹15,000</td>"));
        assert!(table.contains("<td>Dashboard Development</td><td>₹30,000</td>"));
        assert!(table.contains("<td>API & hosting</td><td>₹5,000</td>"));
        assert!(table.contains("<th>Total</th><th>₹100,000</th>"));
    }

    #[test]
    fn web_table_uses_web_split() {
        let mut l = lead(Category::WebDevelopment);
        l.budget = Some(BudgetBucket::From50KTo1L.label().into());
        let table = estimate_table(&l);
        assert!(table.contains("<td>Web Development</td><td>₹37,500</td>"));
        assert!(!table.contains("Dashboard"));
        assert!(table.contains("<th>Total</th><th>₹75,000</th>"));
    }

    #[test]
    fn ai_table_without_budget_shows_dashes() {
        let table = estimate_table(&lead(Category::Ai));
        assert!(table.contains("AI Development"));
        assert!(table.contains("<td>Testing</td><td>-</td>"));
        assert!(table.contains("<th>Total</th><th>-</th>"));
    }

    #[test]
    fn retainers_by_size() {
        let seo = estimate_table(&lead(Category::Seo));
        assert!(seo.contains("₹15,000/ month"));
        let dm = estimate_table(&lead(Category::DigitalMarketing));
        assert!(dm.contains("₹40,000/ month"));
        assert_eq!(
            monthly_retainer(Category::DigitalMarketing, EmployeeSize::Large),
            Some(70_000)
        );
        assert_eq!(monthly_retainer(Category::Ai, EmployeeSize::Small), None);
    }

    #[test]
    fn summary_notes_depend_on_category() {
        let seo = render_summary(&lead(Category::Seo), &contact());
        assert!(seo.contains("Minimum engagement"));
        assert!(!seo.contains("indicative"));
        assert!(seo.contains("sales@example.com"));

        let ai = render_summary(&lead(Category::Ai), &contact());
        assert!(ai.contains("indicative"));
        assert!(!ai.contains("Minimum engagement"));
    }

    #[test]
    fn summary_without_category_is_placeholder() {
        let summary = render_summary(&LeadSnapshot::default(), &contact());
        assert!(summary.contains("<div class=\"estimate-title\">Estimate</div>"));
    }

    #[test]
    fn overview_escapes_visitor_text() {
        let mut l = lead(Category::Seo);
        l.requirement_text = Some("<script>alert(1)</script>".into());
        let html = lead_overview(&l);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(">Acme<"));
        assert!(html.contains(">product<"));
    }
}
