//! Visitor-facing wording for every step of the dialog.

use crate::config::ContactConfig;

pub const OPENING: &str =
    "Hi there! 👋 I can help you explore our services or apply for a role. May I know your name?";

pub fn greeting(name: &str) -> String {
    format!("Nice to meet you, {name}! What's the name of your company?")
}

pub const ASK_PHONE: &str = "Thanks! What's the best phone number to reach you on?";
pub const INVALID_PHONE: &str = "That doesn't look like a valid Indian mobile number. Please enter 10 digits starting with 6-9, optionally prefixed with +91 or 0.";

pub const ASK_EMAIL: &str = "Got it. And your email address?";
pub const INVALID_EMAIL: &str =
    "Please enter a valid email address, for example name@company.com.";

pub const ASK_PATH: &str = "How can we help you today?";

pub const ASK_CV: &str = "Great! Please upload your CV as a PDF (max 5 MB).";
pub const UPLOADING: &str = "Uploading your CV...";

pub const ASK_CATEGORY: &str = "Which service are you interested in?";
pub const ASK_REQUIREMENTS: &str = "Do you have specific requirements you'd like to share?";
pub const ASK_REQUIREMENT_TEXT: &str = "Please describe your requirements.";
pub const ASK_EMPLOYEE_SIZE: &str = "How many employees does your company have?";
pub const ASK_BUDGET: &str = "What budget do you have in mind?";
pub const ASK_CUSTOM_BUDGET: &str = "Please enter your budget in INR, for example 125000 or ₹1.5L.";
pub const INVALID_BUDGET: &str =
    "Please enter a valid amount greater than zero, for example 125000 or ₹125,000.";
pub const ASK_START_TIME: &str = "When would you like to start?";

pub const PREPARING_SUMMARY: &str = "Preparing your estimate...";
pub const SUMMARY_FAILED: &str =
    "Sorry, we couldn't prepare your estimate right now. Please pick a start time to try again.";

pub const ASK_DECLARATION: &str =
    "Please review the estimate above. Do you agree to proceed with these details?";
pub const SAVING: &str = "Submitting your details...";

pub fn save_failed(reason: &str) -> String {
    format!("Sorry, we couldn't submit your details ({reason}). Please try again.")
}

pub fn saved(email_sent: bool) -> String {
    if email_sent {
        "Thank you! Your details have been submitted and our team has been notified. We'll be in touch shortly.".to_string()
    } else {
        "Thank you! Your details have been saved and our team will be in touch shortly.".to_string()
    }
}

pub fn upload_succeeded(filename: &str) -> String {
    format!("CV uploaded successfully: {filename}")
}

pub fn upload_email_status(email_sent: bool, email_error: Option<&str>) -> Option<String> {
    match (email_sent, email_error) {
        (true, _) => Some("Our recruitment team has been notified.".to_string()),
        (false, Some(err)) if !err.is_empty() => Some(format!(
            "We couldn't email our team ({err}), but your CV has been received."
        )),
        (false, _) => None,
    }
}

pub fn upload_failed(reason: &str) -> String {
    format!("Upload failed: {reason}. Please try again.")
}

pub const APPLICATION_THANKS: &str =
    "Thank you for applying! Our team will review your CV and reach out if there's a match.";

/// Farewell after a closing utterance, personalized where we can.
pub fn farewell(name: Option<&str>, company: Option<&str>, contact: &ContactConfig) -> String {
    let opener = match name {
        Some(name) => format!("You're welcome, {name}!"),
        None => "You're welcome!".to_string(),
    };
    let pleasure = match company {
        Some(company) => format!(" It was a pleasure assisting {company}."),
        None => " It was a pleasure assisting you.".to_string(),
    };
    format!(
        "{opener}{pleasure} If you need anything else, reach us at {} or {}. Have a great day!",
        contact.email, contact.phone
    )
}
