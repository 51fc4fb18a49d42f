//! HTML rendering for the dashboard and action outcome pages.
//!
//! Outcome pages redirect back to the dashboard after 3 seconds.

use std::fmt::Write as _;

use crate::executor::{ActionOutcome, OutcomeFailure};
use crate::logo::Logo;
use crate::router::Action;

const DASHBOARD_HTML: &str = include_str!("web/ui/dashboard.html");
const OUTCOME_HTML: &str = include_str!("web/ui/outcome.html");

/// Render the page for an outcome; the dashboard for [`Action::Dashboard`].
#[must_use]
pub fn render(outcome: &ActionOutcome, logo: Option<&Logo>) -> String {
    match outcome.action {
        Action::Dashboard => render_dashboard(logo),
        _ => render_outcome(outcome),
    }
}

/// Dashboard with boot, status and reset controls.
#[must_use]
pub fn render_dashboard(logo: Option<&Logo>) -> String {
    let logo_html = logo.map_or_else(String::new, |logo| {
        format!(
            r#"<img src="data:image/png;base64,{}" alt="BSR Logo" class="logo">"#,
            logo.as_base64()
        )
    });
    DASHBOARD_HTML.replace("{{LOGO}}", &logo_html)
}

/// Result page for an executed or refused action.
#[must_use]
pub fn render_outcome(outcome: &ActionOutcome) -> String {
    OUTCOME_HTML.replace("{{MESSAGE}}", &outcome_message(outcome))
}

fn outcome_message(outcome: &ActionOutcome) -> String {
    let mut html = String::new();
    match (outcome.action, &outcome.failure) {
        (Action::Unauthorized, _) => {
            html.push_str(
                "        <p class=\"error\">ACCESS DENIED</p>\n\
                 \x20       <p class=\"success\">Invalid Passcode</p>\n\
                 \x20       <p>No command was executed. Redirecting back to dashboard...</p>",
            );
        }
        (Action::Status, None) => sent(&mut html, "Status Check - Driver IO is ONLINE"),
        (Action::Status, Some(failure)) => {
            sent(&mut html, "Status Check - Driver IO is OFFLINE");
            if *failure == OutcomeFailure::StatusNotConfigured {
                html.push_str(
                    "\n        <p class=\"hint\">DRIVERIO_IP is not set in driverio_config.txt.</p>",
                );
            }
        }
        (Action::Boot | Action::Reboot, Some(OutcomeFailure::Pin(reason))) => {
            let _ = write!(
                html,
                "        <p class=\"error\">Command failed: {}</p>\n\
                 \x20       <p class=\"hint\">{}</p>\n\
                 \x20       <p>Redirecting back to dashboard...</p>",
                action_text(outcome.action),
                escape_html(reason)
            );
        }
        (action, _) => sent(&mut html, action_text(action)),
    }
    html
}

fn sent(html: &mut String, text: &str) {
    let _ = write!(
        html,
        "        <p class=\"success\">Command sent: {text}</p>\n\
         \x20       <p>Redirecting back to dashboard...</p>"
    );
}

fn action_text(action: Action) -> &'static str {
    match action {
        Action::Boot => "Force Bootloader Recovery Mode",
        Action::Reboot => "Hardware Reset (RUN)",
        Action::Status => "Status Check",
        Action::Unauthorized => "Invalid Passcode",
        Action::Dashboard | Action::NotFound => "Unknown Action",
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
