//! Notification drafts for requesters
//!
//! Drafts only: the mail itself goes out through the external `/email`
//! collaborator.

use serde::Serialize;

use crate::lifecycle::TransitionOutcome;
use crate::model::{DataRequest, RequestStatus};

const SIGNATURE: &str = "Best regards,\nITB Tracer Study Team";

/// A message ready to hand to the mail collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationDraft {
    pub request_id: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Draft the status-change mail for a transition, if one is recommended
pub fn draft_status_notification(outcome: &TransitionOutcome) -> Option<NotificationDraft> {
    if !outcome.notify_requester {
        return None;
    }

    let request = &outcome.request;
    let (subject, message) = match request.status {
        RequestStatus::Approved => (
            "Data Request Approved - Ready for Processing".to_string(),
            format!(
                "Your data request has been approved and is now being processed.\n\n\
                 Request Details:\n\
                 - Purpose: {}\n\
                 - Data Format: {}\n\
                 - Year Range: {} - {}\n\n\
                 We will notify you once the data is ready for download.",
                request.purpose,
                request.format,
                year_or_na(request.year_from),
                year_or_na(request.year_to),
            ),
        ),
        RequestStatus::Completed => (
            "Data Request Completed - Download Ready".to_string(),
            format!(
                "Your data request has been completed and is ready for download.\n\n\
                 The processed data will be delivered in {} format.\n\n\
                 Please review the data and let us know if you have any questions.",
                request.format
            ),
        ),
        RequestStatus::Rejected => (
            "Data Request Status Update".to_string(),
            "After reviewing your data request, we need to discuss some modifications \
             before we can proceed.\n\n\
             Please contact us to discuss the requirements and alternative approaches \
             for your research needs."
                .to_string(),
        ),
        RequestStatus::RequiresRevision => {
            let feedback = request
                .admin_notes
                .as_deref()
                .unwrap_or("Please contact us for details.");
            (
                "Data Request Requires Revision".to_string(),
                format!(
                    "Your data request requires some revisions before we can process it.\n\n\
                     Please review the feedback below and resubmit your request with the \
                     necessary modifications:\n\n{}",
                    feedback
                ),
            )
        }
        status @ (RequestStatus::Pending | RequestStatus::InProgress) => (
            format!("Data Request Update - {}", request.name),
            format!(
                "The status of your data request is now: {}.",
                status.label()
            ),
        ),
    };

    Some(NotificationDraft {
        request_id: request.id.clone(),
        to: request.email.clone(),
        subject,
        body: letter(&request.name, &message),
    })
}

/// Draft the "data is ready" mail carrying the download link
///
/// The link is `<base_url>/sql/<csv_id>`; a trailing `/` on `base_url` is
/// ignored.
pub fn draft_download_ready(
    request: &DataRequest,
    base_url: &str,
    csv_id: &str,
) -> NotificationDraft {
    let link = format!("{}/sql/{}", base_url.trim_end_matches('/'), csv_id);
    let message = format!(
        "We are pleased to inform you that your requested data is now available for download.\n\n\
         You can access your data by visiting the following link:\n{}\n\n\
         This link will provide access to the CSV file you requested.",
        link
    );

    NotificationDraft {
        request_id: request.id.clone(),
        to: request.email.clone(),
        subject: "Your Requested Data is Ready".to_string(),
        body: letter(&request.name, &message),
    }
}

fn letter(name: &str, message: &str) -> String {
    let name = if name.trim().is_empty() { "Student" } else { name };
    format!("Dear {},\n\n{}\n\n{}", name, message, SIGNATURE)
}

fn year_or_na(year: Option<i32>) -> String {
    year.map(|y| y.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
