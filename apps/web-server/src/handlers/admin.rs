//! Staff-only operator actions.

use actix_web::{HttpResponse, web};

use yatube_core::error::RepoError;
use yatube_core::forms::{FormErrors, GroupForm};
use yatube_core::ports::AuthError;

use super::{redirect, render_page};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::templates::page_context;

const MSG_SLUG_TAKEN: &str = "Group with this Slug already exists.";

fn require_staff(identity: &Identity) -> AppResult<()> {
    if identity.is_staff() {
        Ok(())
    } else {
        tracing::warn!(user = %identity.username, "Non-staff user on an operator path");
        Err(AuthError::InsufficientPermissions.into())
    }
}

fn render_group_form(
    identity: &Identity,
    form: &GroupForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let mut context = page_context(Some(identity));
    context.insert("form", form);
    context.insert("errors", errors);
    render_page("admin/group_form.html", &context)
}

/// GET /admin/groups/new/
pub async fn group_form(identity: Identity) -> AppResult<HttpResponse> {
    require_staff(&identity)?;
    render_group_form(&identity, &GroupForm::default(), &FormErrors::new())
}

/// POST /admin/groups/new/
pub async fn create_group(
    identity: Identity,
    state: web::Data<AppState>,
    form: web::Form<GroupForm>,
) -> AppResult<HttpResponse> {
    require_staff(&identity)?;
    let form = form.into_inner();

    let group = match form.validate() {
        Ok(group) => group,
        Err(errors) => return render_group_form(&identity, &form, &errors),
    };

    let mut taken = FormErrors::new();
    taken.add("slug", MSG_SLUG_TAKEN);

    if state.groups.find_by_slug(&group.slug).await?.is_some() {
        return render_group_form(&identity, &form, &taken);
    }

    match state.groups.create(group).await {
        Ok(group) => {
            tracing::info!(slug = %group.slug, by = %identity.username, "Group created");
            Ok(redirect(format!("/group/{}/", group.slug)))
        }
        Err(RepoError::Constraint(_)) => render_group_form(&identity, &form, &taken),
        Err(e) => Err(e.into()),
    }
}

/// POST /admin/cache/clear/
pub async fn clear_cache(
    identity: Identity,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    require_staff(&identity)?;

    if let Err(e) = state.cache.clear().await {
        return Err(AppError::Internal(format!("Failed to clear page cache: {e}")));
    }
    tracing::info!(by = %identity.username, "Page cache cleared");

    Ok(redirect("/"))
}
