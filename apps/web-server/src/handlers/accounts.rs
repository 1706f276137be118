//! Sign-in, sign-out, sign-up and password change.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use yatube_core::domain::User;
use yatube_core::error::RepoError;
use yatube_core::forms::{FormErrors, LoginForm, PasswordChangeForm, SignupForm};

use super::{redirect, render_page};
use crate::middleware::auth::{Identity, LOGIN_PATH, OptionalIdentity, SESSION_COOKIE};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::templates::{self, page_context};

const MSG_USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// `next` if it names a path on this site, `/` otherwise.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

fn render_login(
    viewer: Option<&Identity>,
    username: &str,
    next: Option<&str>,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let mut context = page_context(viewer);
    context.insert("username", username);
    context.insert("next", &next);
    context.insert("errors", errors);
    render_page("users/login.html", &context)
}

/// GET /auth/login/
pub async fn login_form(
    viewer: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    render_login(
        viewer.viewer(),
        "",
        query.next.as_deref(),
        &FormErrors::new(),
    )
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let next = form.next.as_deref();

    let username = match form.validate() {
        Ok(username) => username,
        Err(errors) => return render_login(None, &form.username, next, &errors),
    };

    let user = match state.users.find_by_username(&username).await? {
        Some(user) if state.passwords.verify(&form.password, &user.password_hash)? => user,
        _ => {
            tracing::info!(username = %username, "Failed login");
            return render_login(None, &username, next, &LoginForm::invalid_credentials());
        }
    };

    let token = state
        .tokens
        .generate_token(user.id, &user.username, user.roles())?;
    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(state.tokens.expiration_seconds()))
        .finish();

    tracing::info!(user_id = %user.id, username = %user.username, "Logged in");
    Ok(HttpResponse::Found()
        .insert_header((actix_web::http::header::LOCATION, safe_next(next)))
        .cookie(cookie)
        .finish())
}

/// GET or POST /auth/logout/
pub async fn logout() -> AppResult<HttpResponse> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    let body = templates::render("users/logged_out.html", &page_context(None))?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .cookie(cookie)
        .body(body))
}

fn render_signup(form: &SignupForm, errors: &FormErrors) -> AppResult<HttpResponse> {
    let mut context = page_context(None);
    context.insert("form", form);
    context.insert("errors", errors);
    render_page("users/signup.html", &context)
}

/// GET /auth/signup/
pub async fn signup_form() -> AppResult<HttpResponse> {
    render_signup(&SignupForm::default(), &FormErrors::new())
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let (username, email, password) = match form.validate() {
        Ok(clean) => clean,
        Err(errors) => return render_signup(&form, &errors),
    };

    let mut taken = FormErrors::new();
    taken.add("username", MSG_USERNAME_TAKEN);

    if state.users.find_by_username(&username).await?.is_some() {
        return render_signup(&form, &taken);
    }

    let password_hash = state.passwords.hash(&password)?;
    match state
        .users
        .create(User::new(username, email, password_hash))
        .await
    {
        Ok(_) => Ok(redirect(LOGIN_PATH)),
        // Lost a race with another sign-up for the same name.
        Err(RepoError::Constraint(_)) => render_signup(&form, &taken),
        Err(e) => Err(e.into()),
    }
}

fn render_password_change(identity: &Identity, errors: &FormErrors) -> AppResult<HttpResponse> {
    let mut context = page_context(Some(identity));
    context.insert("errors", errors);
    render_page("users/password_change.html", &context)
}

/// GET /auth/password_change/
pub async fn password_change_form(identity: Identity) -> AppResult<HttpResponse> {
    render_password_change(&identity, &FormErrors::new())
}

/// POST /auth/password_change/
pub async fn password_change(
    identity: Identity,
    state: web::Data<AppState>,
    form: web::Form<PasswordChangeForm>,
) -> AppResult<HttpResponse> {
    let new_password = match form.validate() {
        Ok(password) => password,
        Err(errors) => return render_password_change(&identity, &errors),
    };

    let Some(user) = state.users.find_by_id(identity.user_id).await? else {
        // The account behind a still-valid token is gone.
        return Ok(redirect(LOGIN_PATH));
    };
    if !state
        .passwords
        .verify(&form.old_password, &user.password_hash)?
    {
        return render_password_change(&identity, &PasswordChangeForm::wrong_old_password());
    }

    let hash = state.passwords.hash(&new_password)?;
    state.users.update_password(user.id, hash).await?;
    tracing::info!(user_id = %user.id, "Password changed");

    Ok(redirect("/auth/password_change/done/"))
}

/// GET /auth/password_change/done/
pub async fn password_change_done(identity: Identity) -> AppResult<HttpResponse> {
    render_page(
        "users/password_change_done.html",
        &page_context(Some(&identity)),
    )
}

#[cfg(test)]
mod tests {
    use super::safe_next;

    #[test]
    fn test_safe_next_only_allows_local_paths() {
        assert_eq!(safe_next(Some("/new/")), "/new/");
        assert_eq!(safe_next(Some("/leo/1/?page=2")), "/leo/1/?page=2");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
