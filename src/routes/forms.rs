use std::sync::Arc;

use rocket::form::Form;
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::response::{status, Flash, Redirect};
use rocket::serde::json::Json;
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use super::{looks_like_email, non_empty, page_context};
use crate::error::{AppError, AppResult};
use crate::models::contact::ContactForm;
use crate::models::inquiry::InquiryForm;
use crate::models::review::{ReviewForm, MAX_RATING, MIN_RATING};
use crate::rate_limit::{Bucket, RateLimiter};
use crate::security::auth::ClientIp;
use crate::security::{captcha_widget, require_captcha, CaptchaVerifier};
use crate::store::Store;

const RATE_LIMITED: &str = "Too many submissions. Please try again in a few minutes.";

// ── Inquiry ────────────────────────────────────────────

/// Text fields are optional at the parse layer so a missing field reaches
/// `validate()` and comes back as a flash message instead of a 422.
#[derive(Debug, Clone, FromForm, Default)]
pub struct InquirySubmit {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub project_types: Vec<String>,
    pub features: Vec<String>,
    pub addons: Vec<String>,
    pub selected_plan: Option<String>,
    pub timeline: Option<String>,
    pub budget: Option<String>,
    pub message: Option<String>,
}

fn required(value: &Option<String>, message: &str) -> AppResult<String> {
    non_empty(value.as_deref()).ok_or_else(|| AppError::validation(message))
}

fn required_email(value: &Option<String>) -> AppResult<String> {
    match non_empty(value.as_deref()) {
        Some(email) if looks_like_email(&email) => Ok(email),
        _ => Err(AppError::validation("Please enter a valid email address.")),
    }
}

fn clean_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

impl InquirySubmit {
    /// Required: name, phone, a plausible email, at least one project type
    /// and at least one feature.
    pub fn validate(&self) -> AppResult<InquiryForm> {
        let project_types = clean_list(&self.project_types);
        let features = clean_list(&self.features);

        let name = required(&self.name, "Please enter your name.")?;
        let email = required_email(&self.email)?;
        let phone = required(&self.phone, "Please enter a phone number.")?;
        if project_types.is_empty() {
            return Err(AppError::validation("Select at least one project type."));
        }
        if features.is_empty() {
            return Err(AppError::validation("Select at least one feature."));
        }

        Ok(InquiryForm {
            name,
            email,
            phone,
            company: non_empty(self.company.as_deref()),
            project_types,
            features,
            addons: clean_list(&self.addons),
            selected_plan: non_empty(self.selected_plan.as_deref()),
            timeline: non_empty(self.timeline.as_deref()),
            budget: non_empty(self.budget.as_deref()),
            message: non_empty(self.message.as_deref()),
        })
    }
}

#[get("/inquiry?<plan>")]
pub fn inquiry_page(
    store: &State<Arc<dyn Store>>,
    flash: Option<FlashMessage<'_>>,
    plan: Option<&str>,
) -> Template {
    let context = page_context(
        &**store.inner(),
        flash,
        json!({ "page_title": "Start a Project", "plan": plan }),
    );
    Template::render("inquiry", &context)
}

#[post("/inquiry", data = "<form>")]
pub fn inquiry_submit(
    form: Form<InquirySubmit>,
    store: &State<Arc<dyn Store>>,
    limiter: &State<Arc<RateLimiter>>,
    client_ip: ClientIp,
) -> Flash<Redirect> {
    let s: &dyn Store = &**store.inner();
    let back = || Redirect::to("/inquiry");

    let inquiry = match form.validate() {
        Ok(i) => i,
        Err(e) => return Flash::error(back(), e.user_message()),
    };
    if !limiter.allow(s, Bucket::Form, &client_ip.0) {
        return Flash::error(back(), RATE_LIMITED);
    }

    match s.inquiry_create(&inquiry) {
        Ok(id) => {
            log::info!("New project inquiry #{}", id);
            Flash::success(
                back(),
                "Thanks! We received your project details and will be in touch shortly.",
            )
        }
        Err(e) => {
            log::error!("Failed to save inquiry: {}", e);
            Flash::error(back(), e.user_message())
        }
    }
}

// ── Contact ────────────────────────────────────────────

#[derive(Debug, FromForm, Default)]
pub struct ContactSubmit {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    #[field(name = "g-recaptcha-response")]
    pub recaptcha_response: Option<String>,
    #[field(name = "h-captcha-response")]
    pub hcaptcha_response: Option<String>,
}

/// Whichever widget response the page posted.
fn captcha_token(recaptcha: &Option<String>, hcaptcha: &Option<String>) -> String {
    non_empty(recaptcha.as_deref())
        .or_else(|| non_empty(hcaptcha.as_deref()))
        .unwrap_or_default()
}

impl ContactSubmit {
    /// Every field is required: name, email, phone, subject and message.
    pub fn validate(&self) -> AppResult<ContactForm> {
        Ok(ContactForm {
            name: required(&self.name, "Please enter your name.")?,
            email: required_email(&self.email)?,
            phone: required(&self.phone, "Please enter a phone number.")?,
            subject: required(&self.subject, "Please enter a subject.")?,
            message: required(&self.message, "Please enter a message.")?,
        })
    }
}

fn contact_reply(code: Status, ok: bool, message: &str) -> status::Custom<Json<Value>> {
    status::Custom(
        code,
        Json(json!({
            "status": if ok { "success" } else { "error" },
            "message": message,
        })),
    )
}

#[post("/contact", data = "<form>")]
pub async fn contact_submit(
    form: Form<ContactSubmit>,
    store: &State<Arc<dyn Store>>,
    captcha: &State<Arc<dyn CaptchaVerifier>>,
    limiter: &State<Arc<RateLimiter>>,
    client_ip: ClientIp,
) -> status::Custom<Json<Value>> {
    let s: &dyn Store = &**store.inner();

    let message = match form.validate() {
        Ok(m) => m,
        Err(e) => return contact_reply(Status::BadRequest, false, &e.user_message()),
    };
    if !limiter.allow(s, Bucket::Form, &client_ip.0) {
        return contact_reply(Status::TooManyRequests, false, RATE_LIMITED);
    }

    let token = captcha_token(&form.recaptcha_response, &form.hcaptcha_response);
    if let Err(e) = require_captcha(captcha.inner().as_ref(), &token, Some(&client_ip.0)).await {
        return contact_reply(Status::Forbidden, false, &e.user_message());
    }

    match s.contact_create(&message) {
        Ok(id) => {
            log::info!("New contact message #{}", id);
            contact_reply(
                Status::Ok,
                true,
                "Thank you for reaching out. We will get back to you soon.",
            )
        }
        Err(e) => {
            log::error!("Failed to save contact message: {}", e);
            contact_reply(Status::InternalServerError, false, &e.user_message())
        }
    }
}

// ── Review ─────────────────────────────────────────────

#[derive(Debug, FromForm, Default)]
pub struct ReviewSubmit {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Kept as optional text so a missing or non-numeric rating is a
    /// validation message rather than a form-parse failure.
    pub rating: Option<String>,
    pub message: Option<String>,
    #[field(name = "g-recaptcha-response")]
    pub recaptcha_response: Option<String>,
    #[field(name = "h-captcha-response")]
    pub hcaptcha_response: Option<String>,
}

impl ReviewSubmit {
    pub fn validate(&self) -> AppResult<ReviewForm> {
        const ALL_REQUIRED: &str = "All fields are required.";
        let name = required(&self.name, ALL_REQUIRED)?;
        let email = required(&self.email, ALL_REQUIRED)?;
        let message = required(&self.message, ALL_REQUIRED)?;
        let rating = required(&self.rating, ALL_REQUIRED)?;
        if !looks_like_email(&email) {
            return Err(AppError::validation("Please enter a valid email address."));
        }
        let rating = match rating.parse::<i64>() {
            Ok(r) if (MIN_RATING..=MAX_RATING).contains(&r) => r,
            _ => {
                return Err(AppError::validation(format!(
                    "Rating must be between {} and {}.",
                    MIN_RATING, MAX_RATING
                )))
            }
        };
        Ok(ReviewForm {
            name,
            email,
            rating,
            message,
        })
    }
}

#[get("/review")]
pub fn review_page(store: &State<Arc<dyn Store>>, flash: Option<FlashMessage<'_>>) -> Template {
    let s: &dyn Store = &**store.inner();
    let context = page_context(
        s,
        flash,
        json!({ "page_title": "Leave a Review", "captcha": captcha_widget(s) }),
    );
    Template::render("review", &context)
}

#[post("/review", data = "<form>")]
pub async fn review_submit(
    form: Form<ReviewSubmit>,
    store: &State<Arc<dyn Store>>,
    captcha: &State<Arc<dyn CaptchaVerifier>>,
    limiter: &State<Arc<RateLimiter>>,
    client_ip: ClientIp,
) -> Flash<Redirect> {
    let s: &dyn Store = &**store.inner();
    let back = || Redirect::to("/review");

    let review = match form.validate() {
        Ok(r) => r,
        Err(e) => return Flash::error(back(), e.user_message()),
    };
    if !limiter.allow(s, Bucket::Form, &client_ip.0) {
        return Flash::error(back(), RATE_LIMITED);
    }

    let token = captcha_token(&form.recaptcha_response, &form.hcaptcha_response);
    if let Err(e) = require_captcha(captcha.inner().as_ref(), &token, Some(&client_ip.0)).await {
        return Flash::error(back(), e.user_message());
    }

    match s.review_create(&review) {
        Ok(_) => Flash::success(back(), "Thank you for your review!"),
        Err(e) => {
            log::error!("Failed to save review: {}", e);
            Flash::error(back(), e.user_message())
        }
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        inquiry_page,
        inquiry_submit,
        contact_submit,
        review_page,
        review_submit
    ]
}
