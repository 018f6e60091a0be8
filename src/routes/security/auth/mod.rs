pub mod change_credentials;
pub mod login;
pub mod logout;

pub fn routes() -> Vec<rocket::Route> {
    routes![
        login::login_page,
        login::login_submit,
        logout::logout,
        change_credentials::change_credentials_page,
        change_credentials::change_credentials_submit,
    ]
}
