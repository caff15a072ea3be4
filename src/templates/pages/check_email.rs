use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn check_email_page(email: &str) -> Markup {
    desktop_layout(
        "Check your email",
        None,
        html! {
            main class="container" {
                div class="card" {
                    h1 { "Check your email" }
                    p {
                        "We sent a sign-in link to " strong { (email) } "."
                    }
                    p { "The link works once and expires in 15 minutes." }
                    a href="/signin" { "Use a different email" }
                }
            }
        },
    )
}
