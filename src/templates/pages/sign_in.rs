use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn sign_in_page(error: Option<&str>) -> Markup {
    desktop_layout(
        "Sign in",
        None,
        html! {
            main class="container" {
                div class="card" {
                    h1 { "Sign in" }
                    @if let Some(error) = error {
                        div class="alert" role="alert" { (error) }
                    }
                    form method="post" action="/auth/sign-in" {
                        div class="field" {
                            label for="display_name" { "Name" }
                            input type="text" id="display_name" name="display_name" required;
                        }
                        div class="field" {
                            label for="email" { "Email" }
                            input type="email" id="email" name="email" required;
                        }
                        div class="field" {
                            label for="photo_url" { "Photo URL (optional)" }
                            input type="url" id="photo_url" name="photo_url";
                        }
                        button type="submit" class="primary" { "Email me a sign-in link" }
                    }
                }
            }
        },
    )
}
