// templates/pages/home.rs

use crate::auth::User;
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn home_page(user: Option<&User>) -> Markup {
    desktop_layout(
        "Home",
        user,
        html! {
            main class="container" {
                h1 { "Welcome to Dutch Markets" }
                p { "Discover and share local markets across the Netherlands." }

                @if user.is_some() {
                    div class="grid" {
                        a class="card" href="/markets/new" {
                            h2 { "Add a Market" }
                            p { "Share a market you know with the community." }
                        }
                        a class="card" href="/markets" {
                            h2 { "Browse Markets" }
                            p { "See every market on the map." }
                        }
                    }
                } @else {
                    div class="card" {
                        p { "Sign in to add and browse markets." }
                        a class="primary" href="/signin" { "Sign in" }
                    }
                }
            }
        },
    )
}
