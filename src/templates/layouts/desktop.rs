use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::auth::User;

const DEFAULT_AVATAR: &str = "/default-avatar.png";

const BASE_CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f9fafb; color: #1f2937; }
header { background: #fff; box-shadow: 0 1px 4px rgba(0,0,0,.1); }
header nav { max-width: 1120px; margin: 0 auto; padding: 0 1rem; height: 4rem; display: flex; align-items: center; justify-content: space-between; }
header nav ul { display: flex; gap: 2rem; list-style: none; margin: 0; padding: 0; align-items: center; }
.brand { font-size: 1.25rem; font-weight: bold; color: #1f2937; text-decoration: none; }
.profile { display: flex; align-items: center; gap: .75rem; }
.avatar { width: 2rem; height: 2rem; border-radius: 50%; }
.container { max-width: 1120px; margin: 0 auto; padding: 2rem 1rem; }
.card { background: #fff; border-radius: .5rem; box-shadow: 0 1px 4px rgba(0,0,0,.1); padding: 1.5rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 1.5rem; }
.chips { display: flex; flex-wrap: wrap; gap: .5rem; }
.chip { padding: .5rem 1rem; border: 0; border-radius: .25rem; background: #e5e7eb; color: #374151; cursor: pointer; }
.chip.selected { background: #3b82f6; color: #fff; }
.tag { background: #dbeafe; color: #1e40af; padding: .25rem .5rem; border-radius: .25rem; font-size: .875rem; }
.alert { margin-bottom: 1rem; padding: 1rem; background: #fef2f2; color: #dc2626; border-radius: .375rem; }
.primary { background: #3b82f6; color: #fff; border: 0; padding: .5rem 1rem; border-radius: .375rem; cursor: pointer; }
.danger { background: #ef4444; color: #fff; border: 0; padding: .5rem 1rem; border-radius: .375rem; cursor: pointer; width: 100%; }
.map { width: 100%; height: 400px; border-radius: .5rem; overflow: hidden; }
label { display: block; margin-bottom: .5rem; color: #374151; }
input, textarea { width: 100%; padding: .5rem; border: 1px solid #d1d5db; border-radius: .25rem; box-sizing: border-box; }
.field { margin-bottom: 1rem; }
"#;

pub fn desktop_layout(title: &str, user: Option<&User>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="description" content="Discover local markets in the Netherlands, their schedules, and recommended products";
                title { (title) " | Dutch Markets" }
                style { (PreEscaped(BASE_CSS)) }
                script src="https://unpkg.com/htmx.org@1.9.12" defer {}
            }
            body {
                header {
                    (navigation(user))
                }
                (content)
            }
        }
    }
}

fn navigation(user: Option<&User>) -> Markup {
    html! {
        nav {
            ul {
                li { a class="brand" href="/" { "Dutch Markets" } }
                @if user.is_some() {
                    li { a href="/markets/new" { "Add Market" } }
                    li { a href="/markets" { "Browse Markets" } }
                }
            }

            @match user {
                Some(user) => {
                    div class="profile" {
                        img class="avatar" alt="Profile"
                            src=(user.photo_url.as_deref().unwrap_or(DEFAULT_AVATAR));
                        span { (user.display_name) }
                        form method="post" action="/auth/sign-out" {
                            button type="submit" class="danger" { "Sign Out" }
                        }
                    }
                }
                None => {
                    a class="primary" href="/signin" { "Sign in" }
                }
            }
        }
    }
}
